use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::app::ports::{AppendSummary, CompletionPort, ModelProfile, SheetStorePort};
use crate::app::upload_use_case::fetch_schema;
use crate::catalog::SheetCatalog;
use crate::domain::{ColumnSchema, ParsedDataset};
use crate::error::{ClerkError, Result};
use crate::pipeline::review::{parse_row_count, rows_from_form};
use crate::pipeline::summary::compose_email_summary;

#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub sheet_name: String,
    pub schema: ColumnSchema,
    pub dataset: ParsedDataset,
    pub append: AppendSummary,
    pub summary: String,
}

/// Reviewed grid → spreadsheet append → refreshed summary
pub struct SaveUseCase {
    sheets: Arc<dyn SheetStorePort>,
    model: Arc<dyn CompletionPort>,
    catalog: SheetCatalog,
    summary_profile: ModelProfile,
}

impl SaveUseCase {
    pub fn new(
        sheets: Arc<dyn SheetStorePort>,
        model: Arc<dyn CompletionPort>,
        catalog: SheetCatalog,
        summary_profile: ModelProfile,
    ) -> Self {
        Self { sheets, model, catalog, summary_profile }
    }

    /// Rebuilds the grid from the submitted form fields and appends it.
    ///
    /// `fields` holds `row_count` plus one `row-R-col-C` entry per cell.
    pub async fn run(&self, sheet_name: &str, fields: &HashMap<String, String>) -> Result<SaveOutcome> {
        let sheet = self.catalog.resolve(sheet_name)?;
        info!("Attempting to save data to sheet: {}", sheet.name);

        let schema = fetch_schema(self.sheets.as_ref(), &sheet.name).await?;
        let row_count = parse_row_count(fields)?;
        let dataset = rows_from_form(fields, row_count, schema.len());
        if dataset.is_empty() {
            return Err(ClerkError::NoDataToSave);
        }

        info!("Saving {} rows to {}", dataset.len(), sheet.name);
        debug!("First row: {:?}", dataset.rows()[0].values());
        let append = self.sheets.append_rows(&sheet.name, &dataset).await.map_err(|e| {
            error!("Failed to save data to the spreadsheet: {:?}", e);
            e
        })?;
        info!(
            "Appended {} rows to {} ({})",
            append.updated_rows,
            sheet.name,
            append.updated_range.as_deref().unwrap_or("unknown range")
        );

        let summary = compose_email_summary(self.model.as_ref(), &self.summary_profile, &dataset).await;

        Ok(SaveOutcome {
            sheet_name: sheet.name.clone(),
            schema,
            dataset,
            append,
            summary,
        })
    }
}
