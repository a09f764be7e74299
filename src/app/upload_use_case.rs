use std::sync::Arc;
use tracing::{error, info, warn};

use crate::app::ports::{CompletionPort, ModelProfile, SheetStorePort, TextExtractorPort};
use crate::catalog::SheetCatalog;
use crate::config::ExtractionSettings;
use crate::domain::{ColumnSchema, Document, ExtractedText, ParsedDataset, SheetDefinition};
use crate::error::{ClerkError, Result};
use crate::pipeline::summary::compose_email_summary;
use crate::pipeline::validate::{check_dataset, FieldWarning};
use crate::pipeline::Extractor;

/// Everything the review page needs after an upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub sheet: SheetDefinition,
    pub schema: ColumnSchema,
    pub dataset: ParsedDataset,
    pub warnings: Vec<FieldWarning>,
    pub summary: String,
    /// Per-file problems that did not stop the batch
    pub file_errors: Vec<String>,
    pub calls: usize,
    pub failed_calls: usize,
}

/// Upload → text extraction → model extraction → summary
pub struct UploadUseCase {
    text: Arc<dyn TextExtractorPort>,
    model: Arc<dyn CompletionPort>,
    sheets: Arc<dyn SheetStorePort>,
    catalog: SheetCatalog,
    settings: ExtractionSettings,
    extraction_profile: ModelProfile,
    summary_profile: ModelProfile,
}

impl UploadUseCase {
    pub fn new(
        text: Arc<dyn TextExtractorPort>,
        model: Arc<dyn CompletionPort>,
        sheets: Arc<dyn SheetStorePort>,
        catalog: SheetCatalog,
        settings: ExtractionSettings,
        extraction_profile: ModelProfile,
        summary_profile: ModelProfile,
    ) -> Self {
        Self { text, model, sheets, catalog, settings, extraction_profile, summary_profile }
    }

    pub async fn run(&self, sheet_name: &str, documents: Vec<Document>) -> Result<UploadOutcome> {
        let sheet = self.catalog.resolve(sheet_name)?.clone();

        let documents: Vec<Document> = documents.into_iter().filter(|d| !d.is_blank_part()).collect();
        if documents.is_empty() {
            return Err(ClerkError::NoFiles);
        }

        let (texts, file_errors) = self.extract_texts(&documents).await;
        if texts.is_empty() {
            return Err(ClerkError::NoTextExtracted { file_errors });
        }

        let schema = fetch_schema(self.sheets.as_ref(), &sheet.name).await?;

        let extractor = Extractor::new(self.model.as_ref(), &self.settings, &self.extraction_profile);
        let report = extractor.extract(&sheet, &schema, &texts).await;
        if report.all_calls_failed() {
            warn!("Every extraction call for {} failed; showing blank rows", sheet.name);
        }

        let warnings = check_dataset(&report.dataset, &schema);
        for w in &warnings {
            warn!("Validation: {}", w);
        }

        let summary = compose_email_summary(self.model.as_ref(), &self.summary_profile, &report.dataset).await;

        Ok(UploadOutcome {
            sheet,
            schema,
            dataset: report.dataset,
            warnings,
            summary,
            file_errors,
            calls: report.calls,
            failed_calls: report.failed_calls,
        })
    }

    /// Text of every usable document plus a message for each one that failed
    pub async fn extract_texts(&self, documents: &[Document]) -> (Vec<ExtractedText>, Vec<String>) {
        let mut texts = Vec::new();
        let mut file_errors = Vec::new();

        for document in documents {
            if !document.is_pdf() {
                info!("Non-PDF upload {}, using placeholder text", document.file_name);
                texts.push(ExtractedText {
                    source: document.file_name.clone(),
                    text: format!("File uploaded: {}", document.file_name),
                });
                continue;
            }
            match self.text.extract_pdf_text(document).await {
                Ok(text) if text.trim().is_empty() => {
                    warn!("No text found in {}", document.file_name);
                    file_errors.push(format!("No text could be extracted from {}", document.file_name));
                }
                Ok(text) => {
                    info!("Extracted {} chars from {}", text.len(), document.file_name);
                    texts.push(ExtractedText { source: document.file_name.clone(), text });
                }
                Err(e) => {
                    error!("Error processing file {}: {}", document.file_name, e);
                    file_errors.push(format!("An error occurred processing {}: {}", document.file_name, e));
                }
            }
        }
        (texts, file_errors)
    }
}

/// Header row lookup; any failure becomes `SchemaUnavailable` for `sheet`
pub async fn fetch_schema(sheets: &dyn SheetStorePort, sheet: &str) -> Result<ColumnSchema> {
    let schema = match sheets.fetch_columns(sheet).await {
        Ok(schema) => schema,
        Err(e @ ClerkError::SchemaUnavailable { .. }) => return Err(e),
        Err(e) => {
            error!("Error fetching column names for {}: {}", sheet, e);
            return Err(ClerkError::SchemaUnavailable { sheet: sheet.to_string(), message: e.to_string() });
        }
    };
    if schema.is_empty() {
        return Err(ClerkError::SchemaUnavailable {
            sheet: sheet.to_string(),
            message: "header row is empty".to_string(),
        });
    }
    info!("Fetched {} columns for {}", schema.len(), sheet);
    Ok(schema)
}
