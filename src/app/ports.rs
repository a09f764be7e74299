use async_trait::async_trait;

use crate::config::OpenAiSettings;
use crate::domain::{ColumnSchema, Document, OutgoingMail, ParsedDataset, SenderAccount};
use crate::error::Result;

// Document side
#[async_trait]
pub trait TextExtractorPort: Send + Sync {
    /// Concatenated text of every page of a PDF upload
    async fn extract_pdf_text(&self, document: &Document) -> Result<String>;
}

/// Which model to call and how much it may write back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProfile {
    pub model: String,
    pub max_tokens: u32,
}

impl OpenAiSettings {
    pub fn extraction_profile(&self) -> ModelProfile {
        ModelProfile { model: self.extraction_model.clone(), max_tokens: self.extraction_max_tokens }
    }

    pub fn summary_profile(&self) -> ModelProfile {
        ModelProfile { model: self.summary_model.clone(), max_tokens: self.summary_max_tokens }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub profile: ModelProfile,
    pub system: String,
    pub user: String,
}

// Language model side. Implementations sample deterministically (temperature 0).
#[async_trait]
pub trait CompletionPort: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

// Spreadsheet side
#[async_trait]
pub trait SheetStorePort: Send + Sync {
    /// Header row of `sheet`; an empty header is an error
    async fn fetch_columns(&self, sheet: &str) -> Result<ColumnSchema>;

    /// Appends rows below the existing data of `sheet`
    async fn append_rows(&self, sheet: &str, rows: &ParsedDataset) -> Result<AppendSummary>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendSummary {
    pub updated_range: Option<String>,
    pub updated_rows: usize,
    /// True when old data rows were cleared to stay under the size threshold
    pub cleared: bool,
}

// Mail side
#[async_trait]
pub trait MailerPort: Send + Sync {
    async fn send(&self, sender: &SenderAccount, mail: &OutgoingMail) -> Result<()>;
}
