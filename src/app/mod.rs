pub mod ports;
pub mod save_use_case;
pub mod send_use_case;
pub mod upload_use_case;

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::SheetCatalog;
use crate::config::AppConfig;
use crate::domain::{ColumnSchema, Document, SenderAccount};
use crate::error::Result;
use crate::infra::{GoogleSheetsClient, OpenAiClient, PdfTextExtractor, SmtpMailer};
use ports::{CompletionPort, MailerPort, SheetStorePort, TextExtractorPort};
use save_use_case::{SaveOutcome, SaveUseCase};
use send_use_case::{SendOutcome, SendRequest, SendUseCase};
use upload_use_case::{fetch_schema, UploadOutcome, UploadUseCase};

/// The adapters a `Clerk` talks to
#[derive(Clone)]
pub struct ClerkPorts {
    pub text: Arc<dyn TextExtractorPort>,
    pub model: Arc<dyn CompletionPort>,
    pub sheets: Arc<dyn SheetStorePort>,
    pub mailer: Arc<dyn MailerPort>,
}

/// Front door to the upload, save and send workflows
pub struct Clerk {
    config: AppConfig,
    sheets: Arc<dyn SheetStorePort>,
    upload: UploadUseCase,
    save: SaveUseCase,
    send: SendUseCase,
}

impl Clerk {
    pub fn new(config: AppConfig, ports: ClerkPorts) -> Self {
        let upload = UploadUseCase::new(
            ports.text.clone(),
            ports.model.clone(),
            ports.sheets.clone(),
            config.catalog.clone(),
            config.extraction.clone(),
            config.openai.extraction_profile(),
            config.openai.summary_profile(),
        );
        let save = SaveUseCase::new(
            ports.sheets.clone(),
            ports.model.clone(),
            config.catalog.clone(),
            config.openai.summary_profile(),
        );
        let send = SendUseCase::new(ports.mailer.clone(), config.mail.clone());
        Self { config, sheets: ports.sheets, upload, save, send }
    }

    /// Wires the production adapters from `config`
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let ports = ClerkPorts {
            text: Arc::new(PdfTextExtractor::new(config.server.upload_dir.clone())?),
            model: Arc::new(OpenAiClient::new(&config.openai)?),
            sheets: Arc::new(GoogleSheetsClient::new(&config.spreadsheet)?),
            mailer: Arc::new(SmtpMailer::new(&config.mail)),
        };
        Ok(Self::new(config, ports))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SheetCatalog {
        &self.config.catalog
    }

    pub fn senders(&self) -> &[SenderAccount] {
        &self.config.mail.senders
    }

    pub async fn columns(&self, sheet_name: &str) -> Result<ColumnSchema> {
        let sheet = self.config.catalog.resolve(sheet_name)?;
        fetch_schema(self.sheets.as_ref(), &sheet.name).await
    }

    pub async fn upload(&self, sheet_name: &str, documents: Vec<Document>) -> Result<UploadOutcome> {
        self.upload.run(sheet_name, documents).await
    }

    pub async fn save(&self, sheet_name: &str, fields: &HashMap<String, String>) -> Result<SaveOutcome> {
        self.save.run(sheet_name, fields).await
    }

    pub async fn send(&self, request: SendRequest) -> Result<SendOutcome> {
        self.send.run(request).await
    }
}
