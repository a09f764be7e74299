//! Data shapes shared by the pipeline, the use cases and the adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{MAX_ATTACHMENTS, MAX_RECIPIENTS};
use crate::error::{ClerkError, Result};

/// Raw bytes of one uploaded file
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    pub fn is_pdf(&self) -> bool {
        self.file_name.to_lowercase().ends_with(".pdf")
    }

    /// Browsers send an unnamed, empty part when no file was chosen
    pub fn is_blank_part(&self) -> bool {
        self.file_name.trim().is_empty() && self.bytes.is_empty()
    }
}

/// Concatenated page text of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub source: String,
    pub text: String,
}

/// Ordered column names read from a sheet's header row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    columns: Vec<String>,
}

impl ColumnSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One record, always exactly as wide as the schema it was built for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRow {
    values: Vec<String>,
}

impl ParsedRow {
    /// Pads with empty strings or truncates so the row has `width` values
    pub fn aligned(mut values: Vec<String>, width: usize) -> Self {
        values.resize(width, String::new());
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }
}

/// Rows of one upload/review cycle, in extraction order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDataset {
    rows: Vec<ParsedRow>,
}

impl ParsedDataset {
    pub fn new(rows: Vec<ParsedRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: ParsedRow) {
        self.rows.push(row);
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = ParsedRow>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[ParsedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain string grid, the shape the spreadsheet API and templates expect
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(|r| r.values().to_vec()).collect()
    }
}

/// How a sheet maps documents to records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetKind {
    /// One record per upload batch, taken from the first document
    Flat,
    /// A contract header record followed by one record per insured member
    Grouped { instructions: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDefinition {
    pub name: String,
    pub kind: SheetKind,
}

impl SheetDefinition {
    pub fn flat(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: SheetKind::Flat }
    }

    pub fn grouped(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SheetKind::Grouped { instructions: instructions.into() },
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self.kind, SheetKind::Grouped { .. })
    }
}

/// A preconfigured mailbox the team can send from
#[derive(Clone)]
pub struct SenderAccount {
    pub key: String,
    pub display_name: String,
    pub address: String,
    pub password: String,
}

impl fmt::Debug for SenderAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderAccount")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .field("address", &self.address)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A validated message ready for the mail transport
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl OutgoingMail {
    /// Builds the message for `recipients` (comma-separated) with the
    /// oversight mailbox and the sender copied.
    pub fn compose(
        recipients: &str,
        oversight: &str,
        sender: &SenderAccount,
        subject: &str,
        body: &str,
        mut attachments: Vec<Attachment>,
    ) -> Result<Self> {
        let to: Vec<String> = recipients
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if to.is_empty() {
            return Err(ClerkError::InvalidForm("missing recipient email".to_string()));
        }

        let cc = vec![oversight.to_string(), sender.address.clone()];
        let count = to.len() + cc.len();
        if count > MAX_RECIPIENTS {
            return Err(ClerkError::TooManyRecipients { count, max: MAX_RECIPIENTS });
        }

        if attachments.len() > MAX_ATTACHMENTS {
            tracing::warn!(
                "Dropping {} attachments beyond the limit of {}",
                attachments.len() - MAX_ATTACHMENTS,
                MAX_ATTACHMENTS
            );
            attachments.truncate(MAX_ATTACHMENTS);
        }

        Ok(Self {
            to,
            cc,
            subject: subject.to_string(),
            body: body.to_string(),
            attachments,
        })
    }

    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len()
    }

    pub fn all_recipients(&self) -> impl Iterator<Item = &String> {
        self.to.iter().chain(self.cc.iter())
    }
}
