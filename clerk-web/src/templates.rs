use askama::Template;

use crate::models::{ReviewRow, SenderOption, SheetOption};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub sheets: Vec<SheetOption>,
    pub messages: Vec<String>,
}

#[derive(Template, Default)]
#[template(path = "preview.html")]
pub struct PreviewTemplate {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<ReviewRow>,
    pub email_summary: String,
    pub senders: Vec<SenderOption>,
    pub messages: Vec<String>,
    pub confirmation: Option<String>,
    pub error: Option<String>,
}

impl PreviewTemplate {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
