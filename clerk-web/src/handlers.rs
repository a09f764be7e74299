use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Form, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use tracing::{error, info, warn};

use policy_clerk::app::send_use_case::SendRequest;
use policy_clerk::domain::{Attachment, Document};
use policy_clerk::ClerkError;

use crate::models::{review_rows, submitted_grid, HealthResponse, SenderOption, SheetOption};
use crate::state::AppState;
use crate::templates::{IndexTemplate, PreviewTemplate};

fn render<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering failed").into_response()
        }
    }
}

fn sheet_options(state: &AppState) -> Vec<SheetOption> {
    state.clerk.catalog().sheets().iter().map(SheetOption::from).collect()
}

fn sender_options(state: &AppState) -> Vec<SenderOption> {
    state.clerk.senders().iter().map(SenderOption::from).collect()
}

/// Columns for re-rendering a page after a failure; empty when the lookup fails too
async fn columns_or_empty(state: &AppState, sheet_name: &str) -> Vec<String> {
    match state.clerk.columns(sheet_name).await {
        Ok(schema) => schema.columns().to_vec(),
        Err(e) => {
            warn!("Could not fetch columns for {}: {}", sheet_name, e);
            Vec::new()
        }
    }
}

/// Multipart body split into text fields and file parts
#[derive(Default)]
struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<(String, String, Vec<u8>)>,
}

impl MultipartForm {
    async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    form.files.push((name, file_name, bytes.to_vec()));
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    fn field(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn files_named(&self, name: &str) -> impl Iterator<Item = (&String, &Vec<u8>)> + '_ {
        let name = name.to_string();
        self.files
            .iter()
            .filter(move |(field, _, _)| *field == name)
            .map(|(_, file_name, bytes)| (file_name, bytes))
    }
}

pub async fn index(State(state): State<AppState>) -> Response {
    render(IndexTemplate { sheets: sheet_options(&state), messages: Vec::new() })
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        sheets: state.clerk.catalog().sheets().len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match MultipartForm::read(multipart).await {
        Ok(form) => form,
        Err(e) => {
            error!("Invalid upload body: {}", e);
            return render(IndexTemplate { sheets: sheet_options(&state), messages: vec![format!("Invalid upload: {}", e)] });
        }
    };

    let sheet_name = form.field("sheet");
    let documents: Vec<Document> = form
        .files_named("files")
        .map(|(file_name, bytes)| Document::new(file_name.clone(), bytes.clone()))
        .collect();
    info!("Upload of {} files for {}", documents.len(), sheet_name);

    match state.clerk.upload(&sheet_name, documents).await {
        Ok(outcome) => {
            let mut messages = outcome.file_errors.clone();
            messages.extend(outcome.warnings.iter().map(|w| w.to_string()));
            if outcome.failed_calls > 0 {
                messages.push(format!(
                    "{} of {} extraction calls failed; check the rows before saving.",
                    outcome.failed_calls, outcome.calls
                ));
            }
            render(PreviewTemplate {
                sheet_name: outcome.sheet.name.clone(),
                columns: outcome.schema.columns().to_vec(),
                rows: review_rows(outcome.dataset.to_grid()),
                email_summary: outcome.summary,
                senders: sender_options(&state),
                messages,
                ..PreviewTemplate::default()
            })
        }
        Err(e) => {
            error!("Upload failed: {}", e);
            let mut messages = match &e {
                ClerkError::NoTextExtracted { file_errors } => file_errors.clone(),
                _ => Vec::new(),
            };
            messages.push(e.to_string());
            render(IndexTemplate { sheets: sheet_options(&state), messages })
        }
    }
}

pub async fn save(State(state): State<AppState>, Form(fields): Form<HashMap<String, String>>) -> Response {
    let sheet_name = fields.get("sheet_name").cloned().unwrap_or_default();

    match state.clerk.save(&sheet_name, &fields).await {
        Ok(outcome) => {
            let mut messages = Vec::new();
            if outcome.append.cleared {
                messages.push(format!("{} was over its size limit; older rows were cleared first.", outcome.sheet_name));
            }
            render(PreviewTemplate {
                confirmation: Some(format!(
                    "Successfully saved {} rows to {} sheet.",
                    outcome.dataset.len(),
                    outcome.sheet_name
                )),
                sheet_name: outcome.sheet_name,
                columns: outcome.schema.columns().to_vec(),
                rows: review_rows(outcome.dataset.to_grid()),
                email_summary: outcome.summary,
                senders: sender_options(&state),
                messages,
                error: None,
            })
        }
        Err(e) => {
            error!("Failed to save data to the spreadsheet: {}", e);
            let columns = columns_or_empty(&state, &sheet_name).await;
            let rows = review_rows(submitted_grid(&fields, columns.len()));
            render(PreviewTemplate {
                columns,
                rows,
                sheet_name,
                senders: sender_options(&state),
                error: Some(format!("Failed to save data to Google Sheets: {}", e)),
                ..PreviewTemplate::default()
            })
        }
    }
}

pub async fn send(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match MultipartForm::read(multipart).await {
        Ok(form) => form,
        Err(e) => {
            error!("Invalid send body: {}", e);
            return render(PreviewTemplate {
                senders: sender_options(&state),
                error: Some(format!("Invalid form: {}", e)),
                ..PreviewTemplate::default()
            });
        }
    };

    let request = SendRequest {
        recipients: form.field("email"),
        body: form.field("email_body"),
        sheet_name: form.field("sheet_name"),
        sender_key: form.field("sender_email"),
        attachments: form
            .files_named("attachments")
            .map(|(file_name, bytes)| Attachment { file_name: file_name.clone(), bytes: bytes.clone() })
            .collect(),
    };
    let sheet_name = request.sheet_name.clone();
    let body = request.body.clone();

    let (confirmation, error) = match state.clerk.send(request).await {
        Ok(outcome) => (
            Some(format!("Email sent successfully to {}.", outcome.recipients.join(", "))),
            None,
        ),
        Err(e) => {
            error!("Error during email send: {}", e);
            (None, Some(format!("An error occurred while sending the email: {}", e)))
        }
    };

    let columns = if sheet_name.is_empty() { Vec::new() } else { columns_or_empty(&state, &sheet_name).await };
    render(PreviewTemplate {
        sheet_name,
        columns,
        email_summary: body,
        senders: sender_options(&state),
        confirmation,
        error,
        ..PreviewTemplate::default()
    })
}
