use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

use policy_clerk::app::ports::{
    AppendSummary, CompletionPort, CompletionRequest, MailerPort, SheetStorePort, TextExtractorPort,
};
use policy_clerk::config::FileConfig;
use policy_clerk::domain::{ColumnSchema, Document, OutgoingMail, ParsedDataset, SenderAccount};
use policy_clerk::{AppConfig, Clerk, ClerkError, ClerkPorts, Result};

use crate::router::app_router;
use crate::state::AppState;

const CONFIG: &str = r#"
[mail]
oversight_address = "office@example.com"

[[mail.senders]]
key = "lorena"
name = "Lorena"
address = "lorena@example.com"
"#;

const BOUNDARY: &str = "clerk-test-boundary";

struct Fakes {
    appended: Mutex<Vec<ParsedDataset>>,
    sent: Mutex<Vec<OutgoingMail>>,
}

struct FakeText;

#[async_trait]
impl TextExtractorPort for FakeText {
    async fn extract_pdf_text(&self, document: &Document) -> Result<String> {
        Ok(String::from_utf8_lossy(&document.bytes).to_string())
    }
}

struct FakeModel;

#[async_trait]
impl CompletionPort for FakeModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if request.profile.model == "gpt-4" {
            Ok("Estimado cliente".to_string())
        } else {
            Ok("98765,GNP".to_string())
        }
    }
}

struct FakeSheets(Arc<Fakes>);

#[async_trait]
impl SheetStorePort for FakeSheets {
    async fn fetch_columns(&self, _sheet: &str) -> Result<ColumnSchema> {
        Ok(ColumnSchema::new(vec!["Poliza".into(), "Aseguradora".into()]))
    }

    async fn append_rows(&self, _sheet: &str, rows: &ParsedDataset) -> Result<AppendSummary> {
        if rows.rows().iter().any(|r| r.values().iter().any(|v| v == "boom")) {
            return Err(ClerkError::Api { message: "quota exceeded".to_string() });
        }
        self.0.appended.lock().await.push(rows.clone());
        Ok(AppendSummary { updated_range: None, updated_rows: rows.len(), cleared: false })
    }
}

struct FakeMailer(Arc<Fakes>);

#[async_trait]
impl MailerPort for FakeMailer {
    async fn send(&self, _sender: &SenderAccount, mail: &OutgoingMail) -> Result<()> {
        self.0.sent.lock().await.push(mail.clone());
        Ok(())
    }
}

fn app() -> (axum::Router, Arc<Fakes>) {
    let fakes = Arc::new(Fakes { appended: Mutex::new(Vec::new()), sent: Mutex::new(Vec::new()) });
    let env = |key: &str| match key {
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        "SHEET_ID" => Some("sheet".to_string()),
        "GOOGLE_APPLICATION_CREDENTIALS" => Some("/dev/null".to_string()),
        "SENDER_LORENA_PASSWORD" => Some("pw".to_string()),
        _ => None,
    };
    let config = AppConfig::from_sources(FileConfig::parse(CONFIG).unwrap(), env).unwrap();
    let ports = ClerkPorts {
        text: Arc::new(FakeText),
        model: Arc::new(FakeModel),
        sheets: Arc::new(FakeSheets(fakes.clone())),
        mailer: Arc::new(FakeMailer(fakes.clone())),
    };
    let clerk = Clerk::new(config, ports);
    (app_router(AppState { clerk: Arc::new(clerk) }), fakes)
}

fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for (name, file_name, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn post_multipart(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sheets"], 11);
}

#[tokio::test]
async fn index_lists_catalog_sheets() {
    let (app, _) = app();
    let response = app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains("GruposGMM"));
    assert!(html.contains("Mascotas"));
}

#[tokio::test]
async fn upload_renders_editable_rows() {
    let (app, _) = app();
    let request = post_multipart("/upload", multipart(&[("sheet", "Autos")], &[("files", "poliza.pdf", "texto")]));
    let html = body_text(app.oneshot(request).await.unwrap()).await;

    assert!(html.contains("name=\"row-0-col-0\" value=\"98765\""));
    assert!(html.contains("name=\"row_count\" value=\"1\""));
    assert!(html.contains("Estimado cliente"));
}

#[tokio::test]
async fn upload_to_unknown_sheet_shows_message_on_form() {
    let (app, _) = app();
    let request = post_multipart("/upload", multipart(&[("sheet", "Barcos")], &[("files", "poliza.pdf", "texto")]));
    let html = body_text(app.oneshot(request).await.unwrap()).await;
    assert!(html.contains("Invalid sheet name: Barcos"));
    assert!(html.contains("action=\"/upload\""));
}

#[tokio::test]
async fn save_appends_non_blank_rows() {
    let (app, fakes) = app();
    let form = "sheet_name=Autos&row_count=2&row-0-col-0=1&row-0-col-1=GNP&row-1-col-0=&row-1-col-1=";
    let request = Request::builder()
        .method("POST")
        .uri("/save")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let html = body_text(app.oneshot(request).await.unwrap()).await;

    assert!(html.contains("Successfully saved 1 rows to Autos sheet."));
    assert_eq!(fakes.appended.lock().await[0].len(), 1);
}

#[tokio::test]
async fn save_failure_keeps_submitted_values() {
    let (app, _) = app();
    let form = "sheet_name=Autos&row_count=1&row-0-col-0=boom&row-0-col-1=GNP";
    let request = Request::builder()
        .method("POST")
        .uri("/save")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let html = body_text(app.oneshot(request).await.unwrap()).await;

    assert!(html.contains("quota exceeded"));
    assert!(html.contains("value=\"boom\""));
}

#[tokio::test]
async fn save_with_forged_cell_indices_renders_an_error() {
    let (app, fakes) = app();
    let form = "sheet_name=Autos&row_count=1000000000000\
        &row-18446744073709551615-col-0=kept&row-100000000-col-100000000=dropped";
    let request = Request::builder()
        .method("POST")
        .uri("/save")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert!(html.contains("exceeds the 2 submitted cells"));
    assert!(html.contains("value=\"kept\""));
    assert!(!html.contains("dropped"));
    assert!(fakes.appended.lock().await.is_empty());
}

#[tokio::test]
async fn send_mails_client_with_copies() {
    let (app, fakes) = app();
    let body = multipart(
        &[
            ("email", "client@example.com"),
            ("email_body", "Estimado cliente"),
            ("sheet_name", "Autos"),
            ("sender_email", "lorena"),
        ],
        &[("attachments", "poliza.pdf", "%PDF")],
    );
    let html = body_text(app.oneshot(post_multipart("/send", body)).await.unwrap()).await;

    assert!(html.contains("Email sent successfully"));
    let sent = fakes.sent.lock().await;
    assert_eq!(sent[0].cc, vec!["office@example.com", "lorena@example.com"]);
    assert_eq!(sent[0].attachments.len(), 1);
}

#[tokio::test]
async fn send_rejects_six_recipients() {
    let (app, fakes) = app();
    let body = multipart(
        &[
            ("email", "a@x.com,b@x.com,c@x.com,d@x.com"),
            ("email_body", "Hola"),
            ("sheet_name", "Autos"),
            ("sender_email", "lorena"),
        ],
        &[],
    );
    let html = body_text(app.oneshot(post_multipart("/send", body)).await.unwrap()).await;

    assert!(html.contains("more than 5"));
    assert!(fakes.sent.lock().await.is_empty());
}
