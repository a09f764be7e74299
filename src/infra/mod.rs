pub mod google_sheets;
pub mod openai_client;
pub mod pdf_text;
pub mod smtp_mailer;

pub use google_sheets::GoogleSheetsClient;
pub use openai_client::OpenAiClient;
pub use pdf_text::PdfTextExtractor;
pub use smtp_mailer::SmtpMailer;
