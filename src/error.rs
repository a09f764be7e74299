use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClerkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid sheet name: {0}")]
    InvalidSheet(String),

    #[error("No files were provided")]
    NoFiles,

    #[error("No text was extracted from the uploaded files")]
    NoTextExtracted { file_errors: Vec<String> },

    #[error("Could not extract text from {file}: {message}")]
    TextExtraction { file: String, message: String },

    #[error("Failed to fetch columns for {sheet}: {message}")]
    SchemaUnavailable { sheet: String, message: String },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("No data to save")]
    NoDataToSave,

    #[error("Invalid form: {0}")]
    InvalidForm(String),

    #[error("Sender email credentials not provided for {0}")]
    MissingCredentials(String),

    #[error("Cannot send to more than {max} email addresses ({count} given)")]
    TooManyRecipients { count: usize, max: usize },

    #[error("Invalid email address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Mail delivery failed: {0}")]
    Mail(String),
}

pub type Result<T> = std::result::Result<T, ClerkError>;
