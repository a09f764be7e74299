use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{SheetCatalog, SheetEntry};
use crate::constants::*;
use crate::domain::SenderAccount;
use crate::error::{ClerkError, Result};
use crate::prompts::FLAT_INSTRUCTIONS;

/// Non-secret settings as they appear in config.toml. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerSettings,
    pub extraction: ExtractionSettings,
    pub openai: OpenAiSection,
    pub spreadsheet: SpreadsheetSection,
    pub mail: MailSection,
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub upload_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

/// Text segmentation and chunking knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Lines per insured-list chunk
    pub chunk_lines: usize,
    /// Characters per token used for the rough token estimate
    pub chars_per_token: usize,
    /// Estimated tokens above which a chunk is logged as oversized
    pub chunk_token_budget: usize,
    pub markers: Vec<String>,
    pub flat_instructions: String,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            chunk_lines: DEFAULT_CHUNK_LINES,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
            chunk_token_budget: DEFAULT_CHUNK_TOKEN_BUDGET,
            markers: INSURED_SECTION_MARKERS.iter().map(|m| m.to_string()).collect(),
            flat_instructions: FLAT_INSTRUCTIONS.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OpenAiSection {
    pub base_url: String,
    pub extraction_model: String,
    pub extraction_max_tokens: u32,
    pub summary_model: String,
    pub summary_max_tokens: u32,
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            base_url: OPENAI_API_BASE.to_string(),
            extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
            extraction_max_tokens: DEFAULT_EXTRACTION_MAX_TOKENS,
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SpreadsheetSection {
    pub api_base: String,
    pub clear_threshold_rows: u64,
}

impl Default for SpreadsheetSection {
    fn default() -> Self {
        Self {
            api_base: SHEETS_API_BASE.to_string(),
            clear_threshold_rows: DEFAULT_CLEAR_THRESHOLD_ROWS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MailSection {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub subject: String,
    pub oversight_address: Option<String>,
    pub senders: Vec<SenderEntry>,
}

impl Default for MailSection {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            subject: DEFAULT_MAIL_SUBJECT.to_string(),
            oversight_address: None,
            senders: Vec::new(),
        }
    }
}

/// `[[mail.senders]]` entry; the password comes from the environment
#[derive(Debug, Clone, Deserialize)]
pub struct SenderEntry {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    pub address: String,
}

#[derive(Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub extraction_model: String,
    pub extraction_max_tokens: u32,
    pub summary_model: String,
    pub summary_max_tokens: u32,
}

#[derive(Clone)]
pub enum GoogleCredentials {
    /// Path to a service-account key file
    File(PathBuf),
    /// The service-account key document itself
    Json(String),
}

impl fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("extraction_model", &self.extraction_model)
            .field("extraction_max_tokens", &self.extraction_max_tokens)
            .field("summary_model", &self.summary_model)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .finish()
    }
}

impl fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoogleCredentials::File(path) => f.debug_tuple("File").field(path).finish(),
            GoogleCredentials::Json(_) => f.debug_tuple("Json").field(&"<redacted>").finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpreadsheetSettings {
    pub spreadsheet_id: String,
    pub api_base: String,
    pub credentials: GoogleCredentials,
    pub clear_threshold_rows: u64,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub subject: String,
    pub oversight_address: String,
    pub senders: Vec<SenderAccount>,
}

impl MailSettings {
    pub fn sender(&self, key: &str) -> Option<&SenderAccount> {
        self.senders.iter().find(|s| s.key == key)
    }
}

/// Fully validated runtime configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub extraction: ExtractionSettings,
    pub openai: OpenAiSettings,
    pub spreadsheet: SpreadsheetSettings,
    pub mail: MailSettings,
    pub catalog: SheetCatalog,
}

impl AppConfig {
    /// Loads `.env`, the TOML file (`CLERK_CONFIG` or `config.toml`, optional)
    /// and the process environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let path = std::env::var("CLERK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = FileConfig::read_optional(Path::new(&path))?;
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Combines file settings with secrets looked up through `env`
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            lookup(key).ok_or_else(|| ClerkError::Config(format!("environment variable {} is required", key)))
        };

        let mut server = file.server;
        if let Some(port) = lookup("PORT") {
            server.port = port
                .parse()
                .map_err(|_| ClerkError::Config(format!("PORT '{}' is not a valid port", port)))?;
        }

        let extraction = file.extraction;
        if extraction.chunk_lines == 0 {
            return Err(ClerkError::Config("extraction.chunk_lines must be at least 1".to_string()));
        }
        if extraction.chars_per_token == 0 {
            return Err(ClerkError::Config("extraction.chars_per_token must be at least 1".to_string()));
        }
        if extraction.markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ClerkError::Config("extraction.markers must name at least one phrase".to_string()));
        }

        let openai = OpenAiSettings {
            api_key: require("OPENAI_API_KEY")?,
            base_url: file.openai.base_url,
            extraction_model: file.openai.extraction_model,
            extraction_max_tokens: file.openai.extraction_max_tokens,
            summary_model: file.openai.summary_model,
            summary_max_tokens: file.openai.summary_max_tokens,
        };

        let credentials = match (lookup("GOOGLE_CREDENTIALS"), lookup("GOOGLE_APPLICATION_CREDENTIALS")) {
            (Some(json), _) => GoogleCredentials::Json(json),
            (None, Some(path)) => GoogleCredentials::File(PathBuf::from(path)),
            (None, None) => {
                return Err(ClerkError::Config(
                    "GOOGLE_CREDENTIALS or GOOGLE_APPLICATION_CREDENTIALS is required".to_string(),
                ))
            }
        };
        let spreadsheet = SpreadsheetSettings {
            spreadsheet_id: require("SHEET_ID")?,
            api_base: file.spreadsheet.api_base,
            credentials,
            clear_threshold_rows: file.spreadsheet.clear_threshold_rows,
        };

        let oversight_address = lookup("OVERSIGHT_EMAIL")
            .or(file.mail.oversight_address.filter(|a| !a.trim().is_empty()))
            .ok_or_else(|| {
                ClerkError::Config("OVERSIGHT_EMAIL or mail.oversight_address is required".to_string())
            })?;

        if file.mail.senders.is_empty() {
            return Err(ClerkError::Config("at least one [[mail.senders]] entry is required".to_string()));
        }
        let mut senders = Vec::with_capacity(file.mail.senders.len());
        for entry in file.mail.senders {
            let var = sender_password_var(&entry.key);
            let password = require(var.as_str())?;
            senders.push(SenderAccount {
                display_name: entry.name.unwrap_or_else(|| entry.key.clone()),
                key: entry.key,
                address: entry.address,
                password,
            });
        }

        let mail = MailSettings {
            smtp_host: file.mail.smtp_host,
            smtp_port: file.mail.smtp_port,
            subject: file.mail.subject,
            oversight_address,
            senders,
        };

        let catalog = SheetCatalog::from_entries(&file.sheets)?;

        Ok(Self { server, extraction, openai, spreadsheet, mail, catalog })
    }
}

impl FileConfig {
    /// Parses `path` when it exists; a missing file means all defaults
    pub fn read_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ClerkError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Environment variable holding a sender's SMTP password, e.g. `SENDER_LORENA_PASSWORD`
pub fn sender_password_var(key: &str) -> String {
    let normalized: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("SENDER_{}_PASSWORD", normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FILE: &str = r#"
[server]
port = 8080

[extraction]
chunk_lines = 150

[mail]
oversight_address = "office@example.com"

[[mail.senders]]
key = "lorena"
name = "Lorena"
address = "lorena@example.com"

[[mail.senders]]
key = "michell"
address = "michell@example.com"
"#;

    fn env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("SHEET_ID", "sheet-123"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/secrets/sa.json"),
            ("SENDER_LORENA_PASSWORD", "pw1"),
            ("SENDER_MICHELL_PASSWORD", "pw2"),
        ])
    }

    fn build(vars: HashMap<&'static str, &'static str>) -> Result<AppConfig> {
        let file = FileConfig::parse(FILE).unwrap();
        AppConfig::from_sources(file, |k| vars.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn builds_from_file_and_environment() {
        let config = build(env()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.extraction.chunk_lines, 150);
        assert_eq!(config.extraction.chars_per_token, DEFAULT_CHARS_PER_TOKEN);
        assert_eq!(config.openai.extraction_model, DEFAULT_EXTRACTION_MODEL);
        assert_eq!(config.spreadsheet.spreadsheet_id, "sheet-123");
        assert!(matches!(config.spreadsheet.credentials, GoogleCredentials::File(_)));
        assert_eq!(config.mail.oversight_address, "office@example.com");
        assert_eq!(config.mail.sender("lorena").unwrap().password, "pw1");
        assert_eq!(config.mail.sender("michell").unwrap().display_name, "michell");
        assert!(config.catalog.get("GruposGMM").is_some());
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let mut vars = env();
        vars.remove("OPENAI_API_KEY");
        let err = build(vars).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let mut vars = env();
        vars.insert("SHEET_ID", "   ");
        assert!(matches!(build(vars), Err(ClerkError::Config(_))));
    }

    #[test]
    fn every_sender_needs_a_password() {
        let mut vars = env();
        vars.remove("SENDER_MICHELL_PASSWORD");
        let err = build(vars).unwrap_err();
        assert!(err.to_string().contains("SENDER_MICHELL_PASSWORD"));
    }

    #[test]
    fn inline_google_credentials_win_over_path() {
        let mut vars = env();
        vars.insert("GOOGLE_CREDENTIALS", "{\"type\":\"service_account\"}");
        let config = build(vars).unwrap();
        assert!(matches!(config.spreadsheet.credentials, GoogleCredentials::Json(_)));
    }

    #[test]
    fn port_from_environment_overrides_file() {
        let mut vars = env();
        vars.insert("PORT", "9000");
        assert_eq!(build(vars).unwrap().server.port, 9000);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let file = FileConfig::parse(&FILE.replace("chunk_lines = 150", "chunk_lines = 0")).unwrap();
        let vars = env();
        let result = AppConfig::from_sources(file, |k| vars.get(k).map(|v| v.to_string()));
        assert!(matches!(result, Err(ClerkError::Config(_))));
    }

    #[test]
    fn sender_password_variable_is_upper_snake_case() {
        assert_eq!(sender_password_var("lorena"), "SENDER_LORENA_PASSWORD");
        assert_eq!(sender_password_var("casin-seguros"), "SENDER_CASIN_SEGUROS_PASSWORD");
    }
}
