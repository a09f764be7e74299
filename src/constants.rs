/// Phrases that open the insured-members section of a group policy.
/// Order matters: when two markers start at the same offset the earlier entry wins.
pub const INSURED_SECTION_MARKERS: [&str; 3] = ["ASEGURADOS", "LISTA DE ASEGURADOS", "RELACIÓN DE ASEGURADOS"];

/// Insurer short names the extraction instructions ask the model to use
pub const KNOWN_INSURERS: [&str; 6] = ["GNP", "Qualitas", "ANA", "HDI", "SURA", "MAPFRE"];

/// Column holding the insurer short name
pub const INSURER_COLUMN: &str = "Aseguradora";

/// Columns that are expected to stay blank after extraction
pub const OPTIONAL_COLUMNS: [&str; 4] = ["No. de Pago", "No. de Pagos", "e-mail", "PDF"];

/// Upper bound on addresses in a single outgoing mail (To + Cc)
pub const MAX_RECIPIENTS: usize = 5;

/// Upper bound on attachments in a single outgoing mail
pub const MAX_ATTACHMENTS: usize = 10;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

// Tuning defaults; all of them can be overridden from config.toml
pub const DEFAULT_CHUNK_LINES: usize = 2000;
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;
pub const DEFAULT_CHUNK_TOKEN_BUDGET: usize = 100_000;
pub const DEFAULT_EXTRACTION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EXTRACTION_MAX_TOKENS: u32 = 8000;
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-4";
pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 500;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_MAIL_SUBJECT: &str = "Envío de póliza";
pub const DEFAULT_CLEAR_THRESHOLD_ROWS: u64 = 9900;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5002;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "clerk.log";
pub const DEFAULT_LOG_FILTER: &str = "policy_clerk=info,clerk_web=info,tower_http=info,warn";

/// Returns true when `column` is allowed to be blank without a warning
pub fn is_optional_column(column: &str) -> bool {
    OPTIONAL_COLUMNS.iter().any(|c| c.eq_ignore_ascii_case(column))
}

/// Returns true when `value` is one of the insurer short names (or blank)
pub fn is_known_insurer(value: &str) -> bool {
    value.is_empty() || KNOWN_INSURERS.contains(&value)
}
