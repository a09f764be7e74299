use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::error;

use crate::domain::{ColumnSchema, ParsedDataset, ParsedRow};
use crate::error::Result;

/// Parses one model response line as CSV and aligns it to `schema`.
///
/// Double-quoted fields may contain commas, and a quote still opens a field
/// when spaces follow the preceding comma. Unquoted fields are trimmed;
/// quoted values are kept verbatim. The row is padded with empty strings or
/// truncated to exactly `schema.len()` values. Returns `None` when the line
/// is not valid CSV.
pub fn normalize_line(line: &str, schema: &ColumnSchema) -> Option<ParsedRow> {
    match parse_csv_line(line) {
        Ok(values) => Some(ParsedRow::aligned(values, schema.len())),
        Err(e) => {
            error!("Error parsing CSV data: {}", e);
            None
        }
    }
}

fn parse_csv_line(line: &str) -> Result<Vec<String>> {
    let line = tighten_delimiters(line);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Ok(Vec::new());
    }
    Ok(record.iter().map(str::to_string).collect())
}

/// Drops spaces and tabs around unquoted delimiters so the csv reader sees a
/// quote as the first byte of its field. Quoted text passes through untouched.
fn tighten_delimiters(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending = String::new();
    let mut field_start = true;
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if quoted {
            out.push(ch);
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    out.push('"');
                    chars.next();
                } else {
                    quoted = false;
                }
            }
            continue;
        }
        match ch {
            ' ' | '\t' if field_start => {}
            ' ' | '\t' => pending.push(ch),
            ',' => {
                pending.clear();
                out.push(ch);
                field_start = true;
            }
            '"' if field_start => {
                out.push(ch);
                quoted = true;
                field_start = false;
            }
            _ => {
                out.push_str(&pending);
                pending.clear();
                out.push(ch);
                field_start = false;
            }
        }
    }
    out
}

/// Renders the dataset back to CSV text, quoting only where needed
pub fn dataset_to_csv(dataset: &ParsedDataset) -> Result<String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    for row in dataset.rows() {
        writer.write_record(row.values())?;
    }
    let bytes = writer.into_inner().map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}
