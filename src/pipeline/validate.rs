use serde::Serialize;

use crate::constants::{is_known_insurer, is_optional_column, INSURER_COLUMN, KNOWN_INSURERS};
use crate::domain::{ColumnSchema, ParsedDataset};

/// Advisory finding about one extracted cell; never blocks the workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    pub row: usize,
    pub column: String,
    pub message: String,
}

impl std::fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}, {}: {}", self.row + 1, self.column, self.message)
    }
}

/// Flags unknown insurer names and unexpectedly blank cells.
///
/// Entirely blank rows are skipped; they are dropped during review anyway.
pub fn check_dataset(dataset: &ParsedDataset, schema: &ColumnSchema) -> Vec<FieldWarning> {
    let mut warnings = Vec::new();
    for (row_index, row) in dataset.rows().iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        for (column, value) in schema.columns().iter().zip(row.values()) {
            let value = value.trim();
            if column == INSURER_COLUMN && !is_known_insurer(value) {
                warnings.push(FieldWarning {
                    row: row_index,
                    column: column.clone(),
                    message: format!("'{}' is not one of {}", value, KNOWN_INSURERS.join(", ")),
                });
            } else if value.is_empty() && !is_optional_column(column) {
                warnings.push(FieldWarning {
                    row: row_index,
                    column: column.clone(),
                    message: "empty value".to_string(),
                });
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParsedRow;

    fn schema() -> ColumnSchema {
        ColumnSchema::new(vec!["Póliza".into(), "Aseguradora".into(), "e-mail".into()])
    }

    fn dataset(rows: Vec<Vec<&str>>) -> ParsedDataset {
        ParsedDataset::new(
            rows.into_iter()
                .map(|r| ParsedRow::aligned(r.into_iter().map(String::from).collect(), 3))
                .collect(),
        )
    }

    #[test]
    fn complete_row_has_no_warnings() {
        assert!(check_dataset(&dataset(vec![vec!["123", "GNP", ""]]), &schema()).is_empty());
    }

    #[test]
    fn unknown_insurer_is_flagged() {
        let warnings = check_dataset(&dataset(vec![vec!["123", "Grupo Nacional Provincial", ""]]), &schema());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].column, "Aseguradora");
    }

    #[test]
    fn blank_required_column_is_flagged_but_optional_is_not() {
        let warnings = check_dataset(&dataset(vec![vec!["", "HDI", ""]]), &schema());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].column, "Póliza");
        assert_eq!(warnings[0].to_string(), "row 1, Póliza: empty value");
    }

    #[test]
    fn blank_rows_are_ignored() {
        assert!(check_dataset(&dataset(vec![vec!["", "", ""]]), &schema()).is_empty());
    }
}
