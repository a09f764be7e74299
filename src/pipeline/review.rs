use std::collections::HashMap;
use tracing::debug;

use crate::domain::{ParsedDataset, ParsedRow};
use crate::error::{ClerkError, Result};

/// Form field carrying the cell at `row`, `col` of the review grid
pub fn cell_field_name(row: usize, col: usize) -> String {
    format!("row-{}-col-{}", row, col)
}

/// Splits a `row-R-col-C` field name into its row and column indices
pub fn parse_cell_field_name(name: &str) -> Option<(usize, usize)> {
    let rest = name.strip_prefix("row-")?;
    let (row, col) = rest.split_once("-col-")?;
    Some((row.parse().ok()?, col.parse().ok()?))
}

/// Reads the `row_count` form value.
///
/// The count may not exceed the number of cell fields actually submitted,
/// which keeps the rebuild proportional to the request body.
pub fn parse_row_count(fields: &HashMap<String, String>) -> Result<usize> {
    let raw = fields
        .get("row_count")
        .ok_or_else(|| ClerkError::InvalidForm("missing row_count".to_string()))?;
    let row_count: usize = raw
        .trim()
        .parse()
        .map_err(|_| ClerkError::InvalidForm(format!("row_count '{}' is not a number", raw)))?;

    let cells = fields.keys().filter(|name| parse_cell_field_name(name).is_some()).count();
    if row_count > cells {
        return Err(ClerkError::InvalidForm(format!(
            "row_count {} exceeds the {} submitted cells",
            row_count, cells
        )));
    }
    Ok(row_count)
}

/// Rebuilds the edited grid from per-cell form fields.
///
/// Missing cells read as empty. Rows whose cells are all blank are dropped;
/// every other row is kept exactly as submitted.
pub fn rows_from_form(fields: &HashMap<String, String>, row_count: usize, column_count: usize) -> ParsedDataset {
    let mut dataset = ParsedDataset::default();
    for row_index in 0..row_count {
        let values: Vec<String> = (0..column_count)
            .map(|col_index| fields.get(&cell_field_name(row_index, col_index)).cloned().unwrap_or_default())
            .collect();
        let row = ParsedRow::aligned(values, column_count);
        if row.is_blank() {
            debug!("Skipping blank row {}", row_index);
            continue;
        }
        debug!("Added row {}: {:?}", row_index, row.values());
        dataset.push(row);
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(cells: &[(usize, usize, &str)]) -> HashMap<String, String> {
        cells
            .iter()
            .map(|(r, c, v)| (cell_field_name(*r, *c), v.to_string()))
            .collect()
    }

    #[test]
    fn blank_rows_are_dropped() {
        let fields = form(&[(0, 0, "123"), (0, 1, "GNP"), (1, 0, "  "), (1, 1, ""), (2, 0, ""), (2, 1, "x")]);
        let dataset = rows_from_form(&fields, 3, 2);
        assert_eq!(dataset.to_grid(), vec![vec!["123", "GNP"], vec!["", "x"]]);
    }

    #[test]
    fn kept_rows_are_not_modified() {
        let fields = form(&[(0, 0, " padded "), (0, 1, "")]);
        let dataset = rows_from_form(&fields, 1, 2);
        assert_eq!(dataset.rows()[0].values(), &[" padded ", ""]);
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let fields = form(&[(0, 2, "last")]);
        let dataset = rows_from_form(&fields, 1, 3);
        assert_eq!(dataset.rows()[0].values(), &["", "", "last"]);
    }

    #[test]
    fn cells_outside_the_grid_are_ignored() {
        let fields = form(&[(0, 0, "a"), (0, 5, "stray"), (4, 0, "beyond")]);
        let dataset = rows_from_form(&fields, 1, 1);
        assert_eq!(dataset.to_grid(), vec![vec!["a"]]);
    }

    #[test]
    fn row_count_must_be_numeric() {
        let mut fields = form(&[(0, 0, "a"), (1, 0, "b"), (2, 0, "c"), (3, 0, "d")]);
        fields.insert("row_count".to_string(), " 4 ".to_string());
        assert_eq!(parse_row_count(&fields).unwrap(), 4);

        fields.insert("row_count".to_string(), "four".to_string());
        assert!(matches!(parse_row_count(&fields), Err(ClerkError::InvalidForm(_))));

        fields.remove("row_count");
        assert!(matches!(parse_row_count(&fields), Err(ClerkError::InvalidForm(_))));
    }

    #[test]
    fn row_count_beyond_submitted_cells_is_rejected() {
        let mut fields = form(&[(0, 0, "123"), (0, 1, "GNP")]);
        fields.insert("row_count".to_string(), "1000000000000".to_string());
        assert!(matches!(parse_row_count(&fields), Err(ClerkError::InvalidForm(_))));

        fields.insert("row_count".to_string(), "2".to_string());
        assert_eq!(parse_row_count(&fields).unwrap(), 2);
    }

    #[test]
    fn cell_field_names_parse_back() {
        assert_eq!(parse_cell_field_name(&cell_field_name(3, 7)), Some((3, 7)));
        assert_eq!(parse_cell_field_name(&format!("row-{}-col-0", usize::MAX)), Some((usize::MAX, 0)));
        assert_eq!(parse_cell_field_name("row-99999999999999999999-col-0"), None);
        assert_eq!(parse_cell_field_name("row_count"), None);
        assert_eq!(parse_cell_field_name("row-1-col-x"), None);
    }
}
