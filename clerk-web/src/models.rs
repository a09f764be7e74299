use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use policy_clerk::domain::{SenderAccount, SheetDefinition};
use policy_clerk::pipeline::review::{cell_field_name, parse_cell_field_name};

// View models consumed by the templates

#[derive(Debug, Clone)]
pub struct SheetOption {
    pub name: String,
    pub grouped: bool,
}

impl From<&SheetDefinition> for SheetOption {
    fn from(sheet: &SheetDefinition) -> Self {
        Self { name: sheet.name.clone(), grouped: sheet.is_grouped() }
    }
}

#[derive(Debug, Clone)]
pub struct SenderOption {
    pub key: String,
    pub name: String,
}

impl From<&SenderAccount> for SenderOption {
    fn from(sender: &SenderAccount) -> Self {
        Self { key: sender.key.clone(), name: sender.display_name.clone() }
    }
}

/// One editable cell; `field` is the form field name the save route reads back
#[derive(Debug, Clone)]
pub struct ReviewCell {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ReviewRow {
    pub cells: Vec<ReviewCell>,
}

pub fn review_rows(grid: Vec<Vec<String>>) -> Vec<ReviewRow> {
    grid.into_iter()
        .enumerate()
        .map(|(r, values)| ReviewRow {
            cells: values
                .into_iter()
                .enumerate()
                .map(|(c, value)| ReviewCell { field: cell_field_name(r, c), value })
                .collect(),
        })
        .collect()
}

/// The grid as submitted, for re-rendering the form when saving fails.
///
/// Rows appear in index order with gaps closed up, each `column_count` wide;
/// cells in columns past the schema are ignored.
pub fn submitted_grid(fields: &HashMap<String, String>, column_count: usize) -> Vec<Vec<String>> {
    let mut rows: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (name, value) in fields {
        let Some((r, c)) = parse_cell_field_name(name) else { continue };
        if c >= column_count {
            continue;
        }
        rows.entry(r).or_insert_with(|| vec![String::new(); column_count])[c] = value.clone();
    }
    rows.into_values().collect()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sheets: usize,
    pub timestamp: String,
}
