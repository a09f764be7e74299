use serde::Deserialize;

use crate::domain::SheetDefinition;
use crate::error::{ClerkError, Result};
use crate::prompts::{GROUPED_AUTOS_INSTRUCTIONS, GROUPED_GMM_INSTRUCTIONS, GROUPED_VIDA_INSTRUCTIONS};

pub const GROUPS_GMM: &str = "GruposGMM";
pub const GROUPS_AUTOS: &str = "Grupos Autos";
pub const GROUPS_VIDA: &str = "Grupos Vida";

const FLAT_SHEETS: [&str; 8] = ["Autos", "GMM", "Hogar", "Transporte", "Vida", "Mascotas", "Negocio", "Diversos"];

/// `[[sheets]]` entry in config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct SheetEntry {
    pub name: String,
    pub kind: SheetKindTag,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKindTag {
    Flat,
    Grouped,
}

/// The destination tabs uploads may target
#[derive(Debug, Clone)]
pub struct SheetCatalog {
    sheets: Vec<SheetDefinition>,
}

impl Default for SheetCatalog {
    fn default() -> Self {
        let mut sheets: Vec<SheetDefinition> = FLAT_SHEETS.iter().map(|n| SheetDefinition::flat(*n)).collect();
        sheets.push(SheetDefinition::grouped(GROUPS_GMM, GROUPED_GMM_INSTRUCTIONS));
        sheets.push(SheetDefinition::grouped(GROUPS_AUTOS, GROUPED_AUTOS_INSTRUCTIONS));
        sheets.push(SheetDefinition::grouped(GROUPS_VIDA, GROUPED_VIDA_INSTRUCTIONS));
        Self { sheets }
    }
}

impl SheetCatalog {
    pub fn new(sheets: Vec<SheetDefinition>) -> Self {
        Self { sheets }
    }

    /// Builds the catalog from config entries; an empty list keeps the defaults
    pub fn from_entries(entries: &[SheetEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Ok(Self::default());
        }

        let mut sheets = Vec::with_capacity(entries.len());
        for entry in entries {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(ClerkError::Config("sheet entry with an empty name".to_string()));
            }
            if sheets.iter().any(|s: &SheetDefinition| s.name == name) {
                return Err(ClerkError::Config(format!("sheet '{}' is listed twice", name)));
            }
            let definition = match entry.kind {
                SheetKindTag::Flat => SheetDefinition::flat(name),
                SheetKindTag::Grouped => {
                    let instructions = entry
                        .instructions
                        .clone()
                        .or_else(|| builtin_grouped_instructions(name).map(str::to_string))
                        .ok_or_else(|| {
                            ClerkError::Config(format!("grouped sheet '{}' needs instructions", name))
                        })?;
                    SheetDefinition::grouped(name, instructions)
                }
            };
            sheets.push(definition);
        }
        Ok(Self { sheets })
    }

    pub fn get(&self, name: &str) -> Option<&SheetDefinition> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Looks up a sheet or fails with `InvalidSheet`
    pub fn resolve(&self, name: &str) -> Result<&SheetDefinition> {
        self.get(name).ok_or_else(|| ClerkError::InvalidSheet(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheets(&self) -> &[SheetDefinition] {
        &self.sheets
    }
}

fn builtin_grouped_instructions(name: &str) -> Option<&'static str> {
    match name {
        GROUPS_GMM => Some(GROUPED_GMM_INSTRUCTIONS),
        GROUPS_AUTOS => Some(GROUPED_AUTOS_INSTRUCTIONS),
        GROUPS_VIDA => Some(GROUPED_VIDA_INSTRUCTIONS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SheetKind;

    #[test]
    fn default_catalog_has_flat_and_grouped_sheets() {
        let catalog = SheetCatalog::default();
        assert_eq!(catalog.get("Autos").unwrap().kind, SheetKind::Flat);
        assert!(catalog.get(GROUPS_GMM).unwrap().is_grouped());
        assert!(catalog.get(GROUPS_VIDA).unwrap().is_grouped());
        assert_eq!(catalog.names().len(), 11);
    }

    #[test]
    fn unknown_sheet_is_invalid() {
        let err = SheetCatalog::default().resolve("Barcos").unwrap_err();
        assert!(matches!(err, ClerkError::InvalidSheet(name) if name == "Barcos"));
    }

    #[test]
    fn grouped_entry_falls_back_to_builtin_instructions() {
        let entries = vec![
            SheetEntry { name: "Autos".into(), kind: SheetKindTag::Flat, instructions: None },
            SheetEntry { name: GROUPS_GMM.into(), kind: SheetKindTag::Grouped, instructions: None },
        ];
        let catalog = SheetCatalog::from_entries(&entries).unwrap();
        match &catalog.get(GROUPS_GMM).unwrap().kind {
            SheetKind::Grouped { instructions } => assert_eq!(instructions, GROUPED_GMM_INSTRUCTIONS),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn grouped_entry_without_instructions_is_rejected() {
        let entries = vec![SheetEntry { name: "Grupos Barcos".into(), kind: SheetKindTag::Grouped, instructions: None }];
        assert!(matches!(SheetCatalog::from_entries(&entries), Err(ClerkError::Config(_))));
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let entries = vec![
            SheetEntry { name: "Autos".into(), kind: SheetKindTag::Flat, instructions: None },
            SheetEntry { name: "Autos".into(), kind: SheetKindTag::Flat, instructions: None },
        ];
        assert!(SheetCatalog::from_entries(&entries).is_err());
    }
}
