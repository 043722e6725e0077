// Import and export of single characters as standalone JSON files.

use serde::Serialize;
use serde_json::Value;

use crate::character::CharacterRecord;
use crate::error::{AppError, Result};
use crate::save::{IMPORTED_SHEET_NAME, Sheet, SheetStore};

pub const EXPORT_NOTE: &str = "Exported from Tormenta 20 Character Sheet";
pub const EXPORT_SUFFIX: &str = "_tormenta20.json";
pub const FALLBACK_FILE_NAME: &str = "personagem";

#[derive(Serialize)]
struct ExportEnvelope<'a> {
    character: &'a CharacterRecord,
    validation_notes: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// Pretty-printed JSON of `{ character, validation_notes }`, named after the character.
pub fn export_record(record: &CharacterRecord) -> Result<ExportFile> {
    let envelope = ExportEnvelope {
        character: record,
        validation_notes: EXPORT_NOTE,
    };
    let contents = serde_json::to_vec_pretty(&envelope)?;

    Ok(ExportFile {
        file_name: export_file_name(record),
        contents,
    })
}

/// `<name>_tormenta20.json`, with the name reduced to a single safe path component.
pub fn export_file_name(record: &CharacterRecord) -> String {
    let cleaned: String = record
        .name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let name = cleaned.trim().trim_start_matches('.').trim_start();
    let name = if name.is_empty() { FALLBACK_FILE_NAME } else { name };
    format!("{name}{EXPORT_SUFFIX}")
}

/// Reads an exported file or a bare record. Only invalid JSON is an error; any other shape is
/// filled in from the defaults.
pub fn parse_import(raw: &str) -> Result<CharacterRecord> {
    let value: Value = serde_json::from_str(raw).map_err(AppError::MalformedImport)?;
    let character = match value {
        Value::Object(mut map) if is_truthy(map.get("character")) => {
            map.remove("character").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(CharacterRecord::from_value(character))
}

// Mirrors the old `data.character || data` check.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(_) => true,
    }
}

impl SheetStore {
    /// Adds the imported character as a new active sheet. On error the store is unchanged.
    pub fn import_record(&mut self, raw: &str) -> Result<&Sheet> {
        let record = parse_import(raw).inspect_err(|e| log::warn!("Import failed: {e}"))?;
        let sheet = Sheet::new(record, IMPORTED_SHEET_NAME);
        log::info!("Imported sheet {} ({})", sheet.id, sheet.meta.name);
        Ok(self.insert_active(sheet))
    }

    pub fn export_active(&self) -> Option<Result<ExportFile>> {
        self.active_record().map(export_record)
    }
}
