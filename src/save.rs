use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::character::{CharacterRecord, RecordPatch, make_default, merge_update};
use crate::debounce::{SaveFailure, SaveScheduler};
use crate::error::StorageError;
use crate::storage::{ACTIVE_SHEET_KEY, SHEETS_KEY, Storage};
use crate::utils::{lenient_int, lenient_string};

pub use crate::utils::generate_id;

pub const NEW_SHEET_NAME: &str = "New Sheet";
pub const IMPORTED_SHEET_NAME: &str = "Imported Sheet";

// Display data for the sheet list, refreshed on every change to the record.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SheetMeta {
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "nivel", deserialize_with = "lenient_int")]
    pub level: i64,
}

impl SheetMeta {
    pub fn for_record(record: &CharacterRecord, fallback_name: &str) -> Self {
        Self {
            name: record.display_name().unwrap_or(fallback_name).to_string(),
            level: record.total_level(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Sheet {
    pub id: String,
    #[serde(default)]
    pub meta: SheetMeta,
    #[serde(default)]
    pub data: CharacterRecord,
}

impl Sheet {
    pub fn new(record: CharacterRecord, fallback_name: &str) -> Self {
        Self {
            id: generate_id(),
            meta: SheetMeta::for_record(&record, fallback_name),
            data: record,
        }
    }

    /// Rebuilds one stored sheet field by field. Only a value that is not an object is dropped.
    pub fn from_value(mut value: Value) -> Option<Self> {
        let fields = value.as_object_mut()?;

        let data = CharacterRecord::from_value(fields.remove("data").unwrap_or(Value::Null));
        let id = match fields.remove("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            _ => generate_id(),
        };
        let meta = match fields.remove("meta") {
            Some(meta @ Value::Object(_)) => SheetMeta::deserialize(meta).unwrap_or_else(|e| {
                log::warn!("Unreadable metadata for sheet {id}: {e}");
                SheetMeta::for_record(&data, NEW_SHEET_NAME)
            }),
            _ => SheetMeta::for_record(&data, NEW_SHEET_NAME),
        };

        Some(Self { id, meta, data })
    }
}

/// Reads the stored collection. Absent or unreadable data is an empty collection; within a
/// readable array every sheet is recovered on its own.
pub fn load(storage: &dyn Storage) -> Vec<Sheet> {
    let raw = match storage.get(SHEETS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("Failed to read sheets: {e}");
            return Vec::new();
        }
    };

    let stored: Vec<Value> = match serde_json::from_str(&raw) {
        Ok(stored) => stored,
        Err(e) => {
            log::warn!("Stored sheets are not a readable list, starting fresh: {e}");
            return Vec::new();
        }
    };

    let total = stored.len();
    let sheets: Vec<Sheet> = stored.into_iter().filter_map(Sheet::from_value).collect();
    if sheets.len() < total {
        log::warn!("Skipped {} stored sheet(s) that were not objects", total - sheets.len());
    }
    sheets
}

// Owns every sheet plus the active pointer. Readers get shared references; all changes go
// through the methods below so the stored copy and the display metadata stay in step.
pub struct SheetStore {
    storage: Arc<dyn Storage>,
    sheets: Vec<Sheet>,
    active_id: String,
    scheduler: SaveScheduler,
}

impl SheetStore {
    /// Loads the stored collection, creating one blank sheet when there is none.
    pub fn open(storage: Arc<dyn Storage>, debounce: Duration) -> Self {
        let sheets = load(storage.as_ref());
        let stored_active = match storage.get(ACTIVE_SHEET_KEY) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Failed to read active sheet id: {e}");
                None
            }
        };

        let scheduler = SaveScheduler::new(storage.clone(), SHEETS_KEY, debounce);
        let mut store = Self {
            storage,
            sheets,
            active_id: String::new(),
            scheduler,
        };

        if store.sheets.is_empty() {
            log::info!("No stored sheets, creating a blank one");
            store.create_sheet(make_default());
        } else {
            let active = stored_active
                .filter(|id| store.sheet(id).is_some())
                .unwrap_or_else(|| store.sheets[0].id.clone());
            store.active_id = active;
        }

        log::debug!("Opened sheet store with {} sheet(s)", store.sheets.len());
        store
    }

    pub fn with_notices(mut self, notices: mpsc::UnboundedSender<SaveFailure>) -> Self {
        self.scheduler.set_notices(notices);
        self
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet(&self, id: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.id == id)
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> Option<&Sheet> {
        self.sheet(&self.active_id)
    }

    pub fn active_record(&self) -> Option<&CharacterRecord> {
        self.active().map(|sheet| &sheet.data)
    }

    pub fn create_sheet(&mut self, initial: CharacterRecord) -> &Sheet {
        let sheet = Sheet::new(initial, NEW_SHEET_NAME);
        self.insert_active(sheet)
    }

    pub(crate) fn insert_active(&mut self, sheet: Sheet) -> &Sheet {
        log::debug!("Adding sheet {} ({})", sheet.id, sheet.meta.name);
        let id = sheet.id.clone();
        self.sheets.push(sheet);
        self.set_active(id);
        self.schedule_save();

        let last = self.sheets.len() - 1;
        &self.sheets[last]
    }

    // Unknown ids are ignored.
    pub fn switch_active(&mut self, id: &str) {
        if self.sheet(id).is_none() {
            log::debug!("Ignoring switch to unknown sheet {id}");
            return;
        }
        self.set_active(id.to_string());
    }

    pub fn delete_sheet(&mut self, id: &str) {
        if self.sheet(id).is_none() {
            log::debug!("Ignoring delete of unknown sheet {id}");
            return;
        }

        // The store never goes empty: the replacement exists before the last sheet leaves.
        if self.sheets.len() == 1 {
            self.create_sheet(make_default());
        }

        self.sheets.retain(|sheet| sheet.id != id);
        log::debug!("Deleted sheet {id}");

        if self.active_id == id {
            let first = self.sheets[0].id.clone();
            self.set_active(first);
        }
        self.schedule_save();
    }

    /// Shallow-merges `patch` into the active record and refreshes its list metadata.
    pub fn update_active(&mut self, patch: RecordPatch) {
        let active_id = self.active_id.clone();
        let Some(sheet) = self.sheets.iter_mut().find(|sheet| sheet.id == active_id) else {
            log::debug!("No active sheet to update");
            return;
        };

        sheet.data = merge_update(&sheet.data, patch);
        sheet.meta = SheetMeta::for_record(&sheet.data, NEW_SHEET_NAME);
        self.schedule_save();
    }

    // The pointer is written straight away, outside the debounced batch.
    fn set_active(&mut self, id: String) {
        if let Err(e) = self.storage.set(ACTIVE_SHEET_KEY, &id) {
            log::error!("Error saving active sheet id: {e}");
        }
        self.active_id = id;
    }

    pub fn schedule_save(&mut self) {
        match serde_json::to_string(&self.sheets) {
            Ok(payload) => self.scheduler.schedule(payload),
            Err(e) => log::error!("Error serializing sheets: {e}"),
        }
    }

    pub async fn settled(&mut self) {
        self.scheduler.settled().await;
    }

    pub async fn flush(&mut self) -> Result<(), StorageError> {
        self.scheduler.flush().await
    }

    pub fn close(&mut self) {
        self.scheduler.cancel();
    }
}
