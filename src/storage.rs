// Durable key-value storage for the sheet collection, in the spirit of a browser's local storage:
// string keys, whole string values, nothing fancier.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

pub const SHEETS_KEY: &str = "t20_sheets";
pub const ACTIVE_SHEET_KEY: &str = "t20_active_sheet_id";
pub const THEME_KEY: &str = "theme";

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// One file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // Written to a sibling temp file first so a crash never leaves half a collection behind.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let temp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&temp, value)?;
        fs::rename(&temp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<HashMap<String, usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    // How many times `key` has been written.
    pub fn write_count(&self, key: &str) -> usize {
        self.writes
            .lock()
            .map(|writes| writes.get(key).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        let mut writes = self.writes.lock().map_err(|_| StorageError::Poisoned)?;
        *writes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}
