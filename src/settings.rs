// Import necessary libraries and modules for file I/O and serialization.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage::{Storage, THEME_KEY};

pub const SETTINGS_FILE: &str = "settings.json";

const MIN_DEBOUNCE_MS: u64 = 100;
const MAX_DEBOUNCE_MS: u64 = 300;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    // Anything other than "dark" is the light theme.
    pub fn parse(value: &str) -> Self {
        if value == "dark" { Theme::Dark } else { Theme::Light }
    }

    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get(THEME_KEY) {
            Ok(Some(value)) => Theme::parse(&value),
            Ok(None) => Theme::default(),
            Err(e) => {
                log::warn!("Failed to read theme: {e}");
                Theme::default()
            }
        }
    }

    pub fn store(&self, storage: &dyn Storage) {
        if let Err(e) = storage.set(THEME_KEY, self.as_str()) {
            log::error!("Failed to save theme: {e}");
        }
    }
}

// Define a structure to hold application settings with serialization and deserialization capabilities.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub data_dir: Option<PathBuf>, // Where sheets and logs live; defaults to ~/tormenta/data.
    pub save_debounce_ms: u64,     // Quiet period before a burst of edits is written.
    pub theme: Theme,
    pub debug_mode: bool, // Flag to enable or disable debug logging.
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: None,
            save_debounce_ms: 200,
            theme: Theme::Light,
            debug_mode: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_data_dir() -> PathBuf {
        dir::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tormenta")
            .join("data")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(Self::default_data_dir)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS))
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }

    // Load settings from a specified file path.
    pub fn load_settings_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    // Save current settings to a specified file path.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }
}
