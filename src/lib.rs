pub mod catalog;
pub mod character;
pub mod debounce;
pub mod dice;
pub mod error;
pub mod logging;
pub mod save;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod transfer;
pub mod utils;

// Re-export commonly used items for easier access
pub use character::{Attribute, AttributeSet, CharacterRecord, RecordPatch, make_default, merge_update};
pub use error::{AppError, Result, StorageError};
pub use save::{Sheet, SheetMeta, SheetStore};
pub use settings::{Settings, Theme};
pub use stats::DerivedStats;
pub use storage::{FileStorage, MemoryStorage, Storage};
