//! Paw Scan Common Library
//!
//! CLIとWeb(WASM)で共有される型・ストレージ抽象・スキャン履歴ストア

pub mod types;
pub mod error;
pub mod storage;
pub mod id;
pub mod history;
pub mod profile;
pub mod display;

pub use types::{
    BreedInfo, BreedScore, DogProfile, ExtraFields, InfoText, NewScan, PredictionResult, ScanHistoryEntry,
};
pub use error::{Error, Result};
pub use storage::{KeyValueStore, MemoryStorage};
pub use id::{generate_id, iso_timestamp};
pub use history::{ScanHistoryStore, StorageLayout, STORAGE_KEY};
pub use profile::{DogProfileStore, PROFILE_KEY};
pub use display::{display_breed, display_confidence, display_date, HistoryItemView};
