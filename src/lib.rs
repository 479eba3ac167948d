//! # Ivy - IV Medication Reference Store
//!
//! Evidence-based IV medication administration and extravasation management
//! data for clinicians.
//!
//! Ivy provides:
//! - A medication aggregate (medication, antidotes, references)
//! - SQLite-backed storage with case-insensitive substring search
//! - A defaulting codec for the line-requirements column
//! - Bulk import of medication records from JSON

pub mod medication;
pub mod line_requirements;
pub mod storage;
pub mod import;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use medication::{Access, Antidote, EvidenceLevel, ExtravasationRisk, Medication, MedicationReference};
pub use line_requirements::{decode_line_requirements, line_requirements_from_value, LineRequirements};
pub use storage::SqliteStore;

/// Result type alias for Ivy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Ivy operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}
