//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - Medications(id, name, brand_name, drug_class, ..., is_free, search_terms)
//! - Antidotes(id, medication_id, name, priority, preparation, administration, evidence_level, reference)
//! - MedicationReferences(id, medication_id, citation, url)

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, DbStats};
