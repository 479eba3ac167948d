//! Bulk import of medication records
//!
//! Reads a JSON array of medications (with nested `antidotes` and
//! `references`) and inserts them one at a time. Each element is decoded on
//! its own, so a record that fails to decode or insert is reported and
//! skipped; the rest of the batch still goes in.

use std::path::Path;
use serde::Serialize;
use serde_json::Value;
use crate::medication::Medication;
use crate::storage::SqliteStore;
use crate::Result;

/// A record that could not be inserted
#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub id: String,
    pub name: String,
    pub error: String,
}

impl ImportFailure {
    fn new(record: &Value, error: impl ToString) -> Self {
        let field = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: field("id").unwrap_or_default(),
            name: field("name").unwrap_or_else(|| "<unnamed>".to_string()),
            error: error.to_string(),
        }
    }
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub failed: Vec<ImportFailure>,
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Import Summary:")?;
        writeln!(f, "  Inserted: {}", self.inserted)?;
        write!(f, "  Failed: {}", self.failed.len())
    }
}

/// Read raw medication records from a JSON file.
///
/// The file must hold a JSON array; its elements are decoded later, one by one.
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)?;
    parse_records(&contents)
}

pub fn parse_records(json: &str) -> Result<Vec<Value>> {
    Ok(serde_json::from_str(json)?)
}

/// Decode one record. A missing, null or blank `id` gets a fresh UUID.
pub fn decode_record(record: &Value) -> Result<Medication> {
    let mut record = record.clone();
    if let Some(fields) = record.as_object_mut() {
        if fields.get("id").is_some_and(Value::is_null) {
            fields.remove("id");
        }
    }

    let mut medication: Medication = serde_json::from_value(record)?;
    if medication.id.trim().is_empty() {
        medication.id = uuid::Uuid::new_v4().to_string();
    }
    Ok(medication)
}

/// Decode and insert each record, continuing past failures
pub fn import_records(store: &SqliteStore, records: &[Value]) -> ImportReport {
    let mut report = ImportReport::default();

    for record in records {
        let medication = match decode_record(record) {
            Ok(medication) => medication,
            Err(e) => {
                let failure = ImportFailure::new(record, e);
                tracing::error!("Failed to decode medication {}: {}", failure.name, failure.error);
                report.failed.push(failure);
                continue;
            }
        };

        match store.create_medication(&medication) {
            Ok(()) => {
                tracing::info!("Added medication: {}", medication.name);
                report.inserted += 1;
            }
            Err(e) => {
                tracing::error!("Failed to add medication {}: {}", medication.name, e);
                report.failed.push(ImportFailure {
                    id: medication.id.clone(),
                    name: medication.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const RECORDS: &str = r#"[
        {
            "id": "vinc",
            "name": "Vincristine",
            "extravasation_risk": "Vesicant",
            "line_requirements": {"central": true},
            "antidotes": [{"name": "Hyaluronidase", "priority": "First Choice"}],
            "references": [{"citation": "Main Reference for Vincristine", "url": "https://example.org/vinc"}]
        },
        {"id": "vinc", "name": "Vincristine again"},
        {"name": "Saline", "is_free": 1}
    ]"#;

    #[test]
    fn test_import_continues_past_bad_record() {
        let store = SqliteStore::open_in_memory().unwrap();
        let records = parse_records(RECORDS).unwrap();
        let report = import_records(&store, &records);

        assert_eq!(report.inserted, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "Vincristine again");

        let vinc = store.get_medication_by_id("vinc").unwrap().unwrap();
        assert!(vinc.line_requirements.central);
        assert_eq!(vinc.references.unwrap()[0].url.as_deref(), Some("https://example.org/vinc"));

        let saline = store.search_medications("saline", 10).unwrap();
        assert_eq!(saline.len(), 1);
        assert!(saline[0].is_free);
        assert!(uuid::Uuid::parse_str(&saline[0].id).is_ok());
    }

    #[test]
    fn test_null_id_and_lax_line_requirements() {
        let store = SqliteStore::open_in_memory().unwrap();
        let records = parse_records(
            r#"[
                {"id": "a", "name": "Amiodarone", "line_requirements": null},
                {"id": null, "name": "Dopamine", "line_requirements": "{\"peripheral\": 1}"},
                {"id": "c", "name": "Calcium chloride", "line_requirements": {"central": 1}}
            ]"#,
        )
        .unwrap();
        let report = import_records(&store, &records);

        assert_eq!(report.inserted, 3);
        assert!(report.failed.is_empty());

        let dopamine = &store.search_medications("dopamine", 10).unwrap()[0];
        assert!(uuid::Uuid::parse_str(&dopamine.id).is_ok());
        assert!(dopamine.line_requirements.peripheral);
        assert!(store.get_medication_by_id("c").unwrap().unwrap().line_requirements.central);
    }

    #[test]
    fn test_badly_typed_record_is_skipped() {
        let store = SqliteStore::open_in_memory().unwrap();
        let records = parse_records(
            r#"[
                {"id": "a", "name": "Amiodarone"},
                {"id": "b", "name": 42},
                {"id": "c", "name": "Calcium chloride", "is_free": "sometimes"},
                {"id": "d", "name": "Dopamine"}
            ]"#,
        )
        .unwrap();
        let report = import_records(&store, &records);

        assert_eq!(report.inserted, 2);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].id, "b");
        assert_eq!(report.failed[0].name, "<unnamed>");
        assert_eq!(report.failed[1].name, "Calcium chloride");
        assert!(store.get_medication_by_id("a").unwrap().is_some());
        assert!(store.get_medication_by_id("d").unwrap().is_some());
    }

    #[test]
    fn test_decode_record_rejects_non_object() {
        assert!(matches!(decode_record(&Value::from(3)), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let err = parse_records(r#"{"name": "not an array"}"#).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_read_records_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meds.json");
        std::fs::write(&path, RECORDS).unwrap();

        assert_eq!(read_records(&path).unwrap().len(), 3);
        assert!(matches!(read_records(&dir.path().join("missing.json")), Err(Error::Io(_))));
    }
}
