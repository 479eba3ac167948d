//! SQLite storage implementation

use std::path::Path;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use crate::config::IvyConfig;
use crate::line_requirements::decode_line_requirements;
use crate::medication::{Antidote, Medication, MedicationReference};
use crate::{Error, Result};
use super::schema;

const MEDICATION_COLUMNS: &str = "id, name, brand_name, drug_class, indication, administration_recommendations, \
     line_requirements, extravasation_risk, extravasation_management, mechanism_of_injury, \
     dosage_considerations, preparation_guidelines, administration_guidelines, \
     evidence_level, last_updated, is_free, search_terms";

/// SQLite-backed storage for medications and their antidotes and references.
///
/// Holds a single connection. Every read goes to the database; nothing is
/// cached between calls.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!("Opened medication store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open the database named by the configuration.
    ///
    /// A configuration without a database path is fatal.
    pub fn from_config(config: &IvyConfig) -> Result<Self> {
        let path = config
            .database
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::Configuration("no database path configured".to_string()))?;
        Self::open(Path::new(path))
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Medication Operations ==========

    /// Insert a medication together with any antidotes and references it carries.
    ///
    /// `search_terms` is recomputed, a missing or blank `last_updated` defaults
    /// to now. The parent row and its children are written in one transaction.
    pub fn create_medication(&self, medication: &Medication) -> Result<()> {
        if medication.id.trim().is_empty() {
            return Err(Error::InvalidRecord("medication id is empty".to_string()));
        }
        if medication.name.trim().is_empty() {
            return Err(Error::InvalidRecord(format!("medication {} has no name", medication.id)));
        }

        let last_updated = medication
            .last_updated
            .clone()
            .filter(|updated| !updated.trim().is_empty())
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        let line_requirements = medication.line_requirements.encode()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO Medications ({MEDICATION_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
            ),
            params![
                medication.id,
                medication.name,
                medication.brand_name,
                medication.drug_class,
                medication.indication,
                medication.administration_recommendations,
                line_requirements,
                medication.extravasation_risk,
                medication.extravasation_management,
                medication.mechanism_of_injury,
                medication.dosage_considerations,
                medication.preparation_guidelines,
                medication.administration_guidelines,
                medication.evidence_level,
                last_updated,
                medication.is_free as i64,
                medication.derive_search_terms(),
            ],
        )?;

        for antidote in medication.antidotes.iter().flatten() {
            insert_antidote(&tx, &medication.id, antidote)?;
        }
        for reference in medication.references.iter().flatten() {
            insert_reference(&tx, &medication.id, reference)?;
        }
        tx.commit()?;

        tracing::debug!(
            "Inserted medication {} ({}) with {} antidotes, {} references",
            medication.id,
            medication.name,
            medication.antidotes.as_ref().map_or(0, Vec::len),
            medication.references.as_ref().map_or(0, Vec::len),
        );
        Ok(())
    }

    /// Get a medication by id with its antidotes and references attached
    pub fn get_medication_by_id(&self, id: &str) -> Result<Option<Medication>> {
        let medication = self
            .conn
            .query_row(
                &format!("SELECT {MEDICATION_COLUMNS} FROM Medications WHERE id = ?1"),
                [id],
                row_to_medication,
            )
            .optional()?;

        let Some(mut medication) = medication else {
            return Ok(None);
        };

        medication.antidotes = Some(self.get_antidotes_for_medication(id)?);
        medication.references = Some(self.get_references_for_medication(id)?);
        Ok(Some(medication))
    }

    /// List medications ordered by name. Children are not attached.
    pub fn list_medications(&self, limit: usize, offset: usize) -> Result<Vec<Medication>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM Medications ORDER BY name LIMIT ?1 OFFSET ?2"
        ))?;

        let medications = stmt
            .query_map(params![limit as i64, offset as i64], row_to_medication)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(medications)
    }

    /// Case-insensitive substring search over name, brand, class, indication
    /// and search terms, ordered by name. Children are not attached.
    pub fn search_medications(&self, query: &str, limit: usize) -> Result<Vec<Medication>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));

        let mut stmt = self.conn.prepare(&format!(
            r#"SELECT {MEDICATION_COLUMNS} FROM Medications
               WHERE lower(name) LIKE ?1 ESCAPE '\'
                  OR lower(brand_name) LIKE ?1 ESCAPE '\'
                  OR lower(drug_class) LIKE ?1 ESCAPE '\'
                  OR lower(indication) LIKE ?1 ESCAPE '\'
                  OR lower(search_terms) LIKE ?1 ESCAPE '\'
               ORDER BY name
               LIMIT ?2"#
        ))?;

        let medications = stmt
            .query_map(params![pattern, limit as i64], row_to_medication)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!("Search {:?} matched {} medications", query, medications.len());
        Ok(medications)
    }

    /// Count all medications
    pub fn count_medications(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM Medications")
    }

    // ========== Antidote Operations ==========

    /// Insert an antidote for an existing medication, returning its id
    pub fn add_antidote(&self, medication_id: &str, antidote: &Antidote) -> Result<i64> {
        insert_antidote(&self.conn, medication_id, antidote)
    }

    /// Antidotes for a medication, ordered by priority label
    pub fn get_antidotes_for_medication(&self, medication_id: &str) -> Result<Vec<Antidote>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, medication_id, name, priority, preparation, administration, evidence_level, reference \
             FROM Antidotes WHERE medication_id = ?1 ORDER BY priority"
        )?;

        let antidotes = stmt
            .query_map([medication_id], row_to_antidote)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(antidotes)
    }

    // ========== Reference Operations ==========

    /// Insert a reference for an existing medication, returning its id
    pub fn add_reference(&self, medication_id: &str, reference: &MedicationReference) -> Result<i64> {
        insert_reference(&self.conn, medication_id, reference)
    }

    /// References for a medication
    pub fn get_references_for_medication(&self, medication_id: &str) -> Result<Vec<MedicationReference>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, medication_id, citation, url FROM MedicationReferences WHERE medication_id = ?1 ORDER BY id"
        )?;

        let references = stmt
            .query_map([medication_id], row_to_reference)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(references)
    }

    // ========== Statistics ==========

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            medications: self.count_medications()?,
            free_medications: self.count("SELECT COUNT(*) FROM Medications WHERE is_free != 0")?,
            antidotes: self.count("SELECT COUNT(*) FROM Antidotes")?,
            references: self.count("SELECT COUNT(*) FROM MedicationReferences")?,
        })
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn insert_antidote(conn: &Connection, medication_id: &str, antidote: &Antidote) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO Antidotes (medication_id, name, priority, preparation, administration, evidence_level, reference)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            medication_id,
            antidote.name,
            antidote.priority,
            antidote.preparation,
            antidote.administration,
            antidote.evidence_level,
            antidote.reference,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_reference(conn: &Connection, medication_id: &str, reference: &MedicationReference) -> Result<i64> {
    conn.execute(
        "INSERT INTO MedicationReferences (medication_id, citation, url) VALUES (?1, ?2, ?3)",
        params![medication_id, reference.citation, reference.url],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Escape LIKE wildcards so the query matches literally
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Helper to convert a Medications row; column order follows `MEDICATION_COLUMNS`
fn row_to_medication(row: &rusqlite::Row) -> rusqlite::Result<Medication> {
    let line_requirements: Option<String> = row.get(6)?;
    let is_free: Option<i64> = row.get(15)?;

    Ok(Medication {
        id: row.get(0)?,
        name: row.get(1)?,
        brand_name: row.get(2)?,
        drug_class: row.get(3)?,
        indication: row.get(4)?,
        administration_recommendations: row.get(5)?,
        line_requirements: decode_line_requirements(line_requirements.as_deref()),
        extravasation_risk: row.get(7)?,
        extravasation_management: row.get(8)?,
        mechanism_of_injury: row.get(9)?,
        dosage_considerations: row.get(10)?,
        preparation_guidelines: row.get(11)?,
        administration_guidelines: row.get(12)?,
        evidence_level: row.get(13)?,
        last_updated: row.get(14)?,
        is_free: is_free.unwrap_or(0) != 0,
        search_terms: row.get(16)?,
        antidotes: None,
        references: None,
    })
}

fn row_to_antidote(row: &rusqlite::Row) -> rusqlite::Result<Antidote> {
    Ok(Antidote {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        name: row.get(2)?,
        priority: row.get(3)?,
        preparation: row.get(4)?,
        administration: row.get(5)?,
        evidence_level: row.get(6)?,
        reference: row.get(7)?,
    })
}

fn row_to_reference(row: &rusqlite::Row) -> rusqlite::Result<MedicationReference> {
    Ok(MedicationReference {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        citation: row.get(2)?,
        url: row.get(3)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub medications: usize,
    pub free_medications: usize,
    pub antidotes: usize,
    pub references: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Medications: {} ({} free)", self.medications, self.free_medications)?;
        writeln!(f, "  Antidotes: {}", self.antidotes)?;
        writeln!(f, "  References: {}", self.references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_requirements::LineRequirements;
    use crate::medication::{ExtravasationRisk, FIRST_CHOICE};

    fn sample_medication(id: &str, name: &str) -> Medication {
        Medication::new(id, name)
            .with_drug_class("Vinca alkaloid")
            .with_risk(ExtravasationRisk::Vesicant)
    }

    fn seed(store: &SqliteStore, names: &[(&str, &str)]) {
        for (id, name) in names {
            store.create_medication(&Medication::new(*id, *name)).unwrap();
        }
    }

    #[test]
    fn test_medication_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();

        let med = Medication {
            id: "m1".to_string(),
            name: "Vincristine".to_string(),
            brand_name: Some("Oncovin".to_string()),
            drug_class: Some("Vinca alkaloid".to_string()),
            indication: Some("Acute lymphoblastic leukemia".to_string()),
            administration_recommendations: Some("Minibag infusion only".to_string()),
            line_requirements: LineRequirements::new(true, false, true),
            extravasation_risk: Some("Vesicant".to_string()),
            extravasation_management: Some("Stop infusion, apply warm compress".to_string()),
            mechanism_of_injury: Some("DNA-binding vesicant".to_string()),
            dosage_considerations: Some("Cap at 2 mg".to_string()),
            preparation_guidelines: Some("Dilute in 50 mL".to_string()),
            administration_guidelines: Some("Never intrathecal".to_string()),
            evidence_level: Some("High".to_string()),
            last_updated: Some("2024-01-01T00:00:00.000Z".to_string()),
            is_free: true,
            search_terms: None,
            antidotes: None,
            references: None,
        };
        store.create_medication(&med).unwrap();

        let expected = Medication {
            search_terms: Some("vincristine oncovin vinca alkaloid acute lymphoblastic leukemia vesicant".to_string()),
            antidotes: Some(vec![]),
            references: Some(vec![]),
            ..med
        };
        let retrieved = store.get_medication_by_id("m1").unwrap().unwrap();
        assert_eq!(retrieved, expected);
    }

    #[test]
    fn test_blank_last_updated_defaults() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut med = Medication::new("m1", "Saline");
        med.last_updated = Some("  ".to_string());
        store.create_medication(&med).unwrap();

        let stamp = store.get_medication_by_id("m1").unwrap().unwrap().last_updated.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_vincristine_with_antidote() {
        let store = SqliteStore::open_in_memory().unwrap();

        let med = Medication::new("m1", "Vincristine")
            .with_risk(ExtravasationRisk::Vesicant)
            .with_antidote(Antidote::new("Hyaluronidase", FIRST_CHOICE));
        store.create_medication(&med).unwrap();

        let retrieved = store.get_medication_by_id("m1").unwrap().unwrap();
        let antidotes = retrieved.antidotes.unwrap();
        assert_eq!(antidotes.len(), 1);
        assert_eq!(antidotes[0].name, "Hyaluronidase");
        assert_eq!(antidotes[0].medication_id, "m1");
        assert!(antidotes[0].id.is_some());

        assert!(store.get_medication_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_defaults_applied_on_create() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_medication(&Medication::new("m1", "Saline")).unwrap();

        let retrieved = store.get_medication_by_id("m1").unwrap().unwrap();
        assert_eq!(retrieved.line_requirements, LineRequirements::default());
        let stamp = retrieved.last_updated.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_malformed_line_requirements_column() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_medication(&Medication::new("m1", "Saline")).unwrap();
        store
            .conn
            .execute("UPDATE Medications SET line_requirements = 'not json' WHERE id = 'm1'", [])
            .unwrap();

        let retrieved = store.get_medication_by_id("m1").unwrap().unwrap();
        assert_eq!(retrieved.line_requirements, LineRequirements::default());
    }

    #[test]
    fn test_duplicate_id_is_storage_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_medication(&Medication::new("m1", "Vincristine")).unwrap();

        let dup = Medication::new("m1", "Vinblastine").with_antidote(Antidote::new("Hyaluronidase", FIRST_CHOICE));
        let err = store.create_medication(&dup).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        assert!(store.get_antidotes_for_medication("m1").unwrap().is_empty());
        assert_eq!(store.count_medications().unwrap(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.create_medication(&Medication::new("m1", "  ")).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
        let err = store.create_medication(&Medication::new("", "Saline")).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
    }

    #[test]
    fn test_child_requires_existing_parent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .add_antidote("ghost", &Antidote::new("Hyaluronidase", FIRST_CHOICE))
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_list_pages_in_name_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed(&store, &[("d", "Dopamine"), ("a", "Acyclovir"), ("v", "Vincristine"), ("c", "Calcium chloride")]);

        let first = store.list_medications(2, 0).unwrap();
        let second = store.list_medications(2, 2).unwrap();

        let names: Vec<_> = first.iter().chain(second.iter()).map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Acyclovir", "Calcium chloride", "Dopamine", "Vincristine"]);
        assert!(first.iter().all(|m| m.antidotes.is_none() && m.references.is_none()));

        assert!(store.list_medications(2, 4).unwrap().is_empty());
    }

    #[test]
    fn test_search_substring_case_insensitive() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_medication(&sample_medication("v", "Vincristine")).unwrap();
        store.create_medication(&Medication::new("d", "Dopamine").with_brand_name("Intropin")).unwrap();

        let results = store.search_medications("CRIST", 50).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "v");

        let results = store.search_medications("intro", 50).unwrap();
        assert_eq!(results[0].name, "Dopamine");

        // risk only lives in search_terms
        let results = store.search_medications("vesicant", 50).unwrap();
        assert_eq!(results.len(), 1);

        assert!(store.search_medications("zzz", 50).unwrap().is_empty());
    }

    #[test]
    fn test_search_limit_and_literal_wildcards() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed(&store, &[("1", "Dextrose 10%"), ("2", "Dextrose 50%"), ("3", "Dobutamine")]);

        let results = store.search_medications("", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Dextrose 10%");

        let results = store.search_medications("0%", 50).unwrap();
        assert_eq!(results.len(), 2);
        assert!(store.search_medications("_obutamine", 50).unwrap().is_empty());
    }

    #[test]
    fn test_children_ordering_and_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let med = Medication::new("m1", "Doxorubicin")
            .with_antidote(Antidote::new("Cold compress", "Second Choice"))
            .with_antidote(Antidote::new("Dexrazoxane", FIRST_CHOICE))
            .with_reference(MedicationReference::new("Product monograph", None));
        store.create_medication(&med).unwrap();
        store.create_medication(&Medication::new("m2", "Saline")).unwrap();

        let antidotes = store.get_antidotes_for_medication("m1").unwrap();
        assert_eq!(antidotes[0].name, "Dexrazoxane");
        assert_eq!(antidotes[1].name, "Cold compress");

        let id = store
            .add_reference("m1", &MedicationReference::new("Extravasation guideline", Some("https://example.org".into())))
            .unwrap();
        let references = store.get_references_for_medication("m1").unwrap();
        assert_eq!(references.len(), 2);
        assert_eq!(references[1].id, Some(id));

        assert!(store.get_antidotes_for_medication("m2").unwrap().is_empty());
        assert!(store.get_references_for_medication("m2").unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .create_medication(&Medication::new("m1", "Saline").free().with_antidote(Antidote::new("None", FIRST_CHOICE)))
            .unwrap();
        store.create_medication(&Medication::new("m2", "Vincristine")).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.medications, 2);
        assert_eq!(stats.free_medications, 1);
        assert_eq!(stats.antidotes, 1);
        assert_eq!(stats.references, 0);
    }

    #[test]
    fn test_from_config() {
        let err = SqliteStore::from_config(&IvyConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Configuration(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ivy.db");
        let config = IvyConfig {
            database: Some(path.to_string_lossy().to_string()),
            ..IvyConfig::default()
        };
        {
            let store = SqliteStore::from_config(&config).unwrap();
            store.create_medication(&Medication::new("m1", "Saline")).unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count_medications().unwrap(), 1);
    }
}
