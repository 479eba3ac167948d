//! Database schema definitions

/// SQL to create the Medications table
pub const CREATE_MEDICATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Medications (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    brand_name TEXT,
    drug_class TEXT,
    indication TEXT,
    administration_recommendations TEXT,
    line_requirements TEXT,
    extravasation_risk TEXT,
    extravasation_management TEXT,
    mechanism_of_injury TEXT,
    dosage_considerations TEXT,
    preparation_guidelines TEXT,
    administration_guidelines TEXT,
    evidence_level TEXT,
    last_updated TEXT,
    is_free INTEGER NOT NULL DEFAULT 0,
    search_terms TEXT
)
"#;

/// SQL to create the Antidotes table
pub const CREATE_ANTIDOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Antidotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    medication_id TEXT NOT NULL REFERENCES Medications(id),
    name TEXT NOT NULL,
    priority TEXT,
    preparation TEXT,
    administration TEXT,
    evidence_level TEXT,
    reference TEXT
)
"#;

/// SQL to create the MedicationReferences table
pub const CREATE_REFERENCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS MedicationReferences (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    medication_id TEXT NOT NULL REFERENCES Medications(id),
    citation TEXT NOT NULL,
    url TEXT
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_medications_name ON Medications(name)",
    "CREATE INDEX IF NOT EXISTS idx_antidotes_medication ON Antidotes(medication_id)",
    "CREATE INDEX IF NOT EXISTS idx_references_medication ON MedicationReferences(medication_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_MEDICATIONS_TABLE,
        CREATE_ANTIDOTES_TABLE,
        CREATE_REFERENCES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
