use tabled::{settings::Style, Table, Tabled};
use crate::medication::Medication;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// One line of a medication listing
#[derive(Tabled)]
pub struct MedicationRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Brand")]
    pub brand: String,
    #[tabled(rename = "Class")]
    pub class: String,
    #[tabled(rename = "Risk")]
    pub risk: String,
    #[tabled(rename = "Evidence")]
    pub evidence: String,
    #[tabled(rename = "Free")]
    pub free: String,
    #[tabled(rename = "ID")]
    pub id: String,
}

impl From<&Medication> for MedicationRow {
    fn from(med: &Medication) -> Self {
        let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        Self {
            name: med.name.clone(),
            brand: or_dash(&med.brand_name),
            class: or_dash(&med.drug_class),
            risk: med.extravasation_risk.clone().unwrap_or_else(|| "Unknown".to_string()),
            evidence: or_dash(&med.evidence_level),
            free: if med.is_free { "yes" } else { "" }.to_string(),
            id: med.id.clone(),
        }
    }
}

pub fn medication_table(medications: &[Medication]) -> String {
    if medications.is_empty() {
        return String::new();
    }
    let rows: Vec<MedicationRow> = medications.iter().map(MedicationRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
