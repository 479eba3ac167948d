//! Medication aggregate
//!
//! A `Medication` is the aggregate root. Its `Antidote` and
//! `MedicationReference` children live in their own tables, keyed by the
//! medication id, and are only attached on full reads.

use crate::line_requirements::{decode_line_requirements, line_requirements_from_value, LineRequirements};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Priority label conventionally given to the preferred antidote
pub const FIRST_CHOICE: &str = "First Choice";

/// Extravasation risk classification.
///
/// Stored as an open string; these are the labels the data set uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtravasationRisk {
    Vesicant,
    Irritant,
    #[serde(rename = "Non-Vesicant")]
    NonVesicant,
}

impl ExtravasationRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtravasationRisk::Vesicant => "Vesicant",
            ExtravasationRisk::Irritant => "Irritant",
            ExtravasationRisk::NonVesicant => "Non-Vesicant",
        }
    }
}

impl FromStr for ExtravasationRisk {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "vesicant" => Ok(ExtravasationRisk::Vesicant),
            "irritant" => Ok(ExtravasationRisk::Irritant),
            "non-vesicant" | "nonvesicant" | "non vesicant" => Ok(ExtravasationRisk::NonVesicant),
            _ => Err(Error::InvalidRecord(format!("Unknown extravasation risk: {}", s))),
        }
    }
}

impl std::fmt::Display for ExtravasationRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strength of the evidence behind a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceLevel {
    High,
    Moderate,
    Limited,
    Insufficient,
}

/// Shown when the evidence level is missing or not one of the known labels
pub const GENERIC_EVIDENCE_DESCRIPTION: &str =
    "Evidence level indicates the quality and strength of scientific research supporting this recommendation.";

impl EvidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceLevel::High => "High",
            EvidenceLevel::Moderate => "Moderate",
            EvidenceLevel::Limited => "Limited",
            EvidenceLevel::Insufficient => "Insufficient",
        }
    }

    /// Clinician-facing explanation of the level
    pub fn description(&self) -> &'static str {
        match self {
            EvidenceLevel::High => "High: Strong evidence from multiple high-quality studies",
            EvidenceLevel::Moderate => {
                "Moderate: Evidence from at least one high-quality study or multiple moderate-quality studies"
            }
            EvidenceLevel::Limited => {
                "Limited: Evidence from at least one moderate-quality study or multiple low-quality studies"
            }
            EvidenceLevel::Insufficient => {
                "Insufficient: Insufficient evidence or evidence from low-quality studies only"
            }
        }
    }
}

impl FromStr for EvidenceLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(EvidenceLevel::High),
            "moderate" => Ok(EvidenceLevel::Moderate),
            "limited" => Ok(EvidenceLevel::Limited),
            "insufficient" => Ok(EvidenceLevel::Insufficient),
            _ => Err(Error::InvalidRecord(format!("Unknown evidence level: {}", s))),
        }
    }
}

impl std::fmt::Display for EvidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Explanation for a stored evidence label, known or not
pub fn evidence_description(level: Option<&str>) -> &'static str {
    level
        .and_then(|l| l.parse::<EvidenceLevel>().ok())
        .map(|l| l.description())
        .unwrap_or(GENERIC_EVIDENCE_DESCRIPTION)
}

/// Whether the clinical sections of a medication may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Open,
    Restricted,
}

/// An antidote or treatment for extravasation of a medication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Antidote {
    /// Assigned by the store
    #[serde(default)]
    pub id: Option<i64>,
    /// Parent medication; overwritten with the parent id on insert
    #[serde(default)]
    pub medication_id: String,
    pub name: String,
    /// Ranked label such as "First Choice"
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub preparation: Option<String>,
    #[serde(default)]
    pub administration: Option<String>,
    #[serde(default)]
    pub evidence_level: Option<String>,
    /// URL or citation
    #[serde(default)]
    pub reference: Option<String>,
}

impl Antidote {
    pub fn new(name: impl Into<String>, priority: impl Into<String>) -> Self {
        Self {
            id: None,
            medication_id: String::new(),
            name: name.into(),
            priority: Some(priority.into()),
            preparation: None,
            administration: None,
            evidence_level: None,
            reference: None,
        }
    }

    pub fn is_first_choice(&self) -> bool {
        self.priority.as_deref() == Some(FIRST_CHOICE)
    }
}

/// A literature reference for a medication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationReference {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub medication_id: String,
    pub citation: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl MedicationReference {
    pub fn new(citation: impl Into<String>, url: Option<String>) -> Self {
        Self {
            id: None,
            medication_id: String::new(),
            citation: citation.into(),
            url,
        }
    }
}

/// An IV medication with its extravasation guidance.
///
/// `antidotes` and `references` are `None` on partial reads (list, search)
/// and `Some` once fetched in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub drug_class: Option<String>,
    #[serde(default)]
    pub indication: Option<String>,
    #[serde(default)]
    pub administration_recommendations: Option<String>,
    /// Accepts an object, its JSON-encoded string form, or null
    #[serde(default, deserialize_with = "deserialize_line_requirements")]
    pub line_requirements: LineRequirements,
    /// "Vesicant", "Irritant" or "Non-Vesicant"
    #[serde(default)]
    pub extravasation_risk: Option<String>,
    #[serde(default)]
    pub extravasation_management: Option<String>,
    #[serde(default)]
    pub mechanism_of_injury: Option<String>,
    #[serde(default)]
    pub dosage_considerations: Option<String>,
    #[serde(default)]
    pub preparation_guidelines: Option<String>,
    #[serde(default)]
    pub administration_guidelines: Option<String>,
    #[serde(default)]
    pub evidence_level: Option<String>,
    /// RFC 3339 timestamp; filled in on insert when absent
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_free: bool,
    /// Derived on every write, never read from input
    #[serde(default, skip_deserializing)]
    pub search_terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antidotes: Option<Vec<Antidote>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<MedicationReference>>,
}

impl Medication {
    /// Create a medication with only the required fields set
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand_name: None,
            drug_class: None,
            indication: None,
            administration_recommendations: None,
            line_requirements: LineRequirements::default(),
            extravasation_risk: None,
            extravasation_management: None,
            mechanism_of_injury: None,
            dosage_considerations: None,
            preparation_guidelines: None,
            administration_guidelines: None,
            evidence_level: None,
            last_updated: None,
            is_free: false,
            search_terms: None,
            antidotes: None,
            references: None,
        }
    }

    pub fn with_brand_name(mut self, brand_name: impl Into<String>) -> Self {
        self.brand_name = Some(brand_name.into());
        self
    }

    pub fn with_drug_class(mut self, drug_class: impl Into<String>) -> Self {
        self.drug_class = Some(drug_class.into());
        self
    }

    pub fn with_indication(mut self, indication: impl Into<String>) -> Self {
        self.indication = Some(indication.into());
        self
    }

    pub fn with_risk(mut self, risk: ExtravasationRisk) -> Self {
        self.extravasation_risk = Some(risk.as_str().to_string());
        self
    }

    pub fn with_line_requirements(mut self, lines: LineRequirements) -> Self {
        self.line_requirements = lines;
        self
    }

    pub fn with_antidote(mut self, antidote: Antidote) -> Self {
        self.antidotes.get_or_insert_with(Vec::new).push(antidote);
        self
    }

    pub fn with_reference(mut self, reference: MedicationReference) -> Self {
        self.references.get_or_insert_with(Vec::new).push(reference);
        self
    }

    pub fn free(mut self) -> Self {
        self.is_free = true;
        self
    }

    /// Lower-cased search text from name, brand, class, indication and risk
    pub fn derive_search_terms(&self) -> String {
        [
            Some(self.name.as_str()),
            self.brand_name.as_deref(),
            self.drug_class.as_deref(),
            self.indication.as_deref(),
            self.extravasation_risk.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }

    pub fn risk(&self) -> Option<ExtravasationRisk> {
        self.extravasation_risk.as_deref()?.parse().ok()
    }

    pub fn evidence(&self) -> Option<EvidenceLevel> {
        self.evidence_level.as_deref()?.parse().ok()
    }

    /// Name of the "First Choice" antidote, if antidotes are loaded
    pub fn first_choice_antidote(&self) -> Option<&str> {
        self.antidotes
            .as_ref()?
            .iter()
            .find(|a| a.is_first_choice())
            .map(|a| a.name.as_str())
    }

    /// Free medications are open to everyone, the rest only to subscribers
    pub fn access(&self, subscribed: bool) -> Access {
        if self.is_free || subscribed {
            Access::Open
        } else {
            Access::Restricted
        }
    }

    /// Copy carrying only the header fields shown to non-subscribers
    pub fn redacted(&self) -> Medication {
        Medication {
            brand_name: self.brand_name.clone(),
            drug_class: self.drug_class.clone(),
            extravasation_risk: self.extravasation_risk.clone(),
            evidence_level: self.evidence_level.clone(),
            last_updated: self.last_updated.clone(),
            is_free: self.is_free,
            ..Medication::new(self.id.clone(), self.name.clone())
        }
    }
}

/// Accepts `true`/`false` as well as the integer form the table stores
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        None => false,
    })
}

/// Routes every input shape through the defaulting decoder, so a bad value
/// never rejects the record
fn deserialize_line_requirements<'de, D>(deserializer: D) -> std::result::Result<LineRequirements, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(text)) => decode_line_requirements(Some(&text)),
        Some(value) => line_requirements_from_value(&value),
        None => LineRequirements::default(),
    })
}
