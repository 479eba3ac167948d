//! Line requirements codec
//!
//! The `line_requirements` column holds a JSON object with three flags:
//! `central`, `peripheral` and `midline`. Decoding never fails: missing,
//! malformed or non-object input yields the all-false default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which venous access lines a medication may be given through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRequirements {
    #[serde(default)]
    pub central: bool,
    #[serde(default)]
    pub peripheral: bool,
    #[serde(default)]
    pub midline: bool,
}

impl LineRequirements {
    pub fn new(central: bool, peripheral: bool, midline: bool) -> Self {
        Self { central, peripheral, midline }
    }

    /// Encode for the `line_requirements` column
    pub fn encode(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Labels of the lines that are permitted, in display order
    pub fn permitted(&self) -> Vec<&'static str> {
        let mut lines = Vec::new();
        if self.central {
            lines.push("central");
        }
        if self.peripheral {
            lines.push("peripheral");
        }
        if self.midline {
            lines.push("midline");
        }
        lines
    }
}

/// Decode a persisted `line_requirements` value.
///
/// Flags use JSON truthiness, so `1` and `"yes"` count as set while `0`,
/// `""` and `null` do not. Unknown keys are ignored.
pub fn decode_line_requirements(text: Option<&str>) -> LineRequirements {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return LineRequirements::default();
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) => {
            tracing::warn!("line requirements is JSON null, using default");
            LineRequirements::default()
        }
        Ok(value) => line_requirements_from_value(&value),
        Err(e) => {
            tracing::warn!("Failed to parse line requirements {:?}: {}", text, e);
            LineRequirements::default()
        }
    }
}

/// Flags from an already-parsed JSON value. Only objects carry flags;
/// scalars and arrays give the default.
pub fn line_requirements_from_value(value: &Value) -> LineRequirements {
    match value {
        Value::Object(map) => LineRequirements {
            central: map.get("central").is_some_and(truthy),
            peripheral: map.get("peripheral").is_some_and(truthy),
            midline: map.get("midline").is_some_and(truthy),
        },
        _ => LineRequirements::default(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
