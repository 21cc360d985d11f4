//! Characteristic value classification.
//!
//! Characteristic values arrive as either a bare numeric literal or a string
//! (`12.5` vs `"12.5"`) and are persisted text-encoded next to the value type
//! resolved at write time. The classification rule is fixed:
//!
//! - a numeric literal classifies as [`ValueType::Number`]
//! - everything else, including a string that merely looks numeric,
//!   classifies as [`ValueType::Text`]

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ValueType
// ---------------------------------------------------------------------------

/// How a stored characteristic value is interpreted.
///
/// Matches the `value_type` column values (`"number"` / `"text"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Text,
}

impl ValueType {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::Text => "text",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored `value_type` string that is neither `number` nor `text`.
#[derive(Debug, thiserror::Error)]
#[error("Unknown value type: {0}")]
pub struct ParseValueTypeError(pub String);

impl std::str::FromStr for ValueType {
    type Err = ParseValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(ValueType::Number),
            "text" => Ok(ValueType::Text),
            other => Err(ParseValueTypeError(other.to_string())),
        }
    }
}

impl TryFrom<String> for ValueType {
    type Error = ParseValueTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// CharacteristicValue
// ---------------------------------------------------------------------------

/// A characteristic value literal as supplied by callers.
///
/// Deserializes untagged: a JSON number becomes `Number`, a JSON string
/// becomes `Text`. Quoting a number therefore pins it to `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Number(f64),
    Text(String),
}

impl CharacteristicValue {
    /// Apply the classification rule to this literal.
    pub fn value_type(&self) -> ValueType {
        match self {
            CharacteristicValue::Number(_) => ValueType::Number,
            CharacteristicValue::Text(_) => ValueType::Text,
        }
    }

    /// Text encoding used for storage.
    ///
    /// Numbers use the shortest `f64` display form (`12`, not `12.0`).
    pub fn to_text(&self) -> String {
        match self {
            CharacteristicValue::Number(n) => n.to_string(),
            CharacteristicValue::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for CharacteristicValue {
    fn from(n: f64) -> Self {
        CharacteristicValue::Number(n)
    }
}

impl From<&str> for CharacteristicValue {
    fn from(s: &str) -> Self {
        CharacteristicValue::Text(s.to_string())
    }
}

impl From<String> for CharacteristicValue {
    fn from(s: String) -> Self {
        CharacteristicValue::Text(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
