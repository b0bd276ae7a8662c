use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use std::collections::HashMap;
use std::str::FromStr;

/// One decoded cell as it arrived on the wire, before any column type is
/// applied. Numbers keep their original decimal text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "JsonValue")]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(String),
    String(String),
    Array(Vec<RawValue>),
    Object(Vec<(String, RawValue)>),
}

impl RawValue {
    pub fn number(text: impl Into<String>) -> Self {
        RawValue::Number(text.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        RawValue::String(text.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Runtime type description used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::Array(_) => "array",
            RawValue::Object(_) => "object",
        }
    }

    pub fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        Ok(match self {
            RawValue::Null => JsonValue::Null,
            RawValue::Bool(b) => JsonValue::Bool(*b),
            RawValue::Number(text) => JsonValue::Number(JsonNumber::from_str(text)?),
            RawValue::String(s) => JsonValue::String(s.clone()),
            RawValue::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(RawValue::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            RawValue::Object(entries) => {
                let mut map = JsonMap::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json()?);
                }
                JsonValue::Object(map)
            }
        })
    }
}

impl From<JsonValue> for RawValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => RawValue::Null,
            JsonValue::Bool(b) => RawValue::Bool(b),
            JsonValue::Number(n) => RawValue::Number(n.to_string()),
            JsonValue::String(s) => RawValue::String(s),
            JsonValue::Array(items) => {
                RawValue::Array(items.into_iter().map(RawValue::from).collect())
            }
            JsonValue::Object(map) => RawValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, RawValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Null => write!(f, "null"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Number(text) => write!(f, "{text}"),
            RawValue::String(s) => write!(f, "{s:?}"),
            other => match other.to_json() {
                Ok(json) => write!(f, "{json}"),
                Err(_) => write!(f, "<{}>", other.type_name()),
            },
        }
    }
}

/// A result row, either positional (array-of-arrays responses) or keyed by
/// column name (array-of-objects responses).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "JsonValue")]
pub enum RawRow {
    Positional(Vec<RawValue>),
    Named(HashMap<String, RawValue>),
}

impl RawRow {
    /// Cell for the column at `index` named `name`; absent cells read as null.
    pub fn cell(&self, index: usize, name: &str) -> &RawValue {
        const NULL: &RawValue = &RawValue::Null;
        match self {
            RawRow::Positional(values) => values.get(index).unwrap_or(NULL),
            RawRow::Named(values) => values.get(name).unwrap_or(NULL),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawRow::Positional(values) => values.len(),
            RawRow::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<JsonValue> for RawRow {
    type Error = String;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Array(items) => Ok(RawRow::Positional(
                items.into_iter().map(RawValue::from).collect(),
            )),
            JsonValue::Object(map) => Ok(RawRow::Named(
                map.into_iter()
                    .map(|(key, value)| (key, RawValue::from(value)))
                    .collect(),
            )),
            other => Err(format!(
                "row must be an array or an object, got {}",
                RawValue::from(other).type_name()
            )),
        }
    }
}

impl Serialize for RawValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::{RawRow, RawValue};

    #[test]
    fn numbers_keep_wire_text() {
        let row: RawRow = serde_json::from_str(r#"[12345678901234567890, 1.50, null]"#).expect("row");
        assert_eq!(row.cell(0, "a"), &RawValue::number("12345678901234567890"));
        assert_eq!(row.cell(1, "b"), &RawValue::number("1.50"));
        assert!(row.cell(2, "c").is_null());
        assert!(row.cell(7, "missing").is_null());
    }

    #[test]
    fn named_rows_lookup_by_column() {
        let row: RawRow = serde_json::from_str(r#"{"Region": "us", "Count": 3}"#).expect("row");
        assert_eq!(row.cell(5, "Region"), &RawValue::string("us"));
        assert_eq!(row.cell(0, "Count"), &RawValue::number("3"));
        assert!(row.cell(0, "Other").is_null());
    }

    #[test]
    fn scalar_row_is_rejected() {
        assert!(serde_json::from_str::<RawRow>("42").is_err());
    }
}
