use crate::error::ConvertError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared column type as reported in a query response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    String,
    Guid,
    TimeSpan,
    Dynamic,
    DateTime,
    Int32,
    Int64,
    Float,
    Bool,
    Decimal,
}

/// Storage kind of a built column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Time,
    Int32,
    Int64,
    Float64,
    Bool,
}

impl ColumnType {
    pub const ALL: [ColumnType; 10] = [
        ColumnType::String,
        ColumnType::Guid,
        ColumnType::TimeSpan,
        ColumnType::Dynamic,
        ColumnType::DateTime,
        ColumnType::Int32,
        ColumnType::Int64,
        ColumnType::Float,
        ColumnType::Bool,
        ColumnType::Decimal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "String",
            ColumnType::Guid => "Guid",
            ColumnType::TimeSpan => "TimeSpan",
            ColumnType::Dynamic => "Dynamic",
            ColumnType::DateTime => "DateTime",
            ColumnType::Int32 => "Int32",
            ColumnType::Int64 => "Int64",
            ColumnType::Float => "Float",
            ColumnType::Bool => "Bool",
            ColumnType::Decimal => "Decimal",
        }
    }

    pub fn output_kind(&self) -> ValueKind {
        match self {
            ColumnType::String | ColumnType::Guid | ColumnType::TimeSpan | ColumnType::Dynamic => {
                ValueKind::String
            }
            ColumnType::DateTime => ValueKind::Time,
            ColumnType::Int32 => ValueKind::Int32,
            ColumnType::Int64 => ValueKind::Int64,
            ColumnType::Float | ColumnType::Decimal => ValueKind::Float64,
            ColumnType::Bool => ValueKind::Bool,
        }
    }

    /// Plain string columns group rows into series when reshaping.
    pub fn is_label(&self) -> bool {
        matches!(
            self,
            ColumnType::String | ColumnType::Guid | ColumnType::TimeSpan
        )
    }
}

impl FromStr for ColumnType {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.to_ascii_lowercase().as_str() {
            "string" => ColumnType::String,
            "guid" => ColumnType::Guid,
            "timespan" => ColumnType::TimeSpan,
            "dynamic" => ColumnType::Dynamic,
            "datetime" => ColumnType::DateTime,
            "int32" | "uint32" | "int" => ColumnType::Int32,
            "int64" | "uint64" | "long" => ColumnType::Int64,
            "float" | "float32" | "float64" | "real" | "double" => ColumnType::Float,
            "bool" | "boolean" => ColumnType::Bool,
            "decimal" => ColumnType::Decimal,
            _ => {
                return Err(ConvertError::UnsupportedColumnType {
                    type_name: s.to_string(),
                })
            }
        };
        Ok(ty)
    }
}

impl TryFrom<String> for ColumnType {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Time => "time",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
            ValueKind::Float64 => "float64",
            ValueKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Column name and declared type as received with a query response. The type
/// is kept as the raw wire string so an unknown type only fails when a frame
/// is built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "Type")]
    pub declared_type: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }

    pub fn column_type(&self) -> Result<ColumnType, ConvertError> {
        self.declared_type.parse()
    }
}

/// A single coerced cell. Every variant carries its own typed null.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(Option<String>),
    Time(Option<DateTime<Utc>>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Bool(Option<bool>),
}

impl TypedValue {
    pub fn null(kind: ValueKind) -> Self {
        match kind {
            ValueKind::String => TypedValue::String(None),
            ValueKind::Time => TypedValue::Time(None),
            ValueKind::Int32 => TypedValue::Int32(None),
            ValueKind::Int64 => TypedValue::Int64(None),
            ValueKind::Float64 => TypedValue::Float64(None),
            ValueKind::Bool => TypedValue::Bool(None),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            TypedValue::String(_) => ValueKind::String,
            TypedValue::Time(_) => ValueKind::Time,
            TypedValue::Int32(_) => ValueKind::Int32,
            TypedValue::Int64(_) => ValueKind::Int64,
            TypedValue::Float64(_) => ValueKind::Float64,
            TypedValue::Bool(_) => ValueKind::Bool,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            TypedValue::String(v) => v.is_none(),
            TypedValue::Time(v) => v.is_none(),
            TypedValue::Int32(v) => v.is_none(),
            TypedValue::Int64(v) => v.is_none(),
            TypedValue::Float64(v) => v.is_none(),
            TypedValue::Bool(v) => v.is_none(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(Some(v)) => f.write_str(v),
            TypedValue::Time(Some(v)) => write!(f, "{}", v.to_rfc3339()),
            TypedValue::Int32(Some(v)) => write!(f, "{v}"),
            TypedValue::Int64(Some(v)) => write!(f, "{v}"),
            TypedValue::Float64(Some(v)) => write!(f, "{v}"),
            TypedValue::Bool(Some(v)) => write!(f, "{v}"),
            _ => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnDescriptor, ColumnType, ValueKind};
    use crate::error::ConvertError;

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!("DateTime".parse::<ColumnType>().unwrap(), ColumnType::DateTime);
        assert_eq!("datetime".parse::<ColumnType>().unwrap(), ColumnType::DateTime);
        assert_eq!("UInt64".parse::<ColumnType>().unwrap(), ColumnType::Int64);
        assert_eq!("real".parse::<ColumnType>().unwrap(), ColumnType::Float);
        assert_eq!("Boolean".parse::<ColumnType>().unwrap(), ColumnType::Bool);
        for ty in ColumnType::ALL {
            assert_eq!(ty.as_str().parse::<ColumnType>().unwrap(), ty);
        }
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let err = ColumnDescriptor::new("x", "Blob").column_type().unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedColumnType { ref type_name } if type_name == "Blob"));
    }

    #[test]
    fn dynamic_and_decimal_storage() {
        assert_eq!(ColumnType::Dynamic.output_kind(), ValueKind::String);
        assert_eq!(ColumnType::Decimal.output_kind(), ValueKind::Float64);
        assert!(!ColumnType::Dynamic.is_label());
        assert!(ColumnType::Guid.is_label());
    }

    #[test]
    fn descriptor_uses_wire_keys() {
        let desc: ColumnDescriptor =
            serde_json::from_str(r#"{"Name": "Timestamp", "Type": "DateTime"}"#).expect("desc");
        assert_eq!(desc, ColumnDescriptor::new("Timestamp", "DateTime"));
    }
}
