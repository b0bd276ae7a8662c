use crate::types::ColumnType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unsupported column type: {type_name}")]
    UnsupportedColumnType { type_name: String },
    #[error("column {column} ({declared}), row {row}: {source}")]
    Coerce {
        column: String,
        declared: ColumnType,
        row: usize,
        #[source]
        source: CoerceError,
    },
    #[error("schema violation: {0}")]
    SchemaViolation(String),
    #[error("not enough structure to reshape: {0}")]
    ReshapeDegenerate(String),
}

/// Failure to coerce a single raw value into its declared column type.
#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("unexpected type, expected {expected} but got {actual} with a value of {value}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
        value: String,
    },
    #[error(transparent)]
    Time(#[from] chrono::ParseError),
    #[error(transparent)]
    Integer(#[from] std::num::ParseIntError),
    #[error(transparent)]
    Float(#[from] std::num::ParseFloatError),
    #[error("failed to serialize dynamic value: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// Whether the error belongs to a reshape step and may be downgraded to a
    /// frame notice instead of failing the response.
    pub fn is_reshape_failure(&self) -> bool {
        matches!(
            self,
            ConvertError::SchemaViolation(_) | ConvertError::ReshapeDegenerate(_)
        )
    }
}
