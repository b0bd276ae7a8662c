use chrono::{DateTime, Utc};
use logframe_core::error::CoerceError;
use logframe_core::types::{ColumnType, TypedValue};
use logframe_core::value::RawValue;

/// Converts one raw cell into the typed value of a single declared type.
pub type Coercer = fn(&RawValue) -> Result<TypedValue, CoerceError>;

/// Resolves the coercer for a declared column type.
pub fn coercer_for(ty: ColumnType) -> Coercer {
    match ty {
        ColumnType::String | ColumnType::Guid | ColumnType::TimeSpan => coerce_string,
        ColumnType::Dynamic => coerce_dynamic,
        ColumnType::DateTime => coerce_time,
        ColumnType::Int32 => coerce_int32,
        ColumnType::Int64 => coerce_int64,
        ColumnType::Float => coerce_float,
        ColumnType::Decimal => coerce_decimal,
        ColumnType::Bool => coerce_bool,
    }
}

pub fn coerce(raw: &RawValue, ty: ColumnType) -> Result<TypedValue, CoerceError> {
    coercer_for(ty)(raw)
}

fn mismatch(expected: &'static str, raw: &RawValue) -> CoerceError {
    CoerceError::TypeMismatch {
        expected,
        actual: raw.type_name(),
        value: raw.to_string(),
    }
}

fn special_float(token: &str) -> Option<f64> {
    match token {
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None,
    }
}

fn coerce_string(raw: &RawValue) -> Result<TypedValue, CoerceError> {
    match raw {
        RawValue::Null => Ok(TypedValue::String(None)),
        RawValue::String(s) => Ok(TypedValue::String(Some(s.clone()))),
        other => Err(mismatch("string", other)),
    }
}

fn coerce_dynamic(raw: &RawValue) -> Result<TypedValue, CoerceError> {
    if raw.is_null() {
        return Ok(TypedValue::String(None));
    }
    let json = serde_json::to_string(&raw.to_json()?)?;
    Ok(TypedValue::String(Some(json)))
}

fn coerce_time(raw: &RawValue) -> Result<TypedValue, CoerceError> {
    match raw {
        RawValue::Null => Ok(TypedValue::Time(None)),
        RawValue::String(s) => {
            let parsed = DateTime::parse_from_rfc3339(s)?;
            Ok(TypedValue::Time(Some(parsed.with_timezone(&Utc))))
        }
        other => Err(mismatch("string", other)),
    }
}

fn coerce_int32(raw: &RawValue) -> Result<TypedValue, CoerceError> {
    match raw {
        RawValue::Null => Ok(TypedValue::Int32(None)),
        RawValue::Number(text) => Ok(TypedValue::Int32(Some(text.parse::<i32>()?))),
        other => Err(mismatch("number", other)),
    }
}

fn coerce_int64(raw: &RawValue) -> Result<TypedValue, CoerceError> {
    match raw {
        RawValue::Null => Ok(TypedValue::Int64(None)),
        RawValue::Number(text) => Ok(TypedValue::Int64(Some(text.parse::<i64>()?))),
        other => Err(mismatch("number", other)),
    }
}

fn coerce_float(raw: &RawValue) -> Result<TypedValue, CoerceError> {
    match raw {
        RawValue::Null => Ok(TypedValue::Float64(None)),
        RawValue::Number(text) => Ok(TypedValue::Float64(Some(text.parse::<f64>()?))),
        RawValue::String(s) => match special_float(s) {
            Some(f) => Ok(TypedValue::Float64(Some(f))),
            None => Err(mismatch("number", raw)),
        },
        other => Err(mismatch("number", other)),
    }
}

// Decimals arrive either as numbers or as quoted decimal text.
fn coerce_decimal(raw: &RawValue) -> Result<TypedValue, CoerceError> {
    match raw {
        RawValue::Null => Ok(TypedValue::Float64(None)),
        RawValue::Number(text) => Ok(TypedValue::Float64(Some(text.parse::<f64>()?))),
        RawValue::String(s) => {
            let value = match special_float(s) {
                Some(f) => f,
                None => parse_decimal_text(s)?,
            };
            Ok(TypedValue::Float64(Some(value)))
        }
        other => Err(mismatch("number or string", other)),
    }
}

// `f64::from_str` also accepts "inf" and "nan" spellings; only the three
// wire tokens are honoured.
fn parse_decimal_text(s: &str) -> Result<f64, CoerceError> {
    let trimmed = s.trim_start_matches(['+', '-']);
    if trimmed.chars().next().map_or(false, |c| c.is_ascii_alphabetic()) {
        return Err(mismatch("number or string", &RawValue::String(s.to_string())));
    }
    Ok(s.parse::<f64>()?)
}

fn coerce_bool(raw: &RawValue) -> Result<TypedValue, CoerceError> {
    match raw {
        RawValue::Null => Ok(TypedValue::Bool(None)),
        RawValue::Bool(b) => Ok(TypedValue::Bool(Some(*b))),
        other => Err(mismatch("bool", other)),
    }
}
