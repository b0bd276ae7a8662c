use crate::error::ConvertError;
use crate::types::{ColumnType, TypedValue, ValueKind};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Homogeneously typed, nullable column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    String(Vec<Option<String>>),
    Time(Vec<Option<DateTime<Utc>>>),
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
}

impl ColumnValues {
    /// All-null storage of exactly `len` cells.
    pub fn nulls(kind: ValueKind, len: usize) -> Self {
        match kind {
            ValueKind::String => ColumnValues::String(vec![None; len]),
            ValueKind::Time => ColumnValues::Time(vec![None; len]),
            ValueKind::Int32 => ColumnValues::Int32(vec![None; len]),
            ValueKind::Int64 => ColumnValues::Int64(vec![None; len]),
            ValueKind::Float64 => ColumnValues::Float64(vec![None; len]),
            ValueKind::Bool => ColumnValues::Bool(vec![None; len]),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ColumnValues::String(_) => ValueKind::String,
            ColumnValues::Time(_) => ValueKind::Time,
            ColumnValues::Int32(_) => ValueKind::Int32,
            ColumnValues::Int64(_) => ValueKind::Int64,
            ColumnValues::Float64(_) => ValueKind::Float64,
            ColumnValues::Bool(_) => ValueKind::Bool,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::String(v) => v.len(),
            ColumnValues::Time(v) => v.len(),
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::Float64(v) => v.len(),
            ColumnValues::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<TypedValue> {
        if idx >= self.len() {
            return None;
        }
        Some(match self {
            ColumnValues::String(v) => TypedValue::String(v[idx].clone()),
            ColumnValues::Time(v) => TypedValue::Time(v[idx]),
            ColumnValues::Int32(v) => TypedValue::Int32(v[idx]),
            ColumnValues::Int64(v) => TypedValue::Int64(v[idx]),
            ColumnValues::Float64(v) => TypedValue::Float64(v[idx]),
            ColumnValues::Bool(v) => TypedValue::Bool(v[idx]),
        })
    }

    pub fn is_null_at(&self, idx: usize) -> bool {
        self.get(idx).map(|v| v.is_null()).unwrap_or(true)
    }

    /// Overwrites one cell. The value must match the storage kind.
    pub fn set(&mut self, idx: usize, value: TypedValue) -> Result<(), ConvertError> {
        let len = self.len();
        if idx >= len {
            return Err(ConvertError::SchemaViolation(format!(
                "cell index {idx} out of bounds for column of length {len}"
            )));
        }
        match (self, value) {
            (ColumnValues::String(v), TypedValue::String(x)) => v[idx] = x,
            (ColumnValues::Time(v), TypedValue::Time(x)) => v[idx] = x,
            (ColumnValues::Int32(v), TypedValue::Int32(x)) => v[idx] = x,
            (ColumnValues::Int64(v), TypedValue::Int64(x)) => v[idx] = x,
            (ColumnValues::Float64(v), TypedValue::Float64(x)) => v[idx] = x,
            (ColumnValues::Bool(v), TypedValue::Bool(x)) => v[idx] = x,
            (column, value) => {
                return Err(ConvertError::SchemaViolation(format!(
                    "cannot store {} value in {} column",
                    value.kind(),
                    column.kind()
                )))
            }
        }
        Ok(())
    }

    /// New storage holding the cells at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Self {
        fn pick<T: Clone>(values: &[Option<T>], indices: &[usize]) -> Vec<Option<T>> {
            indices
                .iter()
                .map(|&i| values.get(i).cloned().flatten())
                .collect()
        }
        match self {
            ColumnValues::String(v) => ColumnValues::String(pick(v, indices)),
            ColumnValues::Time(v) => ColumnValues::Time(pick(v, indices)),
            ColumnValues::Int32(v) => ColumnValues::Int32(pick(v, indices)),
            ColumnValues::Int64(v) => ColumnValues::Int64(pick(v, indices)),
            ColumnValues::Float64(v) => ColumnValues::Float64(pick(v, indices)),
            ColumnValues::Bool(v) => ColumnValues::Bool(pick(v, indices)),
        }
    }

    pub fn as_times(&self) -> Option<&[Option<DateTime<Utc>>]> {
        match self {
            ColumnValues::Time(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[Option<String>]> {
        match self {
            ColumnValues::String(v) => Some(v),
            _ => None,
        }
    }
}

/// Ordered name/value pairs identifying one series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Labels(BTreeMap<String, String>);

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{name}={value:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub labels: Labels,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            labels: Labels::new(),
            values,
        }
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn display_name(&self) -> String {
        if self.labels.is_empty() {
            self.name.clone()
        } else {
            format!("{} {{{}}}", self.name, self.labels)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameMeta {
    pub executed_query: Option<String>,
    /// Declared type of each column, index-aligned with `Frame::columns`.
    pub column_types: Vec<ColumnType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub text: String,
}

impl Notice {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Warning,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            NoticeSeverity::Info => "info",
            NoticeSeverity::Warning => "warning",
            NoticeSeverity::Error => "error",
        };
        write!(f, "[{level}] {}", self.text)
    }
}

/// In-memory columnar table. All columns have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub name: String,
    pub columns: Vec<Column>,
    pub meta: Option<FrameMeta>,
    pub notices: Vec<Notice>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_meta(mut self, meta: FrameMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn push_column(&mut self, column: Column) -> Result<(), ConvertError> {
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(ConvertError::SchemaViolation(format!(
                "column {} has {} rows, frame has {}",
                column.name,
                column.len(),
                self.row_count()
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Declared type of the column at `idx`, if the frame was built from a schema.
    pub fn column_type(&self, idx: usize) -> Option<ColumnType> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.column_types.get(idx).copied())
    }

    pub fn set_executed_query(&mut self, query: impl Into<String>) {
        self.meta.get_or_insert_with(FrameMeta::default).executed_query = Some(query.into());
    }

    pub fn executed_query(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.executed_query.as_deref())
    }

    /// Same frame with its rows reordered to `order`.
    pub fn take_rows(&self, order: &[usize]) -> Frame {
        Frame {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    labels: c.labels.clone(),
                    values: c.values.take(order),
                })
                .collect(),
            meta: self.meta.clone(),
            notices: self.notices.clone(),
        }
    }

    pub fn append_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, ColumnValues, Frame, Labels};
    use crate::types::{TypedValue, ValueKind};

    #[test]
    fn push_column_enforces_equal_length() {
        let mut frame = Frame::new("t");
        frame
            .push_column(Column::new("a", ColumnValues::nulls(ValueKind::Int32, 2)))
            .expect("first");
        let err = frame
            .push_column(Column::new("b", ColumnValues::nulls(ValueKind::Bool, 3)))
            .unwrap_err();
        assert!(err.is_reshape_failure());
        assert_eq!(frame.row_count(), 2);
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let mut values = ColumnValues::nulls(ValueKind::Int64, 1);
        values.set(0, TypedValue::Int64(Some(7))).expect("set");
        assert!(values.set(0, TypedValue::Bool(Some(true))).is_err());
        assert!(values.set(1, TypedValue::Int64(Some(1))).is_err());
        assert_eq!(values.get(0), Some(TypedValue::Int64(Some(7))));
    }

    #[test]
    fn take_rows_reorders_every_column() {
        let mut frame = Frame::new("t");
        frame
            .push_column(Column::new("n", ColumnValues::Int32(vec![Some(1), None, Some(3)])))
            .expect("push");
        let reordered = frame.take_rows(&[2, 0, 1]);
        assert_eq!(
            reordered.columns[0].values,
            ColumnValues::Int32(vec![Some(3), Some(1), None])
        );
    }

    #[test]
    fn display_name_includes_labels() {
        let labels: Labels = [("region", "us"), ("host", "a")].into_iter().collect();
        let column = Column::new("Value", ColumnValues::nulls(ValueKind::Float64, 0)).with_labels(labels);
        assert_eq!(column.display_name(), r#"Value {host="a", region="us"}"#);
    }
}
