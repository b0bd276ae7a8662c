use chrono::{DateTime, Utc};
use logframe_core::error::ConvertError;
use logframe_core::frame::{Column, ColumnValues, Frame, FrameMeta, Labels};
use logframe_core::types::{ColumnType, TypedValue, ValueKind};
use std::collections::{HashMap, HashSet};

/// How (time, series) cells with no observed row are filled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FillMode {
    #[default]
    Null,
    /// Shorthand for `Value(0.0)`.
    Zero,
    /// Last observed value of the same series.
    Previous,
    Value(f64),
}

/// Which column is the time axis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimeAxis {
    /// The column declared as `DateTime`.
    #[default]
    ByType,
    /// A column with a reserved name, such as `Timestamp`.
    ByName(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReshapeOptions {
    pub fill: FillMode,
    pub time_axis: TimeAxis,
}

impl TimeAxis {
    fn matches(&self, frame: &Frame, idx: usize) -> bool {
        let column = &frame.columns[idx];
        match self {
            TimeAxis::ByType => match frame.column_type(idx) {
                Some(ty) => ty == ColumnType::DateTime,
                None => column.values.kind() == ValueKind::Time,
            },
            TimeAxis::ByName(name) => column.name == *name,
        }
    }
}

/// Locates the single time column of a frame.
pub fn find_time_column(frame: &Frame, axis: &TimeAxis) -> Result<usize, ConvertError> {
    let found: Vec<usize> = (0..frame.columns.len())
        .filter(|&idx| axis.matches(frame, idx))
        .collect();
    match found.as_slice() {
        [idx] => {
            if frame.columns[*idx].values.kind() != ValueKind::Time {
                return Err(ConvertError::SchemaViolation(format!(
                    "time column {} does not hold time values",
                    frame.columns[*idx].name
                )));
            }
            Ok(*idx)
        }
        [] => Err(ConvertError::SchemaViolation(
            "frame has no time column".into(),
        )),
        many => Err(ConvertError::SchemaViolation(format!(
            "frame must have exactly one time column, found {}",
            many.len()
        ))),
    }
}

/// Stable ascending sort of a frame's rows by its time column.
pub fn sort_by_time(frame: &Frame, time_idx: usize) -> Result<Frame, ConvertError> {
    let times = time_values(frame, time_idx)?;
    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_by_key(|&i| times[i]);
    Ok(frame.take_rows(&order))
}

fn time_values(frame: &Frame, time_idx: usize) -> Result<Vec<DateTime<Utc>>, ConvertError> {
    let column = &frame.columns[time_idx];
    let times = column.values.as_times().ok_or_else(|| {
        ConvertError::SchemaViolation(format!("column {} is not a time column", column.name))
    })?;
    times
        .iter()
        .enumerate()
        .map(|(row, t)| {
            t.ok_or_else(|| {
                ConvertError::SchemaViolation(format!(
                    "time column {} is null at row {row}",
                    column.name
                ))
            })
        })
        .collect()
}

fn is_label_column(frame: &Frame, idx: usize) -> bool {
    match frame.column_type(idx) {
        Some(ty) => ty.output_kind() == ValueKind::String,
        None => frame.columns[idx].values.kind() == ValueKind::String,
    }
}

fn row_labels(frame: &Frame, label_idxs: &[usize], row: usize) -> Labels {
    label_idxs
        .iter()
        .filter_map(|&idx| {
            let column = &frame.columns[idx];
            // Null labels are omitted, keeping them apart from empty strings.
            let value = column.values.as_strings()?[row].clone()?;
            Some((column.name.clone(), value))
        })
        .collect()
}

/// Pivots a long frame (one row per time and series) into a wide frame with
/// one shared time column and one value column per distinct label set.
///
/// String columns form the label set; numeric and bool columns carry values.
/// A frame with at most one non-time column is only sorted.
pub fn long_to_wide(frame: &Frame, options: &ReshapeOptions) -> Result<Frame, ConvertError> {
    let time_idx = find_time_column(frame, &options.time_axis)?;
    let sorted = sort_by_time(frame, time_idx)?;
    if sorted.columns.len() <= 2 {
        return Ok(sorted);
    }

    let mut label_idxs = Vec::new();
    let mut value_idxs = Vec::new();
    for idx in (0..sorted.columns.len()).filter(|&idx| idx != time_idx) {
        if sorted.columns[idx].values.kind() == ValueKind::Time {
            return Err(ConvertError::SchemaViolation(format!(
                "frame must have exactly one time column, {} is a second one",
                sorted.columns[idx].name
            )));
        }
        if is_label_column(&sorted, idx) {
            label_idxs.push(idx);
        } else {
            value_idxs.push(idx);
        }
    }
    if value_idxs.is_empty() {
        return Err(ConvertError::ReshapeDegenerate(
            "no numeric or bool value column".into(),
        ));
    }

    let times = time_values(&sorted, time_idx)?;
    if times.is_empty() {
        return Ok(sorted);
    }
    let mut axis: Vec<DateTime<Utc>> = Vec::new();
    let mut groups: Vec<Labels> = Vec::new();
    let mut group_index: HashMap<Labels, usize> = HashMap::new();
    let mut filled_in_row: HashSet<usize> = HashSet::new();
    // (output row, group, source row)
    let mut placements = Vec::with_capacity(times.len());

    for (row, time) in times.iter().enumerate() {
        let labels = row_labels(&sorted, &label_idxs, row);
        let group = match group_index.get(&labels) {
            Some(&g) => g,
            None => {
                groups.push(labels.clone());
                group_index.insert(labels, groups.len() - 1);
                groups.len() - 1
            }
        };
        // A repeated timestamp within one series opens a new output row
        // rather than overwriting the earlier observation.
        if axis.last() != Some(time) || filled_in_row.contains(&group) {
            axis.push(*time);
            filled_in_row.clear();
        }
        filled_in_row.insert(group);
        placements.push((axis.len() - 1, group, row));
    }

    let series_count = groups.len() * value_idxs.len();
    let mut series: Vec<ColumnValues> = Vec::with_capacity(series_count);
    let mut observed: Vec<Vec<bool>> = Vec::with_capacity(series_count);
    for _ in &groups {
        for &value_idx in &value_idxs {
            series.push(ColumnValues::nulls(
                sorted.columns[value_idx].values.kind(),
                axis.len(),
            ));
            observed.push(vec![false; axis.len()]);
        }
    }

    for (out_row, group, row) in placements {
        for (slot, &value_idx) in value_idxs.iter().enumerate() {
            let target = group * value_idxs.len() + slot;
            let value = sorted.columns[value_idx]
                .values
                .get(row)
                .ok_or_else(|| ConvertError::SchemaViolation(format!("row {row} out of range")))?;
            series[target].set(out_row, value)?;
            observed[target][out_row] = true;
        }
    }

    for (values, seen) in series.iter_mut().zip(&observed) {
        fill_missing(values, seen, options.fill)?;
    }

    let mut column_types = vec![ColumnType::DateTime];
    let mut out = Frame::new(sorted.name.clone());
    out.notices = sorted.notices.clone();
    out.push_column(Column::new(
        sorted.columns[time_idx].name.clone(),
        ColumnValues::Time(axis.into_iter().map(Some).collect()),
    ))?;
    let mut series_iter = series.into_iter();
    for labels in &groups {
        for &value_idx in &value_idxs {
            let values = series_iter.next().ok_or_else(|| {
                ConvertError::SchemaViolation("series count mismatch".into())
            })?;
            let source = &sorted.columns[value_idx];
            out.push_column(Column::new(source.name.clone(), values).with_labels(labels.clone()))?;
            column_types.push(sorted.column_type(value_idx).unwrap_or(match source.values.kind() {
                ValueKind::Int32 => ColumnType::Int32,
                ValueKind::Int64 => ColumnType::Int64,
                ValueKind::Bool => ColumnType::Bool,
                _ => ColumnType::Float,
            }));
        }
    }
    out.meta = Some(FrameMeta {
        executed_query: sorted.executed_query().map(str::to_string),
        column_types,
    });
    Ok(out)
}

fn fill_missing(values: &mut ColumnValues, observed: &[bool], mode: FillMode) -> Result<(), ConvertError> {
    let constant = match mode {
        FillMode::Null => return Ok(()),
        FillMode::Zero => Some(0.0),
        FillMode::Value(v) => Some(v),
        FillMode::Previous => None,
    };
    let kind = values.kind();
    let mut previous: Option<TypedValue> = None;
    for (idx, &seen) in observed.iter().enumerate() {
        if seen {
            previous = values.get(idx);
            continue;
        }
        let fill = match constant {
            Some(v) => Some(constant_value(kind, v)),
            None => previous.clone(),
        };
        if let Some(fill) = fill {
            values.set(idx, fill)?;
        }
    }
    Ok(())
}

fn constant_value(kind: ValueKind, v: f64) -> TypedValue {
    match kind {
        ValueKind::Int32 => TypedValue::Int32(Some(v as i32)),
        ValueKind::Int64 => TypedValue::Int64(Some(v as i64)),
        ValueKind::Float64 => TypedValue::Float64(Some(v)),
        ValueKind::Bool => TypedValue::Bool(Some(v != 0.0)),
        ValueKind::String => TypedValue::String(Some(v.to_string())),
        ValueKind::Time => TypedValue::Time(None),
    }
}
