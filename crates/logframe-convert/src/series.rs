use chrono::{DateTime, Utc};
use logframe_core::error::ConvertError;
use logframe_core::frame::{Column, ColumnValues, Frame, FrameMeta, Labels};
use logframe_core::types::ColumnType;

/// Reserved name of the time-array column in series responses.
pub const DEFAULT_TIME_COLUMN: &str = "timestamp";

/// Column roles of a frame whose rows each carry a whole series as arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesLayout {
    pub time: usize,
    pub labels: Vec<usize>,
    pub values: Vec<usize>,
}

impl SeriesLayout {
    /// Infers roles from declared types: string columns are labels, the
    /// dynamic column named `time_name` (case-insensitive) holds the time
    /// array, and every other dynamic column holds a value array.
    pub fn infer(frame: &Frame, time_name: &str) -> Result<Self, ConvertError> {
        let types = frame
            .meta
            .as_ref()
            .map(|meta| meta.column_types.as_slice())
            .ok_or_else(|| ConvertError::SchemaViolation("frame has no declared column types".into()))?;

        let mut times = Vec::new();
        let mut labels = Vec::new();
        let mut values = Vec::new();
        for (idx, (column, ty)) in frame.columns.iter().zip(types).enumerate() {
            if ty.is_label() {
                labels.push(idx);
            } else if *ty == ColumnType::Dynamic {
                if column.name.eq_ignore_ascii_case(time_name) {
                    times.push(idx);
                } else {
                    values.push(idx);
                }
            }
        }

        let time = match times.as_slice() {
            [idx] => *idx,
            [] => {
                return Err(ConvertError::SchemaViolation(format!(
                    "response must have a column named '{time_name}'"
                )))
            }
            many => {
                return Err(ConvertError::SchemaViolation(format!(
                    "must be exactly one column named '{time_name}', found {}",
                    many.len()
                )))
            }
        };
        if values.is_empty() {
            return Err(ConvertError::SchemaViolation(
                "did not find a value column, expected at least one dynamic column".into(),
            ));
        }
        Ok(Self {
            time,
            labels,
            values,
        })
    }
}

fn string_cells(frame: &Frame, idx: usize) -> Result<(&str, &[Option<String>]), ConvertError> {
    let column = frame.columns.get(idx).ok_or_else(|| {
        ConvertError::SchemaViolation(format!("column index {idx} out of range"))
    })?;
    let cells = column.values.as_strings().ok_or_else(|| {
        ConvertError::SchemaViolation(format!(
            "column {} must hold strings, found {}",
            column.name,
            column.values.kind()
        ))
    })?;
    Ok((column.name.as_str(), cells))
}

fn parse_time_array(text: &str) -> Result<Vec<DateTime<Utc>>, ConvertError> {
    let raw: Vec<String> = serde_json::from_str(text)
        .map_err(|e| ConvertError::SchemaViolation(format!("time array is not a JSON string array: {e}")))?;
    raw.iter()
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| ConvertError::SchemaViolation(format!("invalid time {s:?} in time array: {e}")))
        })
        .collect()
}

fn parse_value_array(
    text: Option<&str>,
    expected_len: usize,
    column: &str,
    row: usize,
) -> Result<Vec<Option<f64>>, ConvertError> {
    let parsed: Option<Vec<Option<f64>>> = match text {
        Some(text) => serde_json::from_str(text).map_err(|e| {
            ConvertError::SchemaViolation(format!(
                "column {column}, row {row}: value is not a numeric array: {e}"
            ))
        })?,
        None => None,
    };
    match parsed {
        // An all-null series arrives as null or as an empty array.
        None => Ok(vec![None; expected_len]),
        Some(values) if values.is_empty() => Ok(vec![None; expected_len]),
        Some(values) if values.len() != expected_len => Err(ConvertError::SchemaViolation(format!(
            "column {column}, row {row}: {} values for {expected_len} timestamps",
            values.len()
        ))),
        Some(values) => Ok(values),
    }
}

/// Expands rows that each carry a whole series into a wide frame: one shared
/// time column, read from the first row, and one labelled float column per
/// (row, value column).
pub fn expand_series(frame: &Frame, layout: &SeriesLayout) -> Result<Frame, ConvertError> {
    let (time_name, time_cells) = string_cells(frame, layout.time)?;
    let label_cells = layout
        .labels
        .iter()
        .map(|&idx| string_cells(frame, idx))
        .collect::<Result<Vec<_>, ConvertError>>()?;
    let value_cells = layout
        .values
        .iter()
        .map(|&idx| string_cells(frame, idx))
        .collect::<Result<Vec<_>, ConvertError>>()?;

    if frame.row_count() == 0 {
        return Ok(frame.clone());
    }

    let time_text = time_cells[0].as_deref().ok_or_else(|| {
        ConvertError::SchemaViolation("time array of the first row is null".into())
    })?;
    let times = parse_time_array(time_text)?;

    let mut out = Frame::new(frame.name.clone());
    out.notices = frame.notices.clone();
    out.push_column(Column::new(
        time_name,
        ColumnValues::Time(times.iter().copied().map(Some).collect()),
    ))?;
    let mut column_types = vec![ColumnType::DateTime];

    for row in 0..frame.row_count() {
        // A null label is left out so it never matches an empty string.
        let labels: Labels = label_cells
            .iter()
            .filter_map(|(name, cells)| cells[row].as_deref().map(|value| (*name, value)))
            .collect();
        for (name, cells) in &value_cells {
            let values = parse_value_array(cells[row].as_deref(), times.len(), name, row)?;
            out.push_column(
                Column::new(*name, ColumnValues::Float64(values)).with_labels(labels.clone()),
            )?;
            column_types.push(ColumnType::Float);
        }
    }

    out.meta = Some(FrameMeta {
        executed_query: frame.executed_query().map(str::to_string),
        column_types,
    });
    Ok(out)
}
