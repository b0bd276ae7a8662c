use crate::coerce::{coercer_for, Coercer};
use logframe_core::error::ConvertError;
use logframe_core::frame::{Column, ColumnValues, Frame, FrameMeta};
use logframe_core::types::{ColumnDescriptor, ColumnType};
use logframe_core::value::RawRow;
use tracing::debug;

struct ColumnPlan<'a> {
    name: &'a str,
    declared: ColumnType,
    coercer: Coercer,
}

/// Builds a typed frame from a column schema and its rows.
///
/// Every coercer is resolved before the first row is read, so an unknown
/// declared type fails without producing a partial frame. Columns are
/// allocated at the full row count and filled row by row; the first cell
/// that cannot be coerced aborts the build.
pub fn build_frame(columns: &[ColumnDescriptor], rows: &[RawRow]) -> Result<Frame, ConvertError> {
    let plans = columns
        .iter()
        .map(|desc| {
            let declared = desc.column_type()?;
            Ok(ColumnPlan {
                name: &desc.name,
                declared,
                coercer: coercer_for(declared),
            })
        })
        .collect::<Result<Vec<_>, ConvertError>>()?;

    let mut values: Vec<ColumnValues> = plans
        .iter()
        .map(|plan| ColumnValues::nulls(plan.declared.output_kind(), rows.len()))
        .collect();

    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, plan) in plans.iter().enumerate() {
            let raw = row.cell(col_idx, plan.name);
            let value = (plan.coercer)(raw).map_err(|source| ConvertError::Coerce {
                column: plan.name.to_string(),
                declared: plan.declared,
                row: row_idx,
                source,
            })?;
            values[col_idx].set(row_idx, value)?;
        }
    }

    let meta = FrameMeta {
        executed_query: None,
        column_types: plans.iter().map(|plan| plan.declared).collect(),
    };
    let mut frame = Frame::new("").with_meta(meta);
    for (plan, values) in plans.iter().zip(values) {
        frame.push_column(Column::new(plan.name, values))?;
    }
    debug!(
        columns = frame.columns.len(),
        rows = frame.row_count(),
        "built frame"
    );
    Ok(frame)
}
