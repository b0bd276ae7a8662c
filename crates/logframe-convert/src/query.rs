use crate::reshape::{long_to_wide, ReshapeOptions, TimeAxis};
use crate::response::TableResponse;
use crate::series::{expand_series, SeriesLayout, DEFAULT_TIME_COLUMN};
use logframe_core::error::ConvertError;
use logframe_core::frame::{Frame, Notice};
use metrics::counter;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub const NOT_TIME_SERIES_NOTICE: &str =
    "Returned frame is not a time series, returning table format instead.";

/// Shape requested for a query's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    #[default]
    Table,
    /// Long rows pivoted into one column per label set.
    TimeSeries,
    /// Rows carrying whole series as arrays.
    Series,
}

impl FromStr for ResultFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "table" => Ok(ResultFormat::Table),
            "time_series" => Ok(ResultFormat::TimeSeries),
            "series" => Ok(ResultFormat::Series),
            other => Err(format!("unsupported query type: '{other}'")),
        }
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultFormat::Table => "table",
            ResultFormat::TimeSeries => "time_series",
            ResultFormat::Series => "series",
        };
        f.write_str(name)
    }
}

/// Converts a query response into frames of the requested format.
///
/// Build failures are returned to the caller. A reshape failure is not: the
/// long frame is returned instead, carrying a warning notice.
pub fn process_response(
    response: &TableResponse,
    executed_query: &str,
    format: ResultFormat,
    options: &ReshapeOptions,
) -> Result<Vec<Frame>, ConvertError> {
    let frame = match response.to_frame(executed_query) {
        Ok(frame) => {
            counter!("frames_built_total").increment(1);
            frame
        }
        Err(err) => {
            counter!("frame_build_error_total").increment(1);
            debug!(error = %err, "error converting response to data frames");
            return Err(err);
        }
    };

    let frame = match format {
        ResultFormat::Table => frame,
        ResultFormat::TimeSeries => reshape_or_fallback(frame, |f| long_to_wide(f, options)),
        ResultFormat::Series => {
            let time_name = match &options.time_axis {
                TimeAxis::ByName(name) => name.as_str(),
                TimeAxis::ByType => DEFAULT_TIME_COLUMN,
            };
            reshape_or_fallback(frame, |f| {
                let layout = SeriesLayout::infer(f, time_name)?;
                expand_series(f, &layout)
            })
        }
    };
    Ok(vec![frame])
}

fn reshape_or_fallback<F>(mut frame: Frame, reshape: F) -> Frame
where
    F: FnOnce(&Frame) -> Result<Frame, ConvertError>,
{
    match reshape(&frame) {
        Ok(reshaped) => reshaped,
        Err(err) => {
            counter!("reshape_fallback_total").increment(1);
            warn!(error = %err, rows = frame.row_count(), "reshape failed, returning long frame");
            frame.append_notice(Notice::warning(format!(
                "{NOT_TIME_SERIES_NOTICE} The response must have at least one datetime field and one numeric field. Error: {err}"
            )));
            frame
        }
    }
}
