use crate::builder::build_frame;
use logframe_core::error::ConvertError;
use logframe_core::frame::Frame;
use logframe_core::types::ColumnDescriptor;
use logframe_core::value::RawRow;
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("unable to parse response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unable to parse response, parsed response has no headers")]
    MissingHeaders,
    #[error("unable to parse response, parsed response has no tables")]
    NoTables,
}

/// A decoded query response: column schema plus rows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableResponse {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub results: Vec<RawRow>,
}

impl TableResponse {
    pub fn new(columns: Vec<ColumnDescriptor>, results: Vec<RawRow>) -> Self {
        Self {
            headers: columns.iter().map(|c| c.name.clone()).collect(),
            columns,
            results,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ResponseError> {
        let response: TableResponse = serde_json::from_reader(reader)?;
        response.checked()
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ResponseError> {
        let response: TableResponse = serde_json::from_slice(bytes)?;
        response.checked()
    }

    fn checked(self) -> Result<Self, ResponseError> {
        if self.headers.is_empty() {
            return Err(ResponseError::MissingHeaders);
        }
        Ok(self)
    }

    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Builds the table frame and records the query that produced it.
    pub fn to_frame(&self, executed_query: &str) -> Result<Frame, ConvertError> {
        let mut frame = build_frame(&self.columns, &self.results)?;
        frame.set_executed_query(executed_query);
        Ok(frame)
    }
}
