use crate::response::ResponseError;
use logframe_core::types::ColumnDescriptor;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
}

/// One table of a schema listing: its name and declared columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Column descriptors in the shape the frame builder consumes.
    pub fn descriptors(&self) -> Vec<ColumnDescriptor> {
        self.columns
            .iter()
            .map(|c| ColumnDescriptor::new(c.name.clone(), c.declared_type.clone()))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub fn schema_from_reader<R: Read>(reader: R) -> Result<Vec<TableSchema>, ResponseError> {
    let tables: Vec<TableSchema> = serde_json::from_reader(reader)?;
    non_empty(tables)
}

pub fn schema_from_slice(bytes: &[u8]) -> Result<Vec<TableSchema>, ResponseError> {
    let tables: Vec<TableSchema> = serde_json::from_slice(bytes)?;
    non_empty(tables)
}

fn non_empty(tables: Vec<TableSchema>) -> Result<Vec<TableSchema>, ResponseError> {
    if tables.is_empty() {
        return Err(ResponseError::NoTables);
    }
    Ok(tables)
}
