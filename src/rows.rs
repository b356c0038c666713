//! Raw input records and the normalized rows derived from them.
//!
//! A [`RawRecord`] is whatever the caller hands in: an ordered JSON object.
//! A [`Row`] is its normalized form, with one cell per schema column in
//! column order and `None` for fields the record does not carry.

use serde_json::Map;

use crate::{data::Value, schema::Schema};

pub type RawRecord = Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Position of the source record in its ingested batch.
    pub ordinal: usize,
    pub cells: Vec<Option<Value>>,
}

impl Row {
    pub fn cell(&self, column: usize) -> Option<&Value> {
        self.cells.get(column).and_then(Option::as_ref)
    }

    pub fn get<'a>(&'a self, schema: &Schema, name: &str) -> Option<&'a Value> {
        schema.column_index(name).and_then(|idx| self.cell(idx))
    }

    /// Present cells only, keyed by column name in column order.
    pub fn to_json(&self, schema: &Schema) -> RawRecord {
        let mut object = Map::new();
        for (column, cell) in schema.columns.iter().zip(&self.cells) {
            if let Some(value) = cell {
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                object.insert(column.name.clone(), json);
            }
        }
        object
    }
}
