//! Key-mapped flattening of raw records into scalar rows.
//!
//! Some fields arrive as mappings (`{"department": {"id": 4, "name": "Sales"}}`)
//! and the caller names, per field, which sub-key should stand in for the whole
//! mapping. Every other field must already be a scalar.

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Value, json_kind},
    error::{EngineError, EngineResult},
    rows::{RawRecord, Row},
    schema::Schema,
};

static MISSING_KEY: serde_json::Value = serde_json::Value::Null;

/// Field name to the sub-key that replaces the field's mapping value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKeyMap(BTreeMap<String, String>);

impl FieldKeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, key: impl Into<String>) {
        self.0.insert(field.into(), key.into());
    }

    pub fn key_for(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads a flat `field: key` mapping written as YAML or JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Reading key map {path:?}"))?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).with_context(|| format!("Parsing key map {path:?}"))
    }

    /// Parses a `field=key` override.
    pub fn parse_entry(spec: &str) -> Result<(String, String)> {
        let (field, key) = spec
            .split_once('=')
            .ok_or_else(|| anyhow!("Key mapping '{spec}' must look like field=key"))?;
        let (field, key) = (field.trim(), key.trim());
        if field.is_empty() || key.is_empty() {
            return Err(anyhow!("Key mapping '{spec}' has an empty field or key"));
        }
        Ok((field.to_string(), key.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldKeyMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        FieldKeyMap(
            iter.into_iter()
                .map(|(field, key)| (field.into(), key.into()))
                .collect(),
        )
    }
}

/// Flattens every record of the batch against `schema`.
///
/// A mapped field must hold a mapping; a sub-key missing from that mapping
/// yields an absent cell. The first offending field aborts the whole batch.
pub fn normalize_records(
    records: &[RawRecord],
    schema: &Schema,
    key_map: &FieldKeyMap,
) -> EngineResult<Vec<Row>> {
    let rows = records
        .iter()
        .enumerate()
        .map(|(ordinal, record)| normalize_record(ordinal, record, schema, key_map))
        .collect::<EngineResult<Vec<_>>>()?;
    debug!(
        "Normalized {} record(s) across {} column(s) with {} key mapping(s)",
        rows.len(),
        schema.len(),
        key_map.len()
    );
    Ok(rows)
}

fn normalize_record(
    ordinal: usize,
    record: &RawRecord,
    schema: &Schema,
    key_map: &FieldKeyMap,
) -> EngineResult<Row> {
    let mut cells = vec![None; schema.len()];
    for (field, raw) in record {
        let Some(idx) = schema.column_index(field) else {
            continue;
        };
        let scalar = match key_map.key_for(field) {
            Some(key) => {
                let mapping = raw
                    .as_object()
                    .ok_or_else(|| EngineError::MalformedKeyMapping {
                        record: ordinal,
                        field: field.clone(),
                        key: key.to_string(),
                        found: json_kind(raw),
                    })?;
                mapping.get(key).unwrap_or(&MISSING_KEY)
            }
            None => raw,
        };
        cells[idx] = Value::from_json(scalar).map_err(|found| EngineError::UnflattenedField {
            record: ordinal,
            field: field.clone(),
            found,
        })?;
    }
    Ok(Row { ordinal, cells })
}
