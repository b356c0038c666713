//! Column discovery and label derivation.
//!
//! The [`Schema`] of a batch is the union of every field name seen across its
//! records, in first-seen order. Each column carries a display label derived
//! from its raw key by treating the key as `lowerCamelCase`.

use std::collections::HashMap;

use serde::Serialize;

use crate::rows::RawRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub label: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = derive_label(&name);
        Column { name, label }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<Column>,
    positions: HashMap<String, usize>,
}

impl Schema {
    fn observe(&mut self, name: String) {
        if self.positions.contains_key(&name) {
            return;
        }
        self.positions.insert(name.clone(), self.columns.len());
        self.columns.push(Column::new(name));
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Scans `records` in order and returns one column per distinct field name.
pub fn infer_schema(records: &[RawRecord]) -> Schema {
    let mut schema = Schema::default();
    for record in records {
        for name in record.keys() {
            if !schema.positions.contains_key(name) {
                schema.observe(name.clone());
            }
        }
    }
    schema
}

/// `firstName` becomes `First name`. Every uppercase letter after the first
/// character is lowered and preceded by a space, so runs of capitals split
/// letter by letter (`ID` becomes `I d`).
pub fn derive_label(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    for (idx, ch) in name.chars().enumerate() {
        if idx > 0 && ch.is_uppercase() {
            spaced.push(' ');
            spaced.extend(ch.to_lowercase());
        } else {
            spaced.push(ch);
        }
    }
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
