use log::debug;

use crate::{
    rows::Row,
    sort::{SortState, sort_view},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = raw.to_lowercase();
        SearchQuery { raw, needle }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn matches(&self, row: &Row) -> bool {
        if self.is_empty() {
            return true;
        }
        row.cells
            .iter()
            .flatten()
            .any(|value| value.as_display().to_lowercase().contains(&self.needle))
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery::new("")
    }
}

/// Positions in `rows` that satisfy `query`, in input order.
pub fn filter_rows(rows: &[Row], query: &SearchQuery) -> Vec<usize> {
    let kept: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| query.matches(row))
        .map(|(idx, _)| idx)
        .collect();
    debug!(
        "Query '{}' kept {}/{} row(s)",
        query.as_str(),
        kept.len(),
        rows.len()
    );
    kept
}

/// Filters, then re-sorts by the first column of `sort_state` (in column order)
/// whose direction is set. Later active columns are ignored.
pub fn filter_and_resort(rows: &[Row], query: &SearchQuery, sort_state: &SortState) -> Vec<usize> {
    let mut kept = filter_rows(rows, query);
    if let Some((column, name, direction)) = sort_state.first_active() {
        sort_view(&mut kept, rows, column, name, direction);
    }
    kept
}
