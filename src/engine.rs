//! The orchestrating state container.
//!
//! [`TableEngine`] owns everything derived from the current batch and runs the
//! pipeline stages in a fixed order in response to discrete [`Trigger`]s:
//!
//! - `ingest`: schema → normalize → view of all rows → paginate
//! - `Search`: filter → re-sort by the first active column → paginate
//! - `SortBy`: toggle → sort the current view → paginate
//! - `SetRowsPerPage`: paginate
//! - `GoToPage`: move within the existing pages
//!
//! Every trigger except `ingest` is total. A failed `ingest` leaves the
//! previous state in place.

use log::{debug, warn};
use serde::Serialize;

use crate::{
    error::EngineResult,
    filter::{SearchQuery, filter_and_resort},
    normalize::{FieldKeyMap, normalize_records},
    paginate::{PageMetadata, PageStep, Paginator, RowsPerPage},
    rows::{RawRecord, Row},
    schema::{Schema, infer_schema},
    sort::{SortDirection, SortState, sort_by_column},
};

/// Columns, their initial sort state, and the normalized rows of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBatch {
    pub schema: Schema,
    pub sort_state: SortState,
    pub rows: Vec<Row>,
}

/// Runs schema inference and normalization over a raw batch.
pub fn prepare_batch(records: &[RawRecord], key_map: &FieldKeyMap) -> EngineResult<PreparedBatch> {
    let schema = infer_schema(records);
    let rows = normalize_records(records, &schema, key_map)?;
    let sort_state = SortState::from_columns(schema.names());
    Ok(PreparedBatch {
        schema,
        sort_state,
        rows,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Search(String),
    SortBy(String),
    SetRowsPerPage(RowsPerPage),
    GoToPage(PageStep),
}

/// The rows of the current page, or why there are none.
#[derive(Debug, Clone, PartialEq)]
pub enum Page<'a> {
    /// Nothing has been ingested yet.
    NotLoaded,
    /// Data is loaded but the current query matched nothing.
    NoResults,
    Rows(Vec<&'a Row>),
}

impl<'a> Page<'a> {
    pub fn rows(&self) -> &[&'a Row] {
        match self {
            Page::Rows(rows) => rows,
            Page::NotLoaded | Page::NoResults => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub direction: SortDirection,
}

/// Everything a renderer needs after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<'a> {
    pub schema: &'a Schema,
    pub columns: Vec<ColumnView<'a>>,
    pub page: Page<'a>,
    pub metadata: PageMetadata,
    pub query: &'a str,
}

#[derive(Debug, Default)]
pub struct TableEngine {
    batch: Option<PreparedBatch>,
    view: Vec<usize>,
    query: SearchQuery,
    paginator: Paginator,
}

impl TableEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows_per_page(rows_per_page: RowsPerPage) -> Self {
        TableEngine {
            paginator: Paginator::new(rows_per_page),
            ..Self::default()
        }
    }

    /// Replaces the current batch. Sort state and query are reset; the page
    /// size is kept.
    pub fn ingest(
        &mut self,
        records: &[RawRecord],
        key_map: &FieldKeyMap,
    ) -> EngineResult<&PreparedBatch> {
        let prepared = prepare_batch(records, key_map)?;
        debug!(
            "Ingested {} record(s) with {} column(s)",
            prepared.rows.len(),
            prepared.schema.len()
        );
        self.view = (0..prepared.rows.len()).collect();
        self.query = SearchQuery::default();
        self.paginator.recompute(self.view.len());
        Ok(&*self.batch.insert(prepared))
    }

    pub fn apply(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::Search(query) => self.run_search(query),
            Trigger::SortBy(column) => self.run_sort(&column),
            Trigger::SetRowsPerPage(rows_per_page) => {
                self.paginator.set_rows_per_page(rows_per_page);
                debug!(
                    "Showing {rows_per_page} row(s) per page across {} page(s)",
                    self.paginator.page_count()
                );
            }
            Trigger::GoToPage(step) => {
                if !self.paginator.step(step) {
                    debug!("Ignoring {step:?} at page {}", self.paginator.current_page() + 1);
                }
            }
        }
    }

    pub fn search(&mut self, query: impl Into<String>) -> Page<'_> {
        self.apply(Trigger::Search(query.into()));
        self.page()
    }

    pub fn sort_by(&mut self, column: impl Into<String>) -> Page<'_> {
        self.apply(Trigger::SortBy(column.into()));
        self.page()
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: RowsPerPage) -> Page<'_> {
        self.apply(Trigger::SetRowsPerPage(rows_per_page));
        self.page()
    }

    pub fn go_to_page(&mut self, step: PageStep) -> Page<'_> {
        self.apply(Trigger::GoToPage(step));
        self.page()
    }

    fn run_search(&mut self, query: String) {
        let Some(batch) = self.batch.as_ref() else {
            debug!("Ignoring search before any data was ingested");
            return;
        };
        self.query = SearchQuery::new(query);
        self.view = filter_and_resort(&batch.rows, &self.query, &batch.sort_state);
        self.paginator.recompute(self.view.len());
    }

    fn run_sort(&mut self, column: &str) {
        let Some(batch) = self.batch.as_mut() else {
            debug!("Ignoring sort on '{column}' before any data was ingested");
            return;
        };
        match sort_by_column(&mut self.view, &batch.rows, &mut batch.sort_state, column, true) {
            Some(_) => self.paginator.recompute(self.view.len()),
            None => warn!("Cannot sort by unknown column '{column}'"),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.batch.is_some()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.batch.as_ref().map(|batch| &batch.schema)
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.batch.as_ref().map(|batch| &batch.sort_state)
    }

    /// All normalized rows of the current batch, in input order.
    pub fn rows(&self) -> &[Row] {
        self.batch.as_ref().map(|batch| batch.rows.as_slice()).unwrap_or(&[])
    }

    /// The filtered and sorted rows across all pages.
    pub fn view(&self) -> Vec<&Row> {
        let rows = self.rows();
        self.view.iter().map(|&idx| &rows[idx]).collect()
    }

    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    pub fn rows_per_page(&self) -> RowsPerPage {
        self.paginator.rows_per_page()
    }

    pub fn current_page_index(&self) -> usize {
        self.paginator.current_page()
    }

    pub fn page_count(&self) -> usize {
        self.paginator.page_count()
    }

    pub fn page(&self) -> Page<'_> {
        let Some(batch) = self.batch.as_ref() else {
            return Page::NotLoaded;
        };
        if self.view.is_empty() {
            return Page::NoResults;
        }
        Page::Rows(
            self.view[self.paginator.page_range()]
                .iter()
                .map(|&idx| &batch.rows[idx])
                .collect(),
        )
    }

    pub fn metadata(&self) -> PageMetadata {
        self.paginator.metadata(&self.view)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        static EMPTY: std::sync::OnceLock<Schema> = std::sync::OnceLock::new();
        let schema = self
            .schema()
            .unwrap_or_else(|| EMPTY.get_or_init(Schema::default));
        let columns = schema
            .columns
            .iter()
            .map(|column| ColumnView {
                name: &column.name,
                label: &column.label,
                direction: self
                    .sort_state()
                    .and_then(|state| state.get(&column.name))
                    .unwrap_or_default(),
            })
            .collect();
        Snapshot {
            schema,
            columns,
            page: self.page(),
            metadata: self.metadata(),
            query: self.query(),
        }
    }
}
