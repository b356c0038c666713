use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;

use crate::{
    cli::{OutputFormat, ViewArgs},
    engine::{ColumnView, Snapshot, TableEngine, Trigger},
    input,
    paginate::{PageMetadata, PageStep},
    rows::RawRecord,
    table,
};

pub fn execute(args: &ViewArgs) -> Result<()> {
    let (records, key_map) = input::load_source(&args.source)?;
    let mut engine = TableEngine::with_rows_per_page(args.rows);
    engine
        .ingest(&records, &key_map)
        .with_context(|| format!("Ingesting records from {:?}", args.source.input))?;

    for trigger in view_triggers(args) {
        engine.apply(trigger);
    }
    let reached = advance_to_page(&mut engine, args.page);
    if reached < args.page.max(1) {
        debug!(
            "Requested page {} but only {} page(s) exist",
            args.page,
            engine.page_count()
        );
    }

    let snapshot = engine.snapshot();
    match args.format {
        OutputFormat::Table => print!("{}", table::render_snapshot(&snapshot)),
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&JsonPage::from_snapshot(&snapshot))
                .context("Serializing page")?;
            println!("{rendered}");
        }
    }
    info!(
        "Rendered page {} of {} ({} matching record(s))",
        snapshot.metadata.current_page_index + 1,
        snapshot.metadata.page_count,
        snapshot.metadata.total_records
    );
    Ok(())
}

/// Engine triggers equivalent to the command-line options, except the page.
pub fn view_triggers(args: &ViewArgs) -> Vec<Trigger> {
    let mut triggers = Vec::new();
    if let Some(query) = &args.search {
        triggers.push(Trigger::Search(query.clone()));
    }
    triggers.extend(args.sort.iter().cloned().map(Trigger::SortBy));
    triggers.push(Trigger::SetRowsPerPage(args.rows));
    triggers
}

/// Steps forward towards 1-based `page`, stopping at the last page.
/// Returns the 1-based page reached.
pub fn advance_to_page(engine: &mut TableEngine, page: usize) -> usize {
    while engine.current_page_index() + 1 < page && engine.metadata().has_next {
        engine.apply(Trigger::GoToPage(PageStep::Next));
    }
    engine.current_page_index() + 1
}

#[derive(Debug, Serialize)]
struct JsonPage<'a> {
    query: &'a str,
    columns: &'a [ColumnView<'a>],
    rows: Vec<RawRecord>,
    no_results: bool,
    pagination: PageMetadata,
}

impl<'a> JsonPage<'a> {
    fn from_snapshot(snapshot: &'a Snapshot<'a>) -> Self {
        JsonPage {
            query: snapshot.query,
            columns: &snapshot.columns,
            rows: snapshot
                .page
                .rows()
                .iter()
                .map(|row| row.to_json(snapshot.schema))
                .collect(),
            no_results: snapshot.page.is_empty(),
            pagination: snapshot.metadata,
        }
    }
}
