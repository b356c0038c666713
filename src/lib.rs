pub mod cli;
pub mod columns;
pub mod data;
pub mod engine;
pub mod error;
pub mod filter;
pub mod input;
pub mod normalize;
pub mod paginate;
pub mod rows;
pub mod schema;
pub mod shell;
pub mod sort;
pub mod table;
pub mod view;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug, info};

pub use crate::{
    data::{SlashDate, Value, format_cell},
    engine::{ColumnView, Page, PreparedBatch, Snapshot, TableEngine, Trigger, prepare_batch},
    error::{EngineError, EngineResult},
    filter::SearchQuery,
    normalize::FieldKeyMap,
    paginate::{PageMetadata, PageStep, RowsPerPage},
    rows::{RawRecord, Row},
    schema::{Column, Schema},
    sort::{SortDirection, SortState},
};

use crate::cli::{Cli, Commands, SourceArgs};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("tabular_view", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Columns(args) => {
            describe_source("Listing columns of", &args.source);
            columns::execute(&args)
        }
        Commands::View(args) => {
            describe_source("Viewing", &args.source);
            view::execute(&args)
        }
        Commands::Shell(args) => {
            describe_source("Opening shell on", &args.source);
            shell::execute(&args)
        }
    }
}

fn describe_source(action: &str, source: &SourceArgs) {
    let path = &source.input;
    match input::resolve_input_format(path, source.input_format) {
        input::InputFormat::Csv => info!(
            "{action} '{}' with delimiter '{}'",
            path.display(),
            printable_delimiter(input::resolve_input_delimiter(path, source.delimiter))
        ),
        input::InputFormat::Json => info!("{action} '{}'", path.display()),
    }
    if source.key_map.is_some() || !source.keys.is_empty() {
        debug!(
            "Key mappings from {:?} plus {} inline entr(ies)",
            source.key_map,
            source.keys.len()
        );
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
