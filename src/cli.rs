use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{input::InputFormat, paginate::RowsPerPage};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Search, sort and page through heterogeneous records",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the columns inferred from a record batch with their display labels
    Columns(ColumnsArgs),
    /// Render one page of a record batch after searching and sorting
    View(ViewArgs),
    /// Browse a record batch interactively with commands read from stdin
    Shell(ShellArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input file of records: a JSON array of objects, or CSV/TSV ('-' reads JSON from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Force the input format instead of inferring it from the extension
    #[arg(long = "input-format")]
    pub input_format: Option<InputFormat>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// YAML or JSON file mapping nested fields to the sub-key that replaces them
    #[arg(short = 'k', long = "key-map")]
    pub key_map: Option<PathBuf>,
    /// Inline key mapping of the form `field=sub_key` (repeatable, overrides --key-map)
    #[arg(long = "key", action = clap::ArgAction::Append)]
    pub keys: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Case-insensitive text that at least one field of a row must contain
    #[arg(short = 's', long = "search")]
    pub search: Option<String>,
    /// Toggle sorting on a column; repeat to toggle again or to sort another column
    #[arg(long = "sort", action = clap::ArgAction::Append)]
    pub sort: Vec<String>,
    /// Rows per page (10, 25, 50 or 100)
    #[arg(short = 'r', long = "rows", default_value = "10")]
    pub rows: RowsPerPage,
    /// 1-based page to show; stops at the last page
    #[arg(short = 'p', long = "page", default_value_t = 1)]
    pub page: usize,
    /// Output format for the rendered page
    #[arg(long = "format", default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ShellArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Initial rows per page (10, 25, 50 or 100)
    #[arg(short = 'r', long = "rows", default_value = "10")]
    pub rows: RowsPerPage,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
