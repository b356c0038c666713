//! Loading raw record batches from disk or stdin.
//!
//! - **Format resolution**: `.csv` / `.tsv` inputs are delimited text, anything
//!   else (including `-` for stdin) is a JSON array of objects, unless the
//!   caller forces a format.
//! - **Encoding**: input bytes are decoded via `encoding_rs`, defaulting to UTF-8.
//! - **Delimited text**: the header row names the fields and every cell becomes
//!   a string value.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{cli::SourceArgs, normalize::FieldKeyMap, rows::RawRecord};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum InputFormat {
    Json,
    Csv,
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

fn extension_is(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

pub fn resolve_input_format(path: &Path, provided: Option<InputFormat>) -> InputFormat {
    provided.unwrap_or(if extension_is(path, "csv") || extension_is(path, "tsv") {
        InputFormat::Csv
    } else {
        InputFormat::Json
    })
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or(if extension_is(path, "tsv") {
        DEFAULT_TSV_DELIMITER
    } else {
        DEFAULT_CSV_DELIMITER
    })
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_dash(path) {
        Ok(Box::new(std::io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        )))
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InputOptions {
    pub format: Option<InputFormat>,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

pub fn load_records(path: &Path, options: &InputOptions) -> Result<Vec<RawRecord>> {
    let reader = open_input(path)?;
    let records = match resolve_input_format(path, options.format) {
        InputFormat::Json => read_json_records(reader, options.encoding),
        InputFormat::Csv => read_csv_records(
            reader,
            resolve_input_delimiter(path, options.delimiter),
            options.encoding,
        ),
    }
    .with_context(|| format!("Loading records from {path:?}"))?;
    debug!("Loaded {} record(s) from {:?}", records.len(), path);
    Ok(records)
}

/// Loads the records and the merged key mapping named by the command line.
pub fn load_source(args: &SourceArgs) -> Result<(Vec<RawRecord>, FieldKeyMap)> {
    let mut key_map = match &args.key_map {
        Some(path) => FieldKeyMap::load(path)?,
        None => FieldKeyMap::new(),
    };
    for spec in &args.keys {
        let (field, key) = FieldKeyMap::parse_entry(spec)?;
        key_map.insert(field, key);
    }
    let options = InputOptions {
        format: args.input_format,
        delimiter: args.delimiter,
        encoding: resolve_encoding(args.input_encoding.as_deref())?,
    };
    let records = load_records(&args.input, &options)?;
    Ok((records, key_map))
}

/// Reads a JSON array whose elements are all objects.
pub fn read_json_records<R: Read>(
    mut reader: R,
    encoding: &'static Encoding,
) -> Result<Vec<RawRecord>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).context("Reading JSON input")?;
    let text = decode_bytes(&bytes, encoding)?;
    let parsed: serde_json::Value = serde_json::from_str(&text).context("Parsing JSON input")?;
    let serde_json::Value::Array(items) = parsed else {
        return Err(anyhow!("Expected a JSON array of records"));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            serde_json::Value::Object(record) => Ok(record),
            _ => Err(anyhow!("Element {idx} of the JSON array is not an object")),
        })
        .collect()
}

pub fn read_csv_records<R: Read>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader);
    let headers = reader
        .byte_headers()
        .context("Reading header row")?
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect::<Result<Vec<_>>>()?;
    let mut records = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let mut object = RawRecord::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            let text = decode_bytes(field, encoding)
                .with_context(|| format!("Decoding row {}", row_idx + 2))?;
            object.insert(header.clone(), serde_json::Value::String(text));
        }
        records.push(object);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_follows_extension_unless_forced() {
        assert_eq!(resolve_input_format(Path::new("a.csv"), None), InputFormat::Csv);
        assert_eq!(resolve_input_format(Path::new("a.TSV"), None), InputFormat::Csv);
        assert_eq!(resolve_input_format(Path::new("a.json"), None), InputFormat::Json);
        assert_eq!(resolve_input_format(&PathBuf::from("-"), None), InputFormat::Json);
        assert_eq!(
            resolve_input_format(Path::new("a.txt"), Some(InputFormat::Csv)),
            InputFormat::Csv
        );
        assert_eq!(resolve_input_delimiter(Path::new("a.tsv"), None), b'\t');
    }

    #[test]
    fn json_records_keep_field_order() {
        let input = br#"[{"b": 1, "a": "x"}, {"c": null}]"#;
        let records = read_json_records(&input[..], UTF_8).expect("parse");
        assert_eq!(records.len(), 2);
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn json_input_must_be_an_array_of_objects() {
        assert!(read_json_records(&br#"{"a": 1}"#[..], UTF_8).is_err());
        assert!(read_json_records(&br#"[1, 2]"#[..], UTF_8).is_err());
    }

    #[test]
    fn csv_rows_become_string_records() {
        let input = "name;age\nBob;30\nAmy;\n";
        let records = read_csv_records(input.as_bytes(), b';', UTF_8).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["age"], serde_json::json!("30"));
        assert_eq!(records[1]["age"], serde_json::json!(""));
    }

    #[test]
    fn decode_honours_legacy_encodings() {
        let encoding = resolve_encoding(Some("windows-1252")).expect("encoding");
        assert_eq!(decode_bytes(&[0x63, 0x61, 0x66, 0xE9], encoding).unwrap(), "café");
        assert!(resolve_encoding(Some("klingon")).is_err());
    }
}
