//! Column listing for a record batch.
//!
//! Ingests the batch exactly as `view` would (so key mappings are validated)
//! and renders each inferred column's position, raw name, and label.

use anyhow::{Context, Result};
use log::info;

use crate::{cli::ColumnsArgs, engine::prepare_batch, input, table};

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let (records, key_map) = input::load_source(&args.source)?;
    let batch = prepare_batch(&records, &key_map)
        .with_context(|| format!("Ingesting records from {:?}", args.source.input))?;

    if batch.schema.is_empty() {
        info!("{:?} does not contain any fields", args.source.input);
        return Ok(());
    }

    print!("{}", table::render_columns(&batch.schema));
    info!(
        "Listed {} column(s) from {:?}",
        batch.schema.len(),
        args.source.input
    );
    Ok(())
}
