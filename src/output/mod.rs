//! Output module: where harvested pages go
//!
//! This module handles:
//! - The [`Sink`] collaborator trait and batch summaries
//! - Persisting pages, failures and summaries to SQLite
//! - Dumping page text to a directory of `.txt` files
//! - Exporting pages as one JSON array
//! - Printing statistics from an existing database

mod json_file;
mod sqlite_output;
pub mod stats;
mod text_file;
mod traits;

pub use json_file::{JsonFileSink, JsonRecord};
pub use sqlite_output::SqliteSink;
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
pub use text_file::{file_stem_for, TextFileSink};
pub use traits::{BatchSummary, MultiSink, Sink, SinkResult};

use crate::config::OutputConfig;
use crate::storage::open_storage;
use crate::HarvestError;
use std::path::Path;

/// Builds the sinks named by the output configuration
///
/// The SQLite sink is always present. The file sinks come first so that a
/// page they reject never reaches the database.
pub fn sink_from_config(
    output: &OutputConfig,
    config_hash: &str,
) -> Result<MultiSink, HarvestError> {
    let mut sink = MultiSink::new();

    if let Some(directory) = &output.text_directory {
        let text = TextFileSink::new(directory)?;
        tracing::info!("Writing page text to {}", text.directory().display());
        sink = sink.with(text);
    }

    if let Some(path) = &output.json_path {
        let json = JsonFileSink::new(path)?;
        tracing::info!("Exporting pages to {}", json.path().display());
        sink = sink.with(json);
    }

    let storage = open_storage(Path::new(&output.database_path))?;
    Ok(sink.with(SqliteSink::new(storage, config_hash)))
}
