//! Result sinks: the durable, append-only log of processed URLs
//!
//! The coordinator writes one record per accepted submission. A failed
//! write is logged and never rolls back frontier growth.

mod csv_sink;
mod memory;
mod sqlite;
mod traits;

pub use csv_sink::{CsvSink, CSV_HEADERS};
pub use memory::MemorySink;
pub use sqlite::SqliteSink;
pub use traits::{ResultSink, SinkError, SinkRecord, SinkResult};

use crate::config::{OutputConfig, SinkFormat};
use std::path::Path;

/// Creates the sink configured in `[output]`, truncating any previous log
pub fn open_sink(config: &OutputConfig) -> SinkResult<Box<dyn ResultSink>> {
    let path = Path::new(&config.results_path);

    let sink: Box<dyn ResultSink> = match config.format {
        SinkFormat::Csv => Box::new(CsvSink::create(path)?),
        SinkFormat::Sqlite => Box::new(SqliteSink::create(path)?),
    };

    tracing::info!(
        "Writing {:?} results log to {}",
        config.format,
        config.results_path
    );

    Ok(sink)
}
