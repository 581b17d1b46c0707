//! CSV results log

use crate::sink::traits::{ResultSink, SinkRecord, SinkResult};
use std::fs::File;
use std::path::Path;

/// Column headers written at the top of every fresh log
pub const CSV_HEADERS: [&str; 3] = ["url", "descriptor", "timestamp"];

/// Writes `url,descriptor,timestamp` rows to a file truncated at startup
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Creates (or truncates) the log at `path` and writes the header row
    pub fn create(path: &Path) -> SinkResult<Self> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(CSV_HEADERS)?;
        writer.flush()?;
        Ok(Self { writer })
    }
}

impl ResultSink for CsvSink {
    fn append(&mut self, record: &SinkRecord) -> SinkResult<()> {
        let timestamp = record.timestamp.to_rfc3339();
        self.writer
            .write_record([record.url.as_str(), record.descriptor.as_str(), timestamp.as_str()])?;
        // One flush per record: a crash loses at most the row in flight
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
