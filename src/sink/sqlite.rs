//! SQLite results log

use crate::sink::traits::{ResultSink, SinkRecord, SinkResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// Schema for the results table; recreated at the start of every run
pub const SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS crawl_results;

CREATE TABLE crawl_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    descriptor TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX idx_crawl_results_url ON crawl_results(url);
"#;

/// SQLite-backed result sink
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens the database at `path` and starts a fresh results table
    pub fn create(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        Self::with_connection(conn)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> SinkResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> SinkResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Number of records written so far
    pub fn record_count(&self) -> SinkResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM crawl_results", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// All records in insertion order as `(url, descriptor)` pairs
    pub fn records(&self) -> SinkResult<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, descriptor FROM crawl_results ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl ResultSink for SqliteSink {
    fn append(&mut self, record: &SinkRecord) -> SinkResult<()> {
        self.conn.execute(
            "INSERT INTO crawl_results (url, descriptor, recorded_at) VALUES (?1, ?2, ?3)",
            params![record.url, record.descriptor, record.timestamp.to_rfc3339()],
        )?;
        Ok(())
    }
}
