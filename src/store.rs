//! Durable persistence of transcription results.
//!
//! One SQLite file per input recording holds a single `words` relation. The
//! contract is replace-all: every save is a transaction that clears the table
//! and inserts the new batch in order, so the store always reflects exactly
//! the last successfully saved batch (or the prior one, if a save rolls back).
//!
//! Schema changes are explicit, versioned migrations run once at `open`:
//! - v1 creates `words` with `word`/`start_time`
//! - v2 adds `end_time REAL NOT NULL DEFAULT 0` (additive; rows created under
//!   the older schema keep their data and report `end_time = 0`)

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, params};
use rusqlite_migration::{M, Migrations};
use tracing::info;

use crate::error::{Error, Result};
use crate::words::{WordBatch, WordSpan};

/// How long a connection waits on a locked store file before giving up.
///
/// Sequential pipeline runs may target the same output directory; this is the
/// only safeguard against lock contention (no application-level locking).
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        M::up(
            "CREATE TABLE words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT NOT NULL,
                start_time REAL NOT NULL
            );",
        ),
        M::up("ALTER TABLE words ADD COLUMN end_time REAL NOT NULL DEFAULT 0;"),
    ])
}

/// A handle to the word store for one recording.
///
/// A constructed `ResultStore` always owns a live, fully migrated connection;
/// there is no half-initialized state. The connection is released when the
/// store is dropped, or deterministically via [`ResultStore::close`].
#[derive(Debug)]
pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    /// Open or create the store at `path` and bring its schema up to date.
    ///
    /// Failure semantics:
    /// - the file cannot be opened/created → [`Error::StoreConnection`]
    /// - the schema cannot be migrated → [`Error::StoreMigration`]
    ///
    /// Both are fatal to a pipeline run; neither leaves a partially
    /// initialized handle behind.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path).map_err(Error::StoreConnection)?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(Error::StoreConnection)?;

        migrations()
            .to_latest(&mut conn)
            .map_err(Error::StoreMigration)?;

        Ok(Self { conn })
    }

    /// Replace the stored contents with `batch`.
    ///
    /// Runs as a single transaction: delete everything, then insert one row
    /// per span in batch order. If any step fails the transaction rolls back
    /// on drop, leaving the store at its prior contents rather than a partial
    /// batch.
    pub fn save(&mut self, batch: &WordBatch) -> Result<()> {
        let tx = self.conn.transaction().map_err(Error::StoreSave)?;

        tx.execute("DELETE FROM words", []).map_err(Error::StoreSave)?;

        {
            let mut stmt = tx
                .prepare("INSERT INTO words (word, start_time, end_time) VALUES (?1, ?2, ?3)")
                .map_err(Error::StoreSave)?;

            for span in batch {
                stmt.execute(params![span.word, span.start, span.end])
                    .map_err(Error::StoreSave)?;
            }
        }

        tx.commit().map_err(Error::StoreSave)?;

        info!(words = batch.len(), "saved word batch to result store");
        Ok(())
    }

    /// Read back every stored span in insertion order.
    pub fn load(&self) -> Result<WordBatch> {
        let mut stmt = self
            .conn
            .prepare("SELECT word, start_time, end_time FROM words ORDER BY id")
            .map_err(Error::StoreQuery)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(WordSpan {
                    word: row.get(0)?,
                    start: row.get(1)?,
                    end: row.get(2)?,
                })
            })
            .map_err(Error::StoreQuery)?;

        let mut spans = Vec::new();
        for row in rows {
            spans.push(row.map_err(Error::StoreQuery)?);
        }

        Ok(WordBatch::from_spans(spans))
    }

    /// Release the underlying connection deterministically.
    ///
    /// Dropping the store also closes the connection; this method exists so
    /// callers can bracket a store session explicitly and observe close
    /// failures instead of swallowing them.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_conn, err)| Error::StoreConnection(err))
    }
}
