//! DuckDB storage layer for Plotline.
//!
//! Stores users, stories, tag types, tags, character extensions and plot
//! events, and keeps each story's narrative chain consistent.
//!
//! # Architecture
//!
//! - Records live in plain tables keyed by sequence-issued integer ids
//! - The narrative chain is stored as `prev_event_id` / `next_event_id`
//!   columns and rewritten only by the chain engine (`store::chain`)
//! - Every mutation resolves ownership first, then runs inside one
//!   transaction so a failed step leaves no partial relink or clone
//! - New users receive a full copy of the configured template story

mod config;
mod error;
mod schema;
mod store;

pub use config::{MemoryRefPolicy, StoreConfig};
pub use error::{ErrorKind, StoreError, StoreResult};
pub use schema::initialize_plot_schema;
pub use store::{inspect_chain, ChainReport, CloneSummary, OwnedRecord, PlotStore};

use tracing::warn;

/// Open a DuckDB connection with stale WAL recovery and resource limits.
///
/// When the database refuses to open and a write-ahead log sits next to it,
/// the log is deleted and the open retried once. Deleting the log discards
/// any commits that were not yet checkpointed into the database file, so a
/// recovered store can be missing its most recent writes.
pub fn open_plot_db(
    path: &std::path::Path,
    memory_limit: &str,
    threads: u32,
) -> StoreResult<duckdb::Connection> {
    let conn = duckdb::Connection::open(path).or_else(|err| {
        let wal = wal_path(path);
        if !wal.exists() {
            return Err(err);
        }
        warn!(
            db = %path.display(),
            wal = %wal.display(),
            error = %err,
            "Plot database failed to open; discarding its WAL and retrying"
        );
        match std::fs::remove_file(&wal) {
            Ok(()) => duckdb::Connection::open(path),
            Err(remove_err) => {
                warn!(error = %remove_err, "Could not remove WAL");
                Err(err)
            }
        }
    })?;
    apply_resource_limits(&conn, memory_limit, threads)?;
    Ok(conn)
}

/// DuckDB keeps its log at `<database file>.wal`.
fn wal_path(db: &std::path::Path) -> std::path::PathBuf {
    let mut name = db.as_os_str().to_owned();
    name.push(".wal");
    std::path::PathBuf::from(name)
}

fn apply_resource_limits(
    conn: &duckdb::Connection,
    memory_limit: &str,
    threads: u32,
) -> StoreResult<()> {
    let memory_limit = memory_limit.replace('\'', "");
    conn.execute_batch(&format!(
        "PRAGMA memory_limit='{memory_limit}'; PRAGMA threads={threads};"
    ))?;
    Ok(())
}
