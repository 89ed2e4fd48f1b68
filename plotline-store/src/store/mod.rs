//! Core plot store: thread-safe DuckDB handle, with one operations module per concern.

pub(crate) mod chain;
mod characters;
mod clone;
mod events;
pub(crate) mod helpers;
mod integrity;
mod manuscript;
mod ordering;
mod ownership;
mod stories;
mod tag_types;
mod tags;
mod users;

pub use clone::CloneSummary;
pub use integrity::{inspect_chain, ChainReport};
pub use ownership::OwnedRecord;

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::schema::initialize_plot_schema;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// Thread-safe store for stories and their plot graphs, backed by DuckDB.
#[derive(Clone)]
pub struct PlotStore {
    conn: Arc<Mutex<Connection>>,
    config: Arc<StoreConfig>,
}

impl PlotStore {
    /// Open (or create) the plot database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    pub fn open_with_config(path: &Path, config: StoreConfig) -> StoreResult<Self> {
        let conn = crate::open_plot_db(path, &config.memory_limit, config.threads)?;
        initialize_plot_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        })
    }

    /// Open an in-memory plot database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open_in_memory_with_config(StoreConfig::default())
    }

    pub fn open_in_memory_with_config(config: StoreConfig) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_plot_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Acquire the connection lock, recovering from poison if a prior
    /// operation panicked while holding it.
    ///
    /// A panic inside [`with_transaction`](Self::with_transaction) leaves its
    /// transaction open, so recovery rolls it back before handing out the
    /// connection.
    pub(crate) fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("PlotStore recovering from poisoned mutex");
                let guard = poisoned.into_inner();
                self.conn.clear_poison();
                // Fails harmlessly when no transaction was open.
                if guard.execute_batch("ROLLBACK").is_ok() {
                    warn!("Rolled back transaction abandoned by a panic");
                }
                guard
            }
        }
    }

    /// Run `op` inside a single transaction. Any error rolls the whole
    /// transaction back and is returned unchanged.
    pub(crate) fn with_transaction<T>(
        &self,
        op: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let conn = self.lock_conn();
        conn.execute_batch("BEGIN TRANSACTION")?;

        match op(&conn) {
            Ok(value) => match conn.execute_batch("COMMIT") {
                Ok(()) => Ok(value),
                Err(e) => {
                    rollback(&conn);
                    Err(e.into())
                }
            },
            Err(e) => {
                rollback(&conn);
                Err(e)
            }
        }
    }
}

fn rollback(conn: &Connection) {
    if let Err(e) = conn.execute_batch("ROLLBACK") {
        warn!(error = %e, "ROLLBACK failed");
    }
}
