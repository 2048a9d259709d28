//! Store actor owning the SQLite connection.
//!
//! SQLite connections are not `Sync`, and the engine's repositories are
//! shared across async tasks. A single actor thread owns the connection and
//! processes jobs serially; repositories hold a cloneable [`StoreHandle`]
//! and await their results over a oneshot reply channel. Each job runs
//! inside its own transaction, so multi-statement jobs (like saving a full
//! preference snapshot) commit atomically.

use log::debug;
use rusqlite::Connection;
use std::any::Any;
use std::path::Path;
use tokio::sync::{mpsc, oneshot};

use crate::errors::StorageError;
use tradepulse_core::errors::Result;

// Type alias for the job to be executed by the store actor. The boxed Any
// return erases the job's result type so one channel serves every job shape.
type Job = Box<dyn FnOnce(&Connection) -> Result<Box<dyn Any + Send + 'static>> + Send + 'static>;

/// Handle for sending jobs to the store actor.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<(Job, oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>)>,
}

impl StoreHandle {
    /// Executes a database job on the actor's connection.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("Store actor's receiving channel was closed, indicating the actor stopped.");

        ret_rx
            .await
            .expect("Store actor dropped the reply sender without sending a result.")
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("Failed to downcast store actor result."))
            })
    }
}

/// Open (or create) the sync engine database and spawn its store actor.
pub fn open(path: impl AsRef<Path>) -> Result<StoreHandle> {
    let path = path.as_ref();
    let conn = Connection::open(path).map_err(StorageError::from)?;
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(StorageError::from)?;
    bootstrap_schema(&conn)?;
    debug!("Opened sync database at {}", path.display());
    Ok(spawn_actor(conn))
}

/// In-memory database, for tests.
pub fn open_in_memory() -> Result<StoreHandle> {
    let conn = Connection::open_in_memory().map_err(StorageError::from)?;
    bootstrap_schema(&conn)?;
    Ok(spawn_actor(conn))
}

fn bootstrap_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS preferences (
            pref_key TEXT PRIMARY KEY NOT NULL,
            pref_value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entity_cache (
            entity_kind TEXT NOT NULL,
            user_id TEXT NOT NULL,
            exchange TEXT NOT NULL,
            account_type TEXT NOT NULL,
            last_fetched_at TEXT NOT NULL,
            stale INTEGER NOT NULL DEFAULT 0,
            payload TEXT NOT NULL,
            PRIMARY KEY (entity_kind, user_id, exchange, account_type)
        );

        CREATE TABLE IF NOT EXISTS activity_log (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            action_type TEXT NOT NULL,
            action_category TEXT NOT NULL,
            source TEXT NOT NULL,
            entity_type TEXT,
            old_value TEXT,
            new_value TEXT,
            timestamp TEXT NOT NULL,
            synced INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .map_err(StorageError::from)?;
    Ok(())
}

/// Spawns the dedicated actor thread that owns the connection and processes
/// jobs serially, each inside an immediate transaction.
fn spawn_actor(mut conn: Connection) -> StoreHandle {
    let (tx, mut rx) = mpsc::channel::<(
        Job,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>(1024);

    std::thread::spawn(move || {
        while let Some((job, reply_tx)) = rx.blocking_recv() {
            let result = run_in_transaction(&mut conn, job);
            // Ignore error if the receiver has dropped (e.g., request was
            // cancelled at session shutdown).
            let _ = reply_tx.send(result);
        }
        // Sender side dropped: every StoreHandle is gone, the actor ends.
    });

    StoreHandle { tx }
}

fn run_in_transaction(
    conn: &mut Connection,
    job: Job,
) -> Result<Box<dyn Any + Send + 'static>> {
    let tx = conn
        .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
        .map_err(StorageError::from)?;
    let value = job(&tx)?;
    tx.commit().map_err(StorageError::from)?;
    Ok(value)
}
