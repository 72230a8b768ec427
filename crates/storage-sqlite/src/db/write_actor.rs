//! Serialized write actor.
//!
//! SQLite allows a single writer; funnelling every mutation through one
//! dedicated thread removes lock contention and gives each job its own
//! immediate transaction.

use diesel::sqlite::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use milkline_core::errors::DatabaseError;
use milkline_core::{Error, Result};

use super::DbPool;

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

const WRITE_QUEUE_DEPTH: usize = 64;

/// Internal transaction error carrier: either the job's own error or a
/// transaction-machinery failure from diesel.
enum TxError {
    Job(Error),
    Db(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Db(err)
    }
}

#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<WriteJob>,
}

impl WriteHandle {
    /// Run a mutation on the writer thread inside one immediate transaction.
    /// An `Err` from the job rolls the transaction back.
    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel::<Result<T>>();
        let boxed: WriteJob = Box::new(move |conn| {
            let outcome =
                match conn.immediate_transaction::<T, TxError, _>(|tx| job(tx).map_err(TxError::Job))
                {
                    Ok(value) => Ok(value),
                    Err(TxError::Job(err)) => Err(err),
                    Err(TxError::Db(err)) => {
                        Err(Error::Database(DatabaseError::Query(err.to_string())))
                    }
                };
            let _ = done_tx.send(outcome);
        });

        self.tx.send(boxed).await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Write actor has shut down".to_string(),
            ))
        })?;
        done_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Write job dropped before completion".to_string(),
            ))
        })?
    }
}

/// Spawn the writer thread. The handle is cheap to clone; dropping every
/// clone stops the thread.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<WriteJob>(WRITE_QUEUE_DEPTH);

    std::thread::Builder::new()
        .name("milkline-db-writer".to_string())
        .spawn(move || {
            while let Some(job) = rx.blocking_recv() {
                match pool.get() {
                    Ok(mut conn) => job(&mut conn),
                    Err(err) => {
                        // The job is dropped; its oneshot sender goes with it
                        // and the caller sees a completed-without-result error.
                        log::error!("Write actor could not acquire a connection: {}", err);
                    }
                }
            }
        })
        .expect("Failed to spawn the database writer thread");

    WriteHandle { tx }
}
