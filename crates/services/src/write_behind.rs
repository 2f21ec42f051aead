//! Background persistence for in-memory state.
//!
//! Mutating operations snapshot their state, hand it to a single worker task
//! and return immediately. The worker applies writes in submission order, so
//! a later snapshot of a key can never be overwritten by an earlier one.
//! Failures are logged and dropped; callers that need a stronger guarantee
//! await [`WriteBehind::flush`].

use std::sync::Arc;

use serde::Serialize;
use storage::json;
use storage::repository::{KeyValueStore, StorageKey};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

enum Command {
    Set { key: StorageKey, value: String },
    Remove { key: StorageKey },
    Flush(oneshot::Sender<()>),
}

/// Handle to a write-behind worker. Cheap to clone.
#[derive(Clone)]
pub struct WriteBehind {
    tx: Option<mpsc::UnboundedSender<Command>>,
}

impl WriteBehind {
    /// Start a worker writing to `store` on the current Tokio runtime.
    ///
    /// Outside a runtime no worker can run: the handle is returned disabled
    /// and every write is dropped with a warning.
    #[must_use]
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("no tokio runtime available; durable writes are disabled");
            return Self::disabled();
        };
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run(store, rx));
        Self { tx: Some(tx) }
    }

    /// A handle that never persists anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Snapshot `value` as JSON and queue it for `key`.
    pub fn set_json<T>(&self, key: StorageKey, value: &T)
    where
        T: Serialize + ?Sized,
    {
        match json::encode(key, value) {
            Ok(value) => self.submit(Command::Set { key, value }),
            Err(err) => tracing::warn!(%key, error = %err, "failed to encode value for storage"),
        }
    }

    /// Queue removal of `key`.
    pub fn remove(&self, key: StorageKey) {
        self.submit(Command::Remove { key });
    }

    /// Wait until every write queued before this call has been applied.
    ///
    /// Returns immediately when the handle is disabled.
    pub async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (done_tx, done_rx) = oneshot::channel();
        if tx.send(Command::Flush(done_tx)).is_ok() {
            // A dropped sender means the worker is gone; nothing left to wait for.
            let _ = done_rx.await;
        }
    }

    fn submit(&self, command: Command) {
        let Some(tx) = &self.tx else {
            tracing::warn!("durable writes are disabled; change kept in memory only");
            return;
        };
        if tx.send(command).is_err() {
            tracing::warn!("write-behind worker stopped; change kept in memory only");
        }
    }
}

async fn run(store: Arc<dyn KeyValueStore>, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Set { key, value } => {
                if let Err(err) = store.set(key, value).await {
                    tracing::warn!(%key, error = %err, "write-behind set failed");
                }
            }
            Command::Remove { key } => {
                if let Err(err) = store.remove(key).await {
                    tracing::warn!(%key, error = %err, "write-behind remove failed");
                }
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
