//! Ordered storage worker.
//!
//! Every [`Storage`] handle talks to one background task that owns the
//! backend. Commands are applied strictly in send order, which gives the
//! stores write-behind persistence without a later snapshot ever being
//! overwritten by an earlier one.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};

use super::{KeyValueStore, StorageError};

type Reply<T> = oneshot::Sender<Result<T, StorageError>>;

enum Command {
    Get {
        key: String,
        reply: Reply<Option<String>>,
    },
    Set {
        key: String,
        value: String,
        reply: Option<Reply<()>>,
    },
    Remove {
        key: String,
        reply: Option<Reply<()>>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
}

/// Cheaply cloneable handle to a storage worker.
#[derive(Debug, Clone)]
pub struct Storage {
    name: &'static str,
    tx: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get { key, .. } => write!(f, "Get({key})"),
            Self::Set { key, .. } => write!(f, "Set({key})"),
            Self::Remove { key, .. } => write!(f, "Remove({key})"),
            Self::Flush { .. } => write!(f, "Flush"),
        }
    }
}

impl Storage {
    /// Spawn a worker owning `backend`.
    ///
    /// `name` labels log lines (`local`, `secure`). Must be called from
    /// within a Tokio runtime. The worker exits once every handle is dropped.
    pub fn spawn<S: KeyValueStore>(name: &'static str, backend: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(name, backend, rx));
        Self { name, tx }
    }

    /// Label given at spawn time.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Read a raw value.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or `StorageError::Closed` if the worker is gone.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Get {
            key: key.to_owned(),
            reply,
        })?;
        rx.await.map_err(|_| StorageError::Closed)?
    }

    /// Read and decode a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a blob that does not decode
    /// as `T`, in addition to the errors of [`Storage::get`].
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Write a raw value and wait for the backend to apply it.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or `StorageError::Closed` if the worker is gone.
    pub async fn set(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Set {
            key: key.to_owned(),
            value: value.into(),
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| StorageError::Closed)?
    }

    /// Encode `value` as JSON, write it and wait for the backend to apply it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails, in addition to
    /// the errors of [`Storage::set`].
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw).await
    }

    /// Delete a value and wait for the backend to apply it.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or `StorageError::Closed` if the worker is gone.
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Remove {
            key: key.to_owned(),
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| StorageError::Closed)?
    }

    /// Snapshot `value` as JSON now and write it in the background.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn save_in_background<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(storage = self.name, key, error = %e, "Failed to encode snapshot");
                return;
            }
        };
        let sent = self.send(Command::Set {
            key: key.to_owned(),
            value: raw,
            reply: None,
        });
        if sent.is_err() {
            tracing::warn!(storage = self.name, key, "Storage worker closed, write dropped");
        }
    }

    /// Delete a value in the background. Failures are logged.
    pub fn remove_in_background(&self, key: &str) {
        let sent = self.send(Command::Remove {
            key: key.to_owned(),
            reply: None,
        });
        if sent.is_err() {
            tracing::warn!(storage = self.name, key, "Storage worker closed, delete dropped");
        }
    }

    /// Wait until every command sent before this call has been applied.
    pub async fn flush(&self) {
        let (reply, rx) = oneshot::channel();
        if self.send(Command::Flush { reply }).is_ok() {
            let _ = rx.await;
        }
    }

    fn send(&self, command: Command) -> Result<(), StorageError> {
        self.tx.send(command).map_err(|_| StorageError::Closed)
    }
}

async fn run<S: KeyValueStore>(
    name: &'static str,
    backend: S,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = rx.recv().await {
        tracing::trace!(storage = name, ?command, "Applying storage command");
        match command {
            Command::Get { key, reply } => {
                let _ = reply.send(backend.get(&key).await);
            }
            Command::Set { key, value, reply } => {
                let result = backend.set(&key, value).await;
                finish(name, &key, result, reply);
            }
            Command::Remove { key, reply } => {
                let result = backend.remove(&key).await;
                finish(name, &key, result, reply);
            }
            Command::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }
    tracing::debug!(storage = name, "Storage worker stopped");
}

/// Hand the result to a waiting caller, or log it for background writes.
fn finish(name: &'static str, key: &str, result: Result<(), StorageError>, reply: Option<Reply<()>>) {
    match (reply, result) {
        (Some(reply), result) => {
            let _ = reply.send(result);
        }
        (None, Err(e)) => {
            tracing::warn!(storage = name, key, error = %e, "Background write failed");
        }
        (None, Ok(())) => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    /// Backend whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk full").into())
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[tokio::test]
    async fn test_background_writes_apply_in_order() {
        let backend = MemoryStore::new();
        let storage = Storage::spawn("local", backend.clone());

        for n in 0..50 {
            storage.save_in_background("cart", &n);
        }
        storage.flush().await;

        assert_eq!(backend.peek("cart").as_deref(), Some("49"));
    }

    #[tokio::test]
    async fn test_get_observes_earlier_background_write() {
        let storage = Storage::spawn("local", MemoryStore::new());
        storage.save_in_background("favorites", &["1", "2"]);

        let ids: Vec<String> = storage.get_json("favorites").await.unwrap().unwrap();
        assert_eq!(ids, ["1", "2"]);
    }

    #[tokio::test]
    async fn test_awaited_write_reports_backend_error() {
        let storage = Storage::spawn("local", BrokenStore);
        let err = storage.set("user", "{}").await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[tokio::test]
    async fn test_background_failure_is_swallowed() {
        let storage = Storage::spawn("local", BrokenStore);
        storage.save_in_background("cart", &Vec::<u32>::new());
        storage.remove_in_background("cart");
        storage.flush().await;

        // Worker is still alive after the failures.
        assert_eq!(storage.get("cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_serialization_error() {
        let backend = MemoryStore::new();
        backend.insert("orders", "{not json");
        let storage = Storage::spawn("local", backend);

        let err = storage.get_json::<Vec<u32>>("orders").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
