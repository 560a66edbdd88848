use std::fmt::{self, Display};
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;

use cnidarium::{Snapshot, StateDelta, StateRead, StateWrite, Storage};
use color_eyre::{Report, eyre::eyre};
use futures::{Future, Stream, StreamExt};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use crate::State;

/// Default bound on concurrent lookups fanned out by a single query.
pub const DEFAULT_QUERY_CONCURRENCY: usize = 16;

/// Handle to the persistent store and the block currently being built on top of it.
///
/// Cloning is cheap; every clone shares the same storage and in-flight state.
#[derive(Clone)]
pub struct Store {
    storage: Storage,
    pub(crate) state: Arc<RwLock<State<StateDelta<Snapshot>>>>,
    query_concurrency: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Substore {
    /// Chain bookkeeping: parameters, height, time, counters, the checkpoint digest.
    Internal,
    /// The entity collections.
    Documents,
}

impl Display for Substore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Substore::Internal => write!(f, "internal"),
            Substore::Documents => write!(f, "documents"),
        }
    }
}

impl Substore {
    pub fn prefix(&self, key: &str) -> String {
        format!("{}/{}", self, key)
    }

    pub fn prefix_bytes(&self, key: &[u8]) -> Vec<u8> {
        let mut prefix = format!("{}/", self).into_bytes();
        prefix.extend_from_slice(key);
        prefix
    }

    pub fn unprefix<'a>(&self, prefixed_key: &'a str) -> Option<&'a str> {
        let prefix = format!("{}/", self);
        prefixed_key.strip_prefix(&prefix)
    }

    pub fn unprefix_bytes<'a>(&self, prefixed_key: &'a [u8]) -> Option<&'a [u8]> {
        let prefix = format!("{}/", self).into_bytes();
        prefixed_key.strip_prefix(prefix.as_slice())
    }
}

impl Store {
    pub async fn init(path: PathBuf) -> Result<Self, Report> {
        const SUBSTORES: [&str; 2] = ["internal", "documents"];
        let storage = Storage::load(path, SUBSTORES.map(Into::into).to_vec())
            .await
            .map_err(|e| eyre!(e))?;
        Ok(Self::new(storage))
    }

    fn new(storage: Storage) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::new(StateDelta::new(
                storage.latest_snapshot(),
            )))),
            storage,
            query_concurrency: DEFAULT_QUERY_CONCURRENCY,
        }
    }

    /// Set the bound on concurrent lookups made while answering a single query.
    pub fn with_query_concurrency(mut self, query_concurrency: usize) -> Self {
        self.query_concurrency = query_concurrency.max(1);
        self
    }

    pub fn query_concurrency(&self) -> usize {
        self.query_concurrency
    }

    /// A read-only view of the latest committed state, independent of the block in progress.
    pub fn committed(&self) -> State<StateDelta<Snapshot>> {
        State::new(StateDelta::new(self.storage.latest_snapshot()))
    }

    /// Record the checkpoint digest and commit all pending changes to the underlying storage.
    pub async fn commit(&mut self) -> Result<[u8; 8], Report> {
        let mut state = self.state.write().await;

        let checkpoint = state.prepare_commit().await?;

        // Pull out the current delta and replace it with a new, empty one:
        let delta = mem::replace(
            &mut state.store,
            StateDelta::new(self.storage.latest_snapshot()),
        );

        // Commit the pulled-out delta to storage:
        self.storage
            .commit(delta)
            .await
            .map_err(|e| eyre!(e))?;

        // Update the delta to use the new latest snapshot:
        state.store = StateDelta::new(self.storage.latest_snapshot());

        // NOTE: without the final step above, the delta would continue to refer to the snapshot
        // *before* the commit, which would lead to errors on subsequent reads/writes.

        Ok(checkpoint)
    }
}

/// Typed JSON access to any cnidarium state.
pub trait StateReadExt: StateRead {
    /// Get a value from the state by key, decoding it from JSON.
    fn get<V: DeserializeOwned + Send>(
        &self,
        substore: Substore,
        key: &str,
    ) -> impl Future<Output = Result<Option<V>, Report>> + Send {
        let bytes = self.get_raw(&substore.prefix(key));
        async move {
            match bytes.await.map_err(|e| eyre!(e))? {
                Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
                None => Ok(None),
            }
        }
    }

    /// Get a stream over all key-value pairs in the state with the given prefix, decoding the
    /// values from JSON.
    fn prefix<V: DeserializeOwned + Send>(
        &self,
        substore: Substore,
        prefix: &str,
    ) -> impl Stream<Item = Result<(String, V), Report>> + Send {
        self.prefix_raw(&substore.prefix(prefix))
            .map(move |res| match res {
                Ok((key, bytes)) => {
                    let v = serde_json::from_slice(&bytes)?;
                    Ok((
                        substore
                            .unprefix(&key)
                            .ok_or_else(|| eyre!("key {key} from wrong substore"))?
                            .to_string(),
                        v,
                    ))
                }
                Err(e) => Err(eyre!(e)),
            })
    }

    /// Get a value from the index by key, decoding it from JSON.
    fn index_get<V: DeserializeOwned + Send>(
        &self,
        substore: Substore,
        key: &[u8],
    ) -> impl Future<Output = Result<Option<V>, Report>> + Send {
        let bytes = self.nonverifiable_get_raw(&substore.prefix_bytes(key));
        async move {
            match bytes.await.map_err(|e| eyre!(e))? {
                Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
                None => Ok(None),
            }
        }
    }

    /// Get a stream over all keys and values in the index with the given prefix, decoding the
    /// values from JSON.
    fn index_prefix<V: DeserializeOwned + Send>(
        &self,
        substore: Substore,
        prefix: &[u8],
    ) -> impl Stream<Item = Result<(Vec<u8>, V), Report>> + Send {
        self.nonverifiable_prefix_raw(&substore.prefix_bytes(prefix))
            .map(move |res| match res {
                Ok((key, bytes)) => {
                    let v = serde_json::from_slice(&bytes)?;
                    Ok((
                        substore
                            .unprefix_bytes(&key)
                            .ok_or_else(|| eyre!("index key from wrong substore"))?
                            .to_vec(),
                        v,
                    ))
                }
                Err(e) => Err(eyre!(e)),
            })
    }
}

impl<T: StateRead + ?Sized> StateReadExt for T {}

/// Typed JSON writes to any cnidarium state.
pub trait StateWriteExt: StateWrite {
    /// Set a value in the state by key, encoding it as JSON.
    fn put<V: Serialize>(&mut self, substore: Substore, key: &str, value: &V) -> Result<(), Report> {
        let bytes = serde_json::to_vec(value)?;
        self.put_raw(substore.prefix(key), bytes);
        Ok(())
    }

    /// Delete a value from the state by key.
    fn remove(&mut self, substore: Substore, key: &str) {
        StateWrite::delete(self, substore.prefix(key));
    }

    /// Set a value in the index by key, encoding it as JSON.
    fn index_put<V: Serialize>(
        &mut self,
        substore: Substore,
        key: &[u8],
        value: &V,
    ) -> Result<(), Report> {
        let bytes = serde_json::to_vec(value)?;
        self.nonverifiable_put_raw(substore.prefix_bytes(key), bytes);
        Ok(())
    }

    /// Delete a value from the index by key.
    fn index_remove(&mut self, substore: Substore, key: &[u8]) {
        self.nonverifiable_delete(substore.prefix_bytes(key));
    }
}

impl<T: StateWrite + ?Sized> StateWriteExt for T {}
