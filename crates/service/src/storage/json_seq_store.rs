use std::{path::PathBuf, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::{info, warn};

use crate::errors::ServiceError;

/// Ordered sequence of records seeded from a JSON array file.
///
/// The sequence is held in memory for the process lifetime. When `persist` is set
/// each successful mutation is written back to the seed file before it becomes
/// visible; otherwise mutations are memory-only and vanish on restart.
pub struct JsonSeqStore<T> {
    inner: RwLock<Vec<T>>,
    backing: Option<PathBuf>,
}

impl<T> JsonSeqStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Load the seed file. A missing file yields an empty sequence; a malformed one is an error.
    pub async fn open<P: Into<PathBuf>>(path: P, persist: bool) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        let items: Vec<T> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Internal(format!("cannot parse {}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %file_path.display(), "seed file missing; starting empty");
                Vec::new()
            }
            Err(e) => {
                return Err(ServiceError::Internal(format!("cannot read {}: {e}", file_path.display())))
            }
        };
        info!(path = %file_path.display(), count = items.len(), persist, "seed loaded");
        Ok(Arc::new(Self { inner: RwLock::new(items), backing: persist.then_some(file_path) }))
    }

    /// Memory-only store, no file involved.
    pub fn from_items(items: Vec<T>) -> Arc<Self> {
        Arc::new(Self { inner: RwLock::new(items), backing: None })
    }

    /// Clone of the whole sequence in order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.read().await.clone()
    }

    /// First element matching `pred`.
    pub async fn find<F>(&self, pred: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.inner.read().await.iter().find(|item| pred(item)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Run a mutation under the write lock. With write-back enabled the mutation is
    /// applied to a copy, saved, then swapped in, so a failed save leaves memory untouched.
    pub async fn update_seq<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let mut guard = self.inner.write().await;
        match &self.backing {
            None => f(&mut *guard),
            Some(path) => {
                let mut next = (*guard).clone();
                let out = f(&mut next)?;
                let data = serde_json::to_vec_pretty(&next).map_err(ServiceError::internal)?;
                fs::write(path, data).await.map_err(|e| {
                    ServiceError::Internal(format!("cannot write {}: {e}", path.display()))
                })?;
                *guard = next;
                Ok(out)
            }
        }
    }
}
