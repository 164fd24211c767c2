use async_trait::async_trait;
use models::{Song, SongPatch, StoredSong};

use crate::errors::ServiceError;

/// Counts reported by a `$set` update, mirroring the driver's `UpdateResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Repository abstraction over the song document collection.
#[async_trait]
pub trait SongRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<StoredSong>, ServiceError>;
    async fn find(&self, id: i64) -> Result<Option<StoredSong>, ServiceError>;
    /// Insert and return the storage id (hex).
    async fn insert(&self, song: Song) -> Result<String, ServiceError>;
    async fn update(&self, id: i64, patch: SongPatch) -> Result<UpdateOutcome, ServiceError>;
    /// Returns whether a document was deleted.
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;

    /// Create storage-side indexes. No-op for stores without them.
    async fn ensure_indexes(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// In-memory repository for tests and running without a database.
pub mod memory {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct MemorySongRepository {
        docs: RwLock<Vec<StoredSong>>,
    }

    impl MemorySongRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl SongRepository for MemorySongRepository {
        async fn list(&self) -> Result<Vec<StoredSong>, ServiceError> {
            Ok(self.docs.read().await.clone())
        }

        async fn find(&self, id: i64) -> Result<Option<StoredSong>, ServiceError> {
            Ok(self.docs.read().await.iter().find(|d| d.song.id == id).cloned())
        }

        async fn insert(&self, song: Song) -> Result<String, ServiceError> {
            let mut docs = self.docs.write().await;
            // 与 MongoDB 上 id 唯一索引的行为一致
            if docs.iter().any(|d| d.song.id == song.id) {
                return Err(ServiceError::already_present("Song", song.id));
            }
            let storage_id = ObjectId::new().to_hex();
            docs.push(StoredSong { storage_id: storage_id.clone(), song });
            Ok(storage_id)
        }

        async fn update(&self, id: i64, patch: SongPatch) -> Result<UpdateOutcome, ServiceError> {
            let mut docs = self.docs.write().await;
            match docs.iter_mut().find(|d| d.song.id == id) {
                Some(doc) => {
                    let modified = u64::from(doc.song.apply(patch));
                    Ok(UpdateOutcome { matched: 1, modified })
                }
                None => Ok(UpdateOutcome::default()),
            }
        }

        async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
            let mut docs = self.docs.write().await;
            let before = docs.len();
            docs.retain(|d| d.song.id != id);
            Ok(docs.len() != before)
        }
    }
}
