use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::{Picture, PicturePatch};
use tracing::info;

use crate::errors::ServiceError;
use crate::pictures::repository::PictureRepository;
use crate::storage::json_seq_store::JsonSeqStore;

const ENTITY: &str = "Picture";

/// Picture collection seeded from a JSON file; see [`JsonSeqStore`] for write-back.
#[derive(Clone)]
pub struct PictureStore {
    seq: Arc<JsonSeqStore<Picture>>,
}

impl PictureStore {
    pub async fn open<P: Into<PathBuf>>(path: P, persist: bool) -> Result<Arc<Self>, ServiceError> {
        let seq = JsonSeqStore::open(path, persist).await?;
        Ok(Arc::new(Self { seq }))
    }

    pub fn from_items(items: Vec<Picture>) -> Arc<Self> {
        Arc::new(Self { seq: JsonSeqStore::from_items(items) })
    }
}

#[async_trait]
impl PictureRepository for PictureStore {
    async fn list(&self) -> Result<Vec<Picture>, ServiceError> {
        Ok(self.seq.snapshot().await)
    }

    async fn get(&self, id: i64) -> Result<Option<Picture>, ServiceError> {
        Ok(self.seq.find(|p| p.id == id).await)
    }

    async fn create(&self, picture: Picture) -> Result<Picture, ServiceError> {
        // 查重与追加在同一把写锁内完成
        let created = self
            .seq
            .update_seq(|seq| {
                if seq.iter().any(|p| p.id == picture.id) {
                    return Err(ServiceError::already_present(ENTITY, picture.id));
                }
                seq.push(picture.clone());
                Ok(picture)
            })
            .await?;
        info!(id = created.id, "picture created");
        Ok(created)
    }

    async fn update(&self, id: i64, patch: PicturePatch) -> Result<Picture, ServiceError> {
        patch.validate_for(id)?;
        self.seq
            .update_seq(|seq| {
                let existing = seq
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| ServiceError::not_found(ENTITY))?;
                existing.apply(patch);
                Ok(existing.clone())
            })
            .await
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.seq
            .update_seq(|seq| {
                let pos = seq
                    .iter()
                    .position(|p| p.id == id)
                    .ok_or_else(|| ServiceError::not_found(ENTITY))?;
                seq.remove(pos);
                Ok(())
            })
            .await?;
        info!(id, "picture deleted");
        Ok(())
    }

    async fn count(&self) -> Result<usize, ServiceError> {
        Ok(self.seq.len().await)
    }
}
