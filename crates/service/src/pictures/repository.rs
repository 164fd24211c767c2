use async_trait::async_trait;
use models::{Picture, PicturePatch};

use crate::errors::ServiceError;

/// Read/write capability over the picture collection. Handlers depend on this
/// trait, never on the concrete store.
#[async_trait]
pub trait PictureRepository: Send + Sync {
    /// All pictures in insertion order.
    async fn list(&self) -> Result<Vec<Picture>, ServiceError>;
    async fn get(&self, id: i64) -> Result<Option<Picture>, ServiceError>;
    /// Append; `Conflict` when the id is already present.
    async fn create(&self, picture: Picture) -> Result<Picture, ServiceError>;
    /// Shallow merge into the existing record; `NotFound` when absent.
    async fn update(&self, id: i64, patch: PicturePatch) -> Result<Picture, ServiceError>;
    /// `NotFound` when absent.
    async fn delete(&self, id: i64) -> Result<(), ServiceError>;
    async fn count(&self) -> Result<usize, ServiceError>;
}
