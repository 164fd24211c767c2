use std::sync::Arc;

use models::{Song, SongPatch, StoredSong};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::songs::repository::SongRepository;

/// Result of `PUT /song/{id}` when the song exists.
#[derive(Debug, Clone, PartialEq)]
pub enum SongUpdate {
    /// Re-fetched document after a modifying `$set`.
    Updated(StoredSong),
    /// Matched, but the patch changed nothing.
    Unchanged,
}

/// Application service encapsulating song business rules on top of a repository.
#[derive(Clone)]
pub struct SongService {
    repo: Arc<dyn SongRepository>,
}

impl SongService {
    pub fn new(repo: Arc<dyn SongRepository>) -> Self { Self { repo } }

    pub async fn list(&self) -> Result<Vec<StoredSong>, ServiceError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: i64) -> Result<StoredSong, ServiceError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Song with id not found".into()))
    }

    /// Insert unless the application id is taken; returns that id.
    #[instrument(skip(self, song), fields(id = song.id))]
    pub async fn create(&self, song: Song) -> Result<i64, ServiceError> {
        song.validate()?;
        let id = song.id;
        if self.repo.find(id).await?.is_some() {
            return Err(ServiceError::already_present("Song", id));
        }
        let storage_id = self.repo.insert(song).await?;
        info!(id, %storage_id, "song created");
        Ok(id)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: SongPatch) -> Result<SongUpdate, ServiceError> {
        patch.validate_for(id)?;
        if self.repo.find(id).await?.is_none() {
            return Err(ServiceError::not_found("Song"));
        }
        if patch.is_empty() {
            return Ok(SongUpdate::Unchanged);
        }
        let outcome = self.repo.update(id, patch).await?;
        if outcome.matched == 0 {
            // deleted between the existence check and the update
            warn!(id, "song vanished before update");
            return Err(ServiceError::not_found("Song"));
        }
        if outcome.modified == 0 {
            return Ok(SongUpdate::Unchanged);
        }
        let updated = self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found("Song"))?;
        Ok(SongUpdate::Updated(updated))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if self.repo.delete(id).await? {
            info!(id, "song deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("Song"))
        }
    }

    /// Best effort; failures are logged and never fatal.
    pub async fn ensure_indexes(&self) {
        if let Err(e) = self.repo.ensure_indexes().await {
            warn!(error = %e, "could not ensure song indexes; duplicate ids rely on the pre-insert check");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::songs::repository::memory::MemorySongRepository;
    use serde_json::json;

    fn service() -> SongService {
        SongService::new(Arc::new(MemorySongRepository::new()))
    }

    fn song(v: serde_json::Value) -> Song {
        serde_json::from_value(v).expect("song")
    }

    fn patch(v: serde_json::Value) -> SongPatch {
        serde_json::from_value(v).expect("patch")
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() -> Result<(), anyhow::Error> {
        let svc = service();
        let created = svc.create(song(json!({"id": 5, "title": "x", "lyrics": "y"}))).await?;
        assert_eq!(created, 5);
        let stored = svc.get(5).await?;
        assert_eq!(stored.song, song(json!({"id": 5, "title": "x", "lyrics": "y"})));
        assert_eq!(stored.storage_id.len(), 24);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_without_touching_stored() -> Result<(), anyhow::Error> {
        let svc = service();
        svc.create(song(json!({"id": 1, "title": "first"}))).await?;
        let res = svc.create(song(json!({"id": 1, "title": "second"}))).await;
        match res {
            Err(ServiceError::Conflict(msg)) => assert_eq!(msg, "Song with id 1 already present"),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(svc.get(1).await?.song.title, Some(json!("first")));
        assert_eq!(svc.list().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn update_paths() -> Result<(), anyhow::Error> {
        let svc = service();
        assert!(matches!(svc.update(1, patch(json!({"title": "b"}))).await, Err(ServiceError::NotFound(_))));

        svc.create(song(json!({"id": 1, "title": "a"}))).await?;
        assert_eq!(svc.update(1, patch(json!({"title": "a"}))).await?, SongUpdate::Unchanged);
        assert_eq!(svc.update(1, patch(json!({}))).await?, SongUpdate::Unchanged);

        match svc.update(1, patch(json!({"title": "b"}))).await? {
            SongUpdate::Updated(stored) => {
                assert_eq!(stored.song.title, Some(json!("b")));
                assert_eq!(stored.song.id, 1);
            }
            SongUpdate::Unchanged => panic!("expected a modification"),
        }

        assert!(matches!(svc.update(1, patch(json!({"id": 2}))).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() -> Result<(), anyhow::Error> {
        let svc = service();
        assert!(matches!(svc.delete(9).await, Err(ServiceError::NotFound(_))));
        svc.create(song(json!({"id": 9}))).await?;
        svc.delete(9).await?;
        assert!(matches!(svc.get(9).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
