use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use models::{song::STORAGE_ID_FIELD, Song, SongPatch, StoredSong};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::songs::repository::{SongRepository, UpdateOutcome};

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed song repository; one collection, one command per call.
#[derive(Clone)]
pub struct MongoSongRepository {
    coll: Collection<Document>,
}

impl MongoSongRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self { coll: db.collection::<Document>(collection) }
    }

    /// Drop the collection. Used by tests that own a throwaway collection.
    pub async fn drop_collection(&self) -> Result<(), ServiceError> {
        self.coll.drop(None).await.map_err(map_mongo_err)
    }
}

fn is_duplicate_key(e: &MongoError) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

fn map_mongo_err(e: MongoError) -> ServiceError {
    if is_duplicate_key(&e) {
        ServiceError::Conflict("Song with this id already present".into())
    } else {
        ServiceError::Internal(e.to_string())
    }
}

/// Split `_id` off a raw document and decode the rest into a `Song`.
fn to_stored(mut raw: Document) -> Result<StoredSong, ServiceError> {
    let storage_id = match raw.remove(STORAGE_ID_FIELD) {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s,
        Some(other) => other.to_string(),
        None => return Err(ServiceError::Internal("document without _id".into())),
    };
    let song: Song = bson::from_document(raw).map_err(ServiceError::internal)?;
    Ok(StoredSong { storage_id, song })
}

fn id_filter(id: i64) -> Document {
    doc! { "id": id }
}

#[async_trait]
impl SongRepository for MongoSongRepository {
    async fn list(&self) -> Result<Vec<StoredSong>, ServiceError> {
        let cursor = self.coll.find(None, None).await.map_err(map_mongo_err)?;
        let raw: Vec<Document> = cursor.try_collect().await.map_err(map_mongo_err)?;
        raw.into_iter().map(to_stored).collect()
    }

    async fn find(&self, id: i64) -> Result<Option<StoredSong>, ServiceError> {
        self.coll
            .find_one(id_filter(id), None)
            .await
            .map_err(map_mongo_err)?
            .map(to_stored)
            .transpose()
    }

    #[instrument(skip(self, song), fields(id = song.id))]
    async fn insert(&self, song: Song) -> Result<String, ServiceError> {
        let raw = bson::to_document(&song).map_err(ServiceError::internal)?;
        let res = self.coll.insert_one(raw, None).await.map_err(map_mongo_err)?;
        Ok(match res.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        })
    }

    async fn update(&self, id: i64, patch: SongPatch) -> Result<UpdateOutcome, ServiceError> {
        let set = bson::to_document(&patch).map_err(ServiceError::internal)?;
        if set.is_empty() {
            // `$set: {}` is rejected by the server; report a match without modification instead
            let matched = self
                .coll
                .count_documents(id_filter(id), None)
                .await
                .map_err(map_mongo_err)?;
            return Ok(UpdateOutcome { matched, modified: 0 });
        }
        let res = self
            .coll
            .update_one(id_filter(id), doc! { "$set": set }, None)
            .await
            .map_err(map_mongo_err)?;
        Ok(UpdateOutcome { matched: res.matched_count, modified: res.modified_count })
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let res = self.coll.delete_one(id_filter(id), None).await.map_err(map_mongo_err)?;
        Ok(res.deleted_count > 0)
    }

    async fn ensure_indexes(&self) -> Result<(), ServiceError> {
        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).name("id_unique".to_string()).build())
            .build();
        let res = self.coll.create_index(index, None).await.map_err(map_mongo_err)?;
        info!(index = %res.index_name, "song indexes ensured");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_document_splits_storage_id() -> Result<(), anyhow::Error> {
        let oid = bson::oid::ObjectId::new();
        let raw = doc! { "_id": oid, "id": 3_i32, "title": "t", "year": 2001_i32 };
        let stored = to_stored(raw)?;
        assert_eq!(stored.storage_id, oid.to_hex());
        assert_eq!(stored.song.id, 3);
        assert_eq!(stored.song.title, Some(json!("t")));
        assert_eq!(stored.song.extra.get("year"), Some(&json!(2001)));
        assert!(!stored.song.extra.contains_key("_id"));
        Ok(())
    }

    #[test]
    fn non_string_fields_decode_from_raw_documents() -> Result<(), anyhow::Error> {
        let raw = doc! { "_id": bson::oid::ObjectId::new(), "id": 8_i64, "title": 5_i32, "lyrics": ["a", "b"] };
        let stored = to_stored(raw)?;
        assert_eq!(stored.song.title, Some(json!(5)));
        assert_eq!(stored.song.lyrics, Some(json!(["a", "b"])));
        Ok(())
    }

    #[test]
    fn patch_becomes_set_document_without_absent_fields() -> Result<(), anyhow::Error> {
        let patch: SongPatch = serde_json::from_value(json!({"lyrics": "la", "mood": "calm"}))?;
        let set = bson::to_document(&patch)?;
        assert_eq!(set, doc! { "lyrics": "la", "mood": "calm" });
        Ok(())
    }

    /// Round trip against a live server. Requires `MONGODB_SERVICE`; set `SKIP_DB_TESTS` to skip.
    #[tokio::test]
    async fn live_crud_round_trip() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let uri = match std::env::var("MONGODB_SERVICE") {
            Ok(uri) => uri,
            Err(_) => {
                eprintln!("MONGODB_SERVICE missing; skip live mongo test");
                return Ok(());
            }
        };
        let cfg = configs::MongoConfig {
            uri,
            database: "songs_test".into(),
            server_selection_timeout_secs: Some(3),
            ..Default::default()
        };
        let db = models::db::connect(&cfg).await?;
        let repo = MongoSongRepository::new(&db, &format!("songs_{}", uuid::Uuid::new_v4().simple()));
        repo.ensure_indexes().await?;

        let song: Song = serde_json::from_value(json!({"id": 1, "title": "a"}))?;
        let oid = repo.insert(song.clone()).await?;
        assert!(matches!(repo.insert(song).await, Err(ServiceError::Conflict(_))));

        let found = repo.find(1).await?.expect("inserted");
        assert_eq!(found.storage_id, oid);

        let patch: SongPatch = serde_json::from_value(json!({"title": "a"}))?;
        assert_eq!(repo.update(1, patch).await?, UpdateOutcome { matched: 1, modified: 0 });
        let patch: SongPatch = serde_json::from_value(json!({"title": "b"}))?;
        assert_eq!(repo.update(1, patch).await?, UpdateOutcome { matched: 1, modified: 1 });

        assert_eq!(repo.list().await?.len(), 1);
        assert!(repo.delete(1).await?);
        assert!(!repo.delete(1).await?);

        repo.drop_collection().await?;
        Ok(())
    }
}
