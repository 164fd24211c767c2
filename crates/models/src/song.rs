use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;
use crate::{merge_extra, merge_opt, present};

/// Field name MongoDB uses for the storage-assigned identifier.
pub const STORAGE_ID_FIELD: &str = "_id";

/// A song as the application sees it, without the storage id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Song {
    pub id: i64,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Song {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.extra.contains_key(STORAGE_ID_FIELD) {
            return Err(ModelError::Validation("`_id` is assigned by storage".into()));
        }
        Ok(())
    }

    /// `$set` semantics; returns whether any field actually changed.
    pub fn apply(&mut self, patch: SongPatch) -> bool {
        let mut changed = false;
        changed |= merge_opt(&mut self.title, patch.title);
        changed |= merge_opt(&mut self.lyrics, patch.lyrics);
        changed |= merge_extra(&mut self.extra, patch.extra);
        changed
    }
}

/// Body of `PUT /song/{id}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SongPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SongPatch {
    pub fn validate_for(&self, id: i64) -> Result<(), ModelError> {
        if let Some(other) = self.id.filter(|other| *other != id) {
            return Err(ModelError::Validation(format!(
                "patch id {other} does not match song id {id}"
            )));
        }
        if self.extra.contains_key(STORAGE_ID_FIELD) {
            return Err(ModelError::Validation("`_id` cannot be updated".into()));
        }
        Ok(())
    }

    /// True when the patch would not `$set` anything besides the (unchanged) id.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.lyrics.is_none() && self.extra.is_empty()
    }
}

/// A song together with the hex form of its storage id.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredSong {
    pub storage_id: String,
    pub song: Song,
}

/// How `_id` is rendered in a response: list/get use the bare hex string,
/// update answers with the extended-JSON wrapper `{"$oid": "..."}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StorageId {
    Plain(String),
    Extended {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl StorageId {
    pub fn hex(&self) -> &str {
        match self {
            StorageId::Plain(s) => s,
            StorageId::Extended { oid } => oid,
        }
    }
}

/// Response shape of a song: the record plus its rendered `_id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SongDocument {
    #[serde(rename = "_id")]
    pub storage_id: StorageId,
    #[serde(flatten)]
    pub song: Song,
}

impl StoredSong {
    pub fn into_plain(self) -> SongDocument {
        SongDocument { storage_id: StorageId::Plain(self.storage_id), song: self.song }
    }

    pub fn into_extended(self) -> SongDocument {
        SongDocument { storage_id: StorageId::Extended { oid: self.storage_id }, song: self.song }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored() -> StoredSong {
        StoredSong {
            storage_id: "65a1f0c2e4b0a1b2c3d4e5f6".into(),
            song: serde_json::from_value(json!({"id": 7, "title": "t", "lyrics": "l"})).unwrap(),
        }
    }

    #[test]
    fn plain_rendering_uses_hex_string() {
        let doc = serde_json::to_value(stored().into_plain()).unwrap();
        assert_eq!(
            doc,
            json!({"_id": "65a1f0c2e4b0a1b2c3d4e5f6", "id": 7, "title": "t", "lyrics": "l"})
        );
    }

    #[test]
    fn extended_rendering_wraps_oid() {
        let doc = serde_json::to_value(stored().into_extended()).unwrap();
        assert_eq!(doc["_id"], json!({"$oid": "65a1f0c2e4b0a1b2c3d4e5f6"}));
        let back: SongDocument = serde_json::from_value(doc).unwrap();
        assert_eq!(back.storage_id.hex(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert!(back.song.extra.is_empty());
    }

    #[test]
    fn apply_reports_changes() {
        let mut song = stored().song;
        let noop: SongPatch = serde_json::from_value(json!({"title": "t"})).unwrap();
        assert!(!song.apply(noop));
        let real: SongPatch = serde_json::from_value(json!({"lyrics": "new", "year": 1999})).unwrap();
        assert!(song.apply(real));
        assert_eq!(song.lyrics, Some(json!("new")));
        assert_eq!(song.extra.get("year"), Some(&json!(1999)));
        assert_eq!(song.title, Some(json!("t")));
    }

    #[test]
    fn patch_validation() {
        let moved: SongPatch = serde_json::from_value(json!({"id": 8})).unwrap();
        assert!(moved.validate_for(7).is_err());
        let oid: SongPatch = serde_json::from_value(json!({"_id": "x"})).unwrap();
        assert!(oid.validate_for(7).is_err());
        let same: SongPatch = serde_json::from_value(json!({"id": 7})).unwrap();
        assert!(same.validate_for(7).is_ok());
        assert!(same.is_empty());
    }

    #[test]
    fn any_json_value_is_accepted_for_known_fields() {
        let song: Song =
            serde_json::from_value(json!({"id": 1, "title": 5, "lyrics": ["a", "b"]})).unwrap();
        assert_eq!(song.title, Some(json!(5)));
        assert_eq!(
            serde_json::to_value(&song).unwrap(),
            json!({"id": 1, "title": 5, "lyrics": ["a", "b"]})
        );

        let mut song = song;
        let clear: SongPatch = serde_json::from_value(json!({"title": null})).unwrap();
        assert!(!clear.is_empty());
        assert!(song.apply(clear));
        assert_eq!(song.title, Some(Value::Null));
    }

    #[test]
    fn client_supplied_storage_id_is_rejected() {
        let song: Song = serde_json::from_value(json!({"id": 1, "_id": "abc"})).unwrap();
        assert!(song.validate().is_err());
    }
}
