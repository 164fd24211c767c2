//! Record types shared by the service and HTTP layers.
//!
//! Both collections carry a caller-supplied integer `id` plus arbitrary extra
//! fields. Known fields are named so patches merge field by field, but their
//! values stay untyped JSON.

pub mod errors;
pub mod db;
pub mod picture;
pub mod song;

pub use picture::{Picture, PicturePatch};
pub use song::{Song, SongDocument, SongPatch, StorageId, StoredSong};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Shallow overwrite of `target` with `src`; returns whether any value changed.
pub(crate) fn merge_extra(target: &mut Map<String, Value>, src: Map<String, Value>) -> bool {
    let mut changed = false;
    for (k, v) in src {
        if target.get(&k) != Some(&v) {
            target.insert(k, v);
            changed = true;
        }
    }
    changed
}

/// Field deserializer that keeps an explicit `null` as `Some(Value::Null)`;
/// only an absent field (via `#[serde(default)]`) becomes `None`.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Overwrite `slot` when the patch supplies a value (`null` included); returns whether it changed.
pub(crate) fn merge_opt<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) if slot.as_ref() != Some(&v) => {
            *slot = Some(v);
            true
        }
        _ => false,
    }
}
