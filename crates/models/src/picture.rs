use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;
use crate::{merge_extra, merge_opt, present};

/// A picture from the seed file. Unknown fields are kept verbatim in `extra`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Picture {
    pub id: i64,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub pic_url: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event_country: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event_state: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event_city: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event_date: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Picture {
    /// Bare record with only an id; handy for tests and fixtures.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            pic_url: None,
            event_country: None,
            event_state: None,
            event_city: None,
            event_date: None,
            extra: Map::new(),
        }
    }

    /// Shallow merge: supplied fields win, everything else is kept.
    pub fn apply(&mut self, patch: PicturePatch) {
        merge_opt(&mut self.pic_url, patch.pic_url);
        merge_opt(&mut self.event_country, patch.event_country);
        merge_opt(&mut self.event_state, patch.event_state);
        merge_opt(&mut self.event_city, patch.event_city);
        merge_opt(&mut self.event_date, patch.event_date);
        merge_extra(&mut self.extra, patch.extra);
    }
}

/// Body of `PUT /picture/{id}`. Absent fields are left as is; a supplied value,
/// `null` included, replaces the stored one.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PicturePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub pic_url: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event_country: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event_state: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event_city: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event_date: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PicturePatch {
    /// A patch may repeat the target id but never move the record to another id.
    pub fn validate_for(&self, id: i64) -> Result<(), ModelError> {
        match self.id {
            Some(other) if other != id => Err(ModelError::Validation(format!(
                "patch id {other} does not match picture id {id}"
            ))),
            _ => Ok(()),
        }
    }
}
