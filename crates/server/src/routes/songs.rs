use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use models::{Song, SongDocument, SongPatch};
use serde::{Deserialize, Serialize};
use service::songs::SongUpdate;

use crate::{errors::JsonApiError, state::AppState};

pub const UNCHANGED_MESSAGE: &str = "Song found, but nothing updated";

#[derive(Debug, Serialize, Deserialize)]
pub struct SongList {
    pub songs: Vec<SongDocument>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsertedId {
    pub inserted_id: i64,
}

/// `PUT /song/{id}` answers either the re-fetched document or a plain message.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdateSongResponse {
    Updated(SongDocument),
    Unchanged { message: String },
}

#[utoipa::path(get, path = "/song", tag = "songs", responses(
    (status = 200, description = "All songs", body = crate::openapi::SongListDoc),
    (status = 500, description = "Storage failure"),
))]
pub async fn list(State(state): State<AppState>) -> Result<Json<SongList>, JsonApiError> {
    let songs = state
        .songs
        .list()
        .await?
        .into_iter()
        .map(|s| s.into_plain())
        .collect();
    Ok(Json(SongList { songs }))
}

#[utoipa::path(get, path = "/song/{id}", tag = "songs",
    params(("id" = i64, Path, description = "Application id")),
    responses(
        (status = 200, description = "Song", body = crate::openapi::SongDoc),
        (status = 404, description = "Song with id not found"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<SongDocument>, JsonApiError> {
    let Path(id) = path?;
    Ok(Json(state.songs.get(id).await?.into_plain()))
}

#[utoipa::path(post, path = "/song", tag = "songs",
    request_body = crate::openapi::SongInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::InsertedIdDoc),
        (status = 409, description = "Song with this id already present"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Song>, JsonRejection>,
) -> Result<(StatusCode, Json<InsertedId>), JsonApiError> {
    let Json(song) = payload?;
    let inserted_id = state.songs.create(song).await?;
    Ok((StatusCode::CREATED, Json(InsertedId { inserted_id })))
}

#[utoipa::path(put, path = "/song/{id}", tag = "songs",
    params(("id" = i64, Path, description = "Application id")),
    request_body = crate::openapi::SongPatchDoc,
    responses(
        (status = 200, description = "Updated song with `_id` as {\"$oid\": ...}, or an unchanged message"),
        (status = 400, description = "Patch tries to change `id` or `_id`"),
        (status = 404, description = "Song not found"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SongPatch>, JsonRejection>,
) -> Result<Json<UpdateSongResponse>, JsonApiError> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let body = match state.songs.update(id, patch).await? {
        SongUpdate::Updated(stored) => UpdateSongResponse::Updated(stored.into_extended()),
        SongUpdate::Unchanged => UpdateSongResponse::Unchanged { message: UNCHANGED_MESSAGE.to_string() },
    };
    Ok(Json(body))
}

#[utoipa::path(delete, path = "/song/{id}", tag = "songs",
    params(("id" = i64, Path, description = "Application id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Song not found"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    state.songs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
