use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use common::types::Count;
use models::{Picture, PicturePatch};
use service::errors::ServiceError;
use tracing::info;

use crate::{errors::JsonApiError, state::AppState};

/// Current number of pictures. An empty collection counts as 0; the in-memory
/// list is always readable once startup has loaded it.
#[utoipa::path(get, path = "/count", tag = "pictures", responses(
    (status = 200, description = "Number of pictures", body = crate::openapi::CountResponse),
))]
pub async fn count(State(state): State<AppState>) -> Result<Json<Count>, JsonApiError> {
    let length = state.pictures.count().await?;
    Ok(Json(Count { length }))
}

#[utoipa::path(get, path = "/picture", tag = "pictures", responses(
    (status = 200, description = "All pictures in insertion order", body = [crate::openapi::PictureDoc]),
))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Picture>>, JsonApiError> {
    Ok(Json(state.pictures.list().await?))
}

#[utoipa::path(get, path = "/picture/{id}", tag = "pictures",
    params(("id" = i64, Path, description = "Application id")),
    responses(
        (status = 200, description = "Picture", body = crate::openapi::PictureDoc),
        (status = 404, description = "Picture not found"),
    )
)]
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Picture>, JsonApiError> {
    let Path(id) = path?;
    state
        .pictures
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ServiceError::not_found("Picture").into())
}

#[utoipa::path(post, path = "/picture", tag = "pictures",
    request_body = crate::openapi::PictureDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::PictureDoc),
        (status = 409, description = "Picture with this id already present"),
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Picture>, JsonRejection>,
) -> Result<(StatusCode, Json<Picture>), JsonApiError> {
    let Json(picture) = payload?;
    let created = state.pictures.create(picture).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/picture/{id}", tag = "pictures",
    params(("id" = i64, Path, description = "Application id")),
    request_body = crate::openapi::PicturePatchDoc,
    responses(
        (status = 200, description = "Merged picture", body = crate::openapi::PictureDoc),
        (status = 400, description = "Patch tries to change the id"),
        (status = 404, description = "Picture not found"),
    )
)]
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PicturePatch>, JsonRejection>,
) -> Result<Json<Picture>, JsonApiError> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let merged = state.pictures.update(id, patch).await?;
    info!(id, "picture updated");
    Ok(Json(merged))
}

#[utoipa::path(delete, path = "/picture/{id}", tag = "pictures",
    params(("id" = i64, Path, description = "Application id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Picture not found"),
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    state.pictures.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
