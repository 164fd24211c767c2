use axum::{http::StatusCode, Json};
use utoipa::OpenApi;

use crate::openapi::ApiDoc;

pub async fn metrics() -> (StatusCode, String) {
    common::metrics::encode_metrics()
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
