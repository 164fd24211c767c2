use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod health;
pub mod metrics;
pub mod pictures;
pub mod songs;

/// Build the full application router: operational, picture and song routes.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let ops = Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(metrics::metrics))
        .route("/api-docs/openapi.json", get(metrics::openapi_json));

    let picture_routes = Router::new()
        .route("/count", get(pictures::count))
        .route("/picture", get(pictures::list).post(pictures::create))
        .route(
            "/picture/:id",
            get(pictures::get).put(pictures::update).delete(pictures::delete),
        );

    let song_routes = Router::new()
        .route("/song", get(songs::list).post(songs::create))
        .route(
            "/song/:id",
            get(songs::get).put(songs::update).delete(songs::delete),
        );

    ops.merge(picture_routes)
        .merge(song_routes)
        .with_state(state)
        .layer(middleware::from_fn(common::metrics::track_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径，级别 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应时记录状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx 以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use async_trait::async_trait;
    use models::{Song, SongPatch, StoredSong};
    use service::{
        errors::ServiceError,
        pictures::PictureStore,
        songs::{repository::memory::MemorySongRepository, SongRepository, SongService, UpdateOutcome},
    };
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let state = AppState::new(
            PictureStore::from_items(Vec::new()),
            SongService::new(Arc::new(MemorySongRepository::new())),
        );
        build_router(state, CorsLayer::very_permissive())
    }

    /// Song backend whose every call fails, as an unreachable database would.
    struct BrokenSongRepository;

    #[async_trait]
    impl SongRepository for BrokenSongRepository {
        async fn list(&self) -> Result<Vec<StoredSong>, ServiceError> {
            Err(ServiceError::Internal("boom".into()))
        }
        async fn find(&self, _id: i64) -> Result<Option<StoredSong>, ServiceError> {
            Err(ServiceError::Internal("boom".into()))
        }
        async fn insert(&self, _song: Song) -> Result<String, ServiceError> {
            Err(ServiceError::Internal("boom".into()))
        }
        async fn update(&self, _id: i64, _patch: SongPatch) -> Result<UpdateOutcome, ServiceError> {
            Err(ServiceError::Internal("boom".into()))
        }
        async fn delete(&self, _id: i64) -> Result<bool, ServiceError> {
            Err(ServiceError::Internal("boom".into()))
        }
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn malformed_json_is_a_json_error() {
        let res = app()
            .oneshot(
                Request::post("/picture")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"id\": "))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "Invalid Body");
    }

    #[tokio::test]
    async fn missing_id_is_unprocessable() {
        let res = app()
            .oneshot(
                Request::post("/song")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"title": "no id"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn non_integer_path_id_is_rejected() {
        let res = app()
            .oneshot(Request::get("/picture/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "Invalid Path");
    }

    #[tokio::test]
    async fn not_found_body_carries_message() {
        let res = app()
            .oneshot(Request::get("/picture/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(res).await,
            serde_json::json!({"error": "Not Found", "message": "Picture not found"})
        );
    }

    #[tokio::test]
    async fn empty_collection_counts_zero() {
        let res = app()
            .oneshot(Request::get("/count").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, serde_json::json!({"length": 0}));
    }

    #[tokio::test]
    async fn openapi_lists_every_route() {
        let res = app()
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let doc = body_json(res).await;
        for path in ["/health", "/count", "/picture", "/picture/{id}", "/song", "/song/{id}"] {
            assert!(doc["paths"].get(path).is_some(), "missing {path}");
        }
    }

    #[tokio::test]
    async fn song_storage_failures_surface_as_500_with_detail() {
        let state = AppState::new(
            PictureStore::from_items(Vec::new()),
            SongService::new(Arc::new(BrokenSongRepository)),
        );
        let app = build_router(state, CorsLayer::very_permissive());

        let json_req = |method: &str, uri: &str, body: &'static str| {
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        };
        let requests = vec![
            Request::get("/song").body(Body::empty()).unwrap(),
            Request::get("/song/1").body(Body::empty()).unwrap(),
            json_req("POST", "/song", r#"{"id": 1, "title": "t"}"#),
            json_req("PUT", "/song/1", r#"{"title": "u"}"#),
            Request::delete("/song/1").body(Body::empty()).unwrap(),
        ];

        for req in requests {
            let label = format!("{} {}", req.method(), req.uri());
            let res = app.clone().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "{label}");
            assert_eq!(
                body_json(res).await,
                serde_json::json!({"error": "Internal Server Error", "message": "boom"}),
                "{label}"
            );
        }
    }
}
