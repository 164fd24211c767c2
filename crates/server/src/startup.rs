use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::Router;
use configs::{AppConfig, PicturesConfig};
use service::{
    pictures::PictureStore,
    songs::{repo::MongoSongRepository, SongService},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

const SEED_RELATIVE: &str = "data/pictures.json";

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Seed file location: explicit config wins, then `data/pictures.json` next to the
/// installed binary, then the copy shipped in the repository.
pub fn resolve_seed_path(cfg: &PicturesConfig) -> PathBuf {
    if let Some(path) = &cfg.seed_path {
        return path.clone();
    }
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SEED_RELATIVE)));
    match beside_exe {
        Some(path) if path.exists() => path,
        _ => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(SEED_RELATIVE),
    }
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Open both collections. The MongoDB client connects lazily, so a down database
/// only shows up as 500s on the song routes.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let seed_path = resolve_seed_path(&cfg.pictures);
    common::env::ensure_seed_file(&seed_path, cfg.pictures.persist).await?;
    let pictures = PictureStore::open(&seed_path, cfg.pictures.persist).await?;

    let db = models::db::connect(&cfg.mongo).await?;
    let songs = SongService::new(Arc::new(MongoSongRepository::new(&db, &cfg.mongo.collection)));
    if cfg.mongo.ensure_indexes {
        let songs = songs.clone();
        tokio::spawn(async move { songs.ensure_indexes().await });
    }

    Ok(AppState::new(pictures, songs))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_seed_path_wins() {
        let cfg = PicturesConfig { seed_path: Some(PathBuf::from("/tmp/p.json")), persist: false };
        assert_eq!(resolve_seed_path(&cfg), PathBuf::from("/tmp/p.json"));
    }

    #[test]
    fn default_seed_path_points_at_shipped_file() {
        let path = resolve_seed_path(&PicturesConfig::default());
        assert!(path.ends_with(SEED_RELATIVE));
        assert!(path.exists(), "{} should exist", path.display());
    }

    #[tokio::test]
    async fn state_builds_without_a_running_database() -> Result<(), anyhow::Error> {
        let mut cfg = AppConfig::default();
        cfg.mongo.ensure_indexes = false;
        let state = build_state(&cfg).await?;
        assert!(state.pictures.count().await? > 0);
        Ok(())
    }

    #[test]
    fn bad_host_is_a_config_error() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "not a host".into();
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }
}
