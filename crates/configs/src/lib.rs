use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mongo: MongoConfig,
    #[serde(default)]
    pub pictures: PicturesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    #[serde(default = "default_mongo_uri")]
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Driver server-selection timeout; `None` keeps the driver default.
    #[serde(default)]
    pub server_selection_timeout_secs: Option<u64>,
    /// Create the unique index on `id` at startup.
    #[serde(default = "default_true")]
    pub ensure_indexes: bool,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: default_mongo_uri(),
            database: default_database(),
            collection: default_collection(),
            server_selection_timeout_secs: None,
            ensure_indexes: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PicturesConfig {
    /// Seed file; resolved by the binary when absent.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
    /// Write mutations back to the seed file.
    #[serde(default)]
    pub persist: bool,
}

fn default_mongo_uri() -> String { DEFAULT_MONGODB_URI.to_string() }
fn default_database() -> String { "songs".to_string() }
fn default_collection() -> String { "songs".to_string() }
fn default_true() -> bool { true }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content).with_context(|| format!("cannot parse {path}"))?;
    Ok(cfg)
}

/// Like [`load_from_file`], but a missing file yields the defaults. Unreadable or
/// malformed files are still errors.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    match load_from_file(path) {
        Err(e)
            if e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == ErrorKind::NotFound) =>
        {
            Ok(AppConfig::default())
        }
        other => other,
    }
}

impl AppConfig {
    /// 读取 config.toml（缺失时使用默认值），再叠加环境变量，最后校验
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_or_default(&config_path())?;
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Environment overrides. `lookup` is injected so tests do not touch process env.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(uri) = lookup("MONGODB_SERVICE") {
            self.mongo.uri = uri;
        }
        if let Some(db) = lookup("MONGODB_DATABASE") {
            self.mongo.database = db;
        }
        if let Some(path) = lookup("PICTURES_PATH") {
            self.pictures.seed_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup("PICTURES_PERSIST") {
            self.pictures.persist = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.mongo.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl MongoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(anyhow!("mongo.uri is empty; set it in config.toml or MONGODB_SERVICE"));
        }
        let lower = self.uri.to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
            return Err(anyhow!("mongo.uri must start with mongodb:// or mongodb+srv://"));
        }
        if self.database.trim().is_empty() || self.collection.trim().is_empty() {
            return Err(anyhow!("mongo.database and mongo.collection must not be empty"));
        }
        if self.server_selection_timeout_secs == Some(0) {
            return Err(anyhow!("mongo.server_selection_timeout_secs must be positive"));
        }
        Ok(())
    }
}
