use std::time::Duration;

use configs::MongoConfig;
use mongodb::{options::ClientOptions, Client, Database};
use tracing::info;

/// Build a client from config and select the database. The driver connects lazily,
/// so this succeeds even when the server is down; the first query surfaces the error.
pub async fn connect(cfg: &MongoConfig) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(cfg.uri.as_str()).await?;
    options.app_name = Some("media_api".to_string());
    if let Some(secs) = cfg.server_selection_timeout_secs {
        options.server_selection_timeout = Some(Duration::from_secs(secs));
    }
    let client = Client::with_options(options)?;
    info!(database = %cfg.database, collection = %cfg.collection, "mongodb client ready");
    Ok(client.database(&cfg.database))
}
