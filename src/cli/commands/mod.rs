pub mod authorize;
pub mod migrate;
pub mod seed;

use sqlx::PgPool;

use crate::config::{config, DatabaseConfig};
use crate::database::DatabaseManager;

/// Pool for a one-shot command; `url` overrides the configured database.
pub fn connect(url: Option<&str>) -> anyhow::Result<PgPool> {
    let mut db_config: DatabaseConfig = config().database.clone();
    if let Some(url) = url {
        db_config.url = url.to_string();
    }
    db_config.max_connections = 2;
    Ok(DatabaseManager::connect(&db_config)?)
}
