pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod service;
pub mod storage;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::Config;
use error::Result;
use service::ArticleService;
use storage::{MemoryStore, PgStore};

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::new(&config.log))
        .init();

    match config.database_url.as_deref() {
        Some(url) => {
            let db = storage::new_db_pool(url).await?;
            if config.migrate {
                storage::migrate(&db, storage::SCHEMA).await?;
                tracing::info!("schema migrated");
            }
            api::run_server(ArticleService::new(PgStore::new(db)), &config.listen).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            api::run_server(ArticleService::new(MemoryStore::new()), &config.listen).await
        }
    }
}
