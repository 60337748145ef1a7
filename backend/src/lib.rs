pub mod config;
pub mod error;
pub mod handler;
pub mod leaderboard;
pub mod model;
pub mod route;
pub mod schema;
pub mod store;
pub mod submission;

use std::sync::Arc;

use anyhow::Result;

pub use config::Config;
pub use route::create_router;
use store::{MatchStore, MemoryMatchStore, PgMatchStore};

/// Process-wide state, built once at startup and shared by every request.
pub struct AppState {
    pub store: Arc<dyn MatchStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn MatchStore>, config: Config) -> Self {
        Self { store, config }
    }

    /// Connect the store the configuration asks for: Postgres when
    /// `DATABASE_URL` is set, otherwise an in-memory store.
    pub async fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn MatchStore> = match &config.database_url {
            Some(url) => Arc::new(PgMatchStore::connect(url).await?),
            None => {
                tracing::warn!("DATABASE_URL not set, matches are kept in memory only");
                match &config.seed_file {
                    Some(path) => Arc::new(MemoryMatchStore::from_json_file(path).await?),
                    None => Arc::new(MemoryMatchStore::new()),
                }
            }
        };

        Ok(Self::new(store, config))
    }
}
