//! Application state wiring the session service to its storage.
//!
//! AppState holds the concrete service instance used by both CLI and REST API.
//! `ChatService` is generic over the repository trait; AppState pins it to the
//! SQLite implementation.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::chat::service::ChatService;
use parley_infra::config::{load_config, resolve_data_dir, resolve_database_url};
use parley_infra::sqlite::chat::SqliteChatRepository;
use parley_infra::sqlite::pool::DatabasePool;
use parley_types::config::ParleyConfig;

/// Concrete type alias for the service generic pinned to the infra implementation.
pub type ConcreteChatService = ChatService<SqliteChatRepository>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<ParleyConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    ///
    /// `database_url` overrides the configured database location.
    pub async fn init(database_url: Option<&str>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let db_url = resolve_database_url(database_url, &config, &data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;

        Ok(Self::from_parts(db_pool, config, data_dir))
    }

    /// Wire the state from an already-open pool.
    pub fn from_parts(db_pool: DatabasePool, config: ParleyConfig, data_dir: PathBuf) -> Self {
        let chat_service = ChatService::new(SqliteChatRepository::new(db_pool.clone()));

        Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }
}
