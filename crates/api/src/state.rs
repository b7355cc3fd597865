use std::sync::Arc;

use telesales_db::PgCallCenterStore;

use crate::config::ServerConfig;
use crate::sessions::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: telesales_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Collaborator implementations handed to the call flow.
    pub store: PgCallCenterStore,
    /// Open call sessions, one per agent.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(pool: telesales_db::DbPool, config: ServerConfig) -> Self {
        Self {
            store: PgCallCenterStore::new(pool.clone()),
            pool,
            config: Arc::new(config),
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}
