//! Shared application state.

use std::sync::Arc;

use tally_db::Database;

use crate::config::ApiConfig;

/// State shared by every handler.
///
/// Holds no mutable data: the database handle is a pool and the config is
/// read-only after startup.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

/// What handlers extract with `State(..)`.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> SharedState {
        Arc::new(AppState { db, config })
    }
}
