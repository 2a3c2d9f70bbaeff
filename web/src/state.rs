use libfood::Database;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
pub struct SharedState {
    pub db: Database,
}

impl SharedState {
    pub fn new(db: Database) -> Self {
        trace!("Creating shared app state");
        Self { db }
    }

    #[cfg(test)]
    pub fn test(pool: sqlx::Pool<sqlx::Sqlite>) -> Self {
        tracing::debug!("Creating test shared app state");
        Self { db: pool.into() }
    }
}

pub type AppState = Arc<SharedState>;
