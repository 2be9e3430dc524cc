use std::sync::Arc;

use crate::{
    config::{AppConfig, SessionBackend},
    db::{DbPool, OrmConn},
    session::{DbSessionStore, MemorySessionStore, SharedSessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub sessions: SharedSessionStore,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: DbPool, orm: OrmConn) -> Self {
        let sessions: SharedSessionStore = match config.session_backend {
            SessionBackend::Database => {
                Arc::new(DbSessionStore::with_ttl(orm.clone(), config.session_ttl))
            }
            SessionBackend::Memory => Arc::new(MemorySessionStore::with_ttl(config.session_ttl)),
        };
        Self {
            pool,
            orm,
            sessions,
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
        }
    }
}
