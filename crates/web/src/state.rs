//! Application state

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::session::{RedisSessionStore, SessionManager},
    config::Config,
    randoms::{self, RandomsHandle},
    store::{PgUserStore, UserStore},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    /// Persistent account records
    pub users: Arc<dyn UserStore>,
    /// Session issuance, restoration, and destruction
    pub sessions: SessionManager,
    /// Handle to the background random-number worker
    pub randoms: RandomsHandle,
}

impl AppState {
    pub async fn new(pool: PgPool, config: Config) -> anyhow::Result<Self> {
        // The shared session store is the sole authority for "is this caller
        // logged in"; Redis enforces the TTL server-side
        tracing::info!("Connecting to session store...");
        let session_store = RedisSessionStore::connect(&config.redis_url).await?;
        tracing::info!("Session store connection established");

        let sessions = SessionManager::new(
            Arc::new(session_store),
            &config.session_secret,
            config.session_ttl_seconds,
        );

        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));

        // Random-number generation runs off the request path; handlers reach
        // the worker through a request/response channel
        let randoms = randoms::spawn_worker();
        tracing::info!("Random-number worker started");

        Ok(Self {
            pool,
            config,
            users,
            sessions,
            randoms,
        })
    }
}
