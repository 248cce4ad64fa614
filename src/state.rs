//! Shared application state
//!
//! Built once in `main` and handed to the router; handlers extract the
//! parts they need through `FromRef`.

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(pool: PgPool, tokens: TokenService) -> Self {
        Self { pool, tokens }
    }

    /// Build state from configuration and an open pool
    pub fn from_config(pool: PgPool, config: &Config) -> Self {
        Self::new(
            pool,
            TokenService::new(&config.jwt_secret, config.jwt_expiration_hours),
        )
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
