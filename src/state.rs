//! Application state shared across all request handlers.
//!
//! Built once at startup from an [`AppConfig`] and a migrated pool, then cloned
//! into every handler through Axum's state extraction. Every field is cheap to
//! clone: the pool and repositories share one `SqlitePool`, the rest sit
//! behind `Arc`.

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::{JwtError, TokenService};
use crate::config::AppConfig;
use crate::database::{
    ExpenseRepository, MemoryRepository, SpotRepository, TripDayRepository, TripRepository,
    UserRepository,
};
use crate::middleware::RateLimiter;
use crate::services::{AuthService, UploadService};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    /// Shared by login and register
    pub rate_limiter: Arc<RateLimiter>,
    pub uploads: UploadService,
    pub auth: AuthService,
    pub trips: TripRepository,
    pub trip_days: TripDayRepository,
    pub spots: SpotRepository,
    pub expenses: ExpenseRepository,
    pub memories: MemoryRepository,
}

impl AppState {
    /// Fails only when the configured JWT secret is unusable.
    pub fn new(config: AppConfig, pool: SqlitePool) -> Result<Self, JwtError> {
        let tokens = Arc::new(TokenService::from_config(&config.security)?);
        let auth = AuthService::new(
            UserRepository::new(pool.clone()),
            tokens.clone(),
            config.security.bcrypt_cost,
        );

        Ok(Self {
            rate_limiter: Arc::new(RateLimiter::from_config(&config.api)),
            uploads: UploadService::new(&config.uploads),
            auth,
            tokens,
            trips: TripRepository::new(pool.clone()),
            trip_days: TripDayRepository::new(pool.clone()),
            spots: SpotRepository::new(pool.clone()),
            expenses: ExpenseRepository::new(pool.clone()),
            memories: MemoryRepository::new(pool.clone()),
            config: Arc::new(config),
            pool,
        })
    }
}
