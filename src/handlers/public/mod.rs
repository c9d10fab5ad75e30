// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Login and register sit behind the auth rate limiter; health and the
// username check do not.

pub mod auth;
pub mod health;

pub use health::health_get;
