pub mod auth;
pub mod rate_limit;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use rate_limit::{auth_rate_limit_middleware, RateLimiter};
pub use response::{ApiResponse, ApiResult, Created, Message};
