// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints. Each one returns `{message, token, user}`.

pub mod login; // POST /api/auth/login
pub mod register; // POST /api/auth/register
pub mod username; // GET /api/auth/check-username/:username

pub use login::login_post;
pub use register::register_post;
pub use username::check_username_get;

use serde::Serialize;

use crate::services::AuthSession;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub session: AuthSession,
}
