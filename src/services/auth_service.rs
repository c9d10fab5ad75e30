use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_dummy, verify_password, PasswordError};
use crate::auth::{JwtError, TokenService};
use crate::database::manager::DatabaseError;
use crate::database::models::{UserIdentity, UserProfile};
use crate::database::repositories::UserRepository;

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 20;
pub const PASSWORD_MIN_CHARS: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username must be between 3 and 20 characters")]
    InvalidUsername,
    #[error("Password must be at least 6 characters")]
    InvalidPassword,
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
    #[error("Token error: {0}")]
    Token(#[from] JwtError),
}

/// Token plus the identity it was issued for
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserIdentity,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    tokens: Arc<TokenService>,
    bcrypt_cost: u32,
}

pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let length = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&length) {
        return Err(AuthError::InvalidUsername);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(AuthError::InvalidPassword);
    }
    Ok(())
}

impl AuthService {
    pub fn new(users: UserRepository, tokens: Arc<TokenService>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        validate_username(username)?;
        validate_password(password)?;

        if self.users.username_exists(username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let hash = hash_password(password, self.bcrypt_cost).await?;
        let user = match self.users.create(username, &hash).await {
            Ok(user) => user,
            // lost a race with a concurrent registration
            Err(DatabaseError::Conflict(_)) => return Err(AuthError::UsernameTaken),
            Err(e) => return Err(e.into()),
        };

        info!("Registered user {} ({})", user.username, user.id);
        self.session_for(UserIdentity::from(&user))
    }

    /// Absent users and wrong passwords fail identically
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            verify_dummy(password, self.bcrypt_cost).await?;
            warn!("Login failed for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash).await? {
            warn!("Login failed for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        info!("User {} logged in", user.id);
        self.session_for(UserIdentity::from(&user))
    }

    pub async fn is_username_available(&self, username: &str) -> Result<bool, AuthError> {
        validate_username(username)?;
        Ok(!self.users.username_exists(username).await?)
    }

    pub async fn profile(&self, user_id: i64) -> Result<UserProfile, AuthError> {
        match self.users.get(user_id).await {
            Ok(user) => Ok(user.into()),
            Err(DatabaseError::NotFound(_)) => Err(AuthError::UserNotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn session_for(&self, user: UserIdentity) -> Result<AuthSession, AuthError> {
        let token = self.tokens.issue(user.id, &user.username)?;
        Ok(AuthSession { token, user })
    }
}
