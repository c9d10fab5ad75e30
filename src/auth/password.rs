use once_cell::sync::OnceCell;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash a password on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Verify a password against a stored bcrypt hash on the blocking pool.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

/// Burn one verification against a throwaway hash so that unknown usernames
/// take as long to reject as wrong passwords.
pub async fn verify_dummy(password: &str, cost: u32) -> Result<(), PasswordError> {
    static DUMMY: OnceCell<String> = OnceCell::new();
    let hash = match DUMMY.get() {
        Some(hash) => hash.clone(),
        None => {
            let hash = hash_password("dummy-password-for-timing", cost).await?;
            DUMMY.get_or_init(|| hash).clone()
        }
    };
    verify_password(password, &hash).await?;
    Ok(())
}
