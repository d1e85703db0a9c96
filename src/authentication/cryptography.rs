use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::task::spawn_blocking;

use crate::database::error::ApiError;

fn hash_blocking(password: &[u8]) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default().hash_password(password, &salt)?.to_string())
}

fn verify_blocking(password: &[u8], password_hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;

    Ok(Argon2::default()
        .verify_password(password, &parsed_hash)
        .is_ok())
}

/// Argon2 hash of `password`, computed off the async workers.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    spawn_blocking(move || hash_blocking(password.as_bytes()))
        .await
        .map_err(|e| ApiError::Internal(format!("{e}")))?
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

/// A stored hash that cannot be parsed is an internal error, not a mismatch.
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, ApiError> {
    spawn_blocking(move || verify_blocking(password.as_bytes(), &password_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("{e}")))?
        .map_err(|e| ApiError::Internal(format!("Failed to verify password: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_verify_against_original_password() {
        let hash = hash_password("testpass123".into()).await.unwrap();

        assert_ne!(hash, "testpass123");
        assert!(verify_password("testpass123".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrongpass".into(), hash).await.unwrap());
        assert!(verify_password("testpass123".into(), "not a hash".into())
            .await
            .is_err());
    }
}
