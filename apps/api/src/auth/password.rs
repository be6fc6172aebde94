//! Argon2id password hashing. Both operations are CPU-bound and run on the
//! blocking pool.

use anyhow::anyhow;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::AppError;

/// Hashes with a fresh random salt; returns the PHC string.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("password hashing failed: {e}"))
    })
    .await
    .map_err(|e| anyhow!("password hashing task failed: {e}"))?
    .map_err(AppError::Internal)
}

/// `false` on mismatch. A stored hash that cannot be parsed is an internal error.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<bool> {
        let parsed =
            PasswordHash::new(&stored_hash).map_err(|e| anyhow!("stored hash is invalid: {e}"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| anyhow!("password verification task failed: {e}"))?
    .map_err(AppError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("password123".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("password123"));
        assert!(verify_password("password123".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("wrongpassword".to_string(), hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_same_password_gets_distinct_salts() {
        let a = hash_password("password123".to_string()).await.unwrap();
        let b = hash_password("password123".to_string()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_corrupt_stored_hash_is_internal_error() {
        let err = verify_password("x".to_string(), "not-a-phc-string".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
