//! Password hashing
//!
//! Argon2id with a random salt, stored in PHC string format.

use std::sync::OnceLock;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// Hash of a throwaway password, checked when the account does not exist
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Password hashing errors
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hash a plaintext password
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a plaintext password against a stored hash
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}

/// Verify against the dummy hash. Never matches a real account, but costs
/// the same as a real verification.
pub fn verify_dummy(password: &str) -> Result<bool, PasswordError> {
    let hash = match DUMMY_HASH.get() {
        Some(hash) => hash,
        None => {
            let hash = hash_password("bankop-unknown-account")?;
            DUMMY_HASH.get_or_init(|| hash)
        }
    };
    verify_password(password, hash)
}

/// Hash on the blocking pool
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?
}

/// Verify on the blocking pool
pub async fn verify_password_blocking(
    password: String,
    stored_hash: String,
) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?
}

/// Dummy verification on the blocking pool
pub async fn verify_dummy_blocking(password: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_dummy(&password))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("secret123".to_string()).await.unwrap();
        assert!(verify_password_blocking("secret123".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_dummy_verification_runs_argon2() {
        assert!(!verify_dummy("secret123").unwrap());
        assert!(!verify_dummy_blocking("secret123".to_string()).await.unwrap());

        // Same parameters as real hashes
        let dummy = DUMMY_HASH.get().unwrap();
        let real = hash_password("secret123").unwrap();
        let params = |hash: &str| hash.split('$').nth(3).map(str::to_string);
        assert!(dummy.starts_with("$argon2id$"));
        assert_eq!(params(dummy), params(&real));
    }
}
