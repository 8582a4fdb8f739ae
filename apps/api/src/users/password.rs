//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=19456,t=2,p=1$...`) stored in
//! `users.password_hash`. Both functions are CPU heavy; async callers run them
//! on the blocking pool.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub use argon2::password_hash::Error as PasswordError;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch, `Err` only if `hash` is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// A valid hash that no submitted password is expected to match. Verifying
/// against it keeps unknown-email logins as slow as wrong-password ones.
pub fn dummy_hash() -> Result<&'static str, PasswordError> {
    static DUMMY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY.get() {
        return Ok(hash);
    }
    let hash = hash_password("login-timing-equalizer")?;
    Ok(DUMMY.get_or_init(|| hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_hash_never_contains_plaintext_and_is_salted() {
        let a = hash_password("s3cret-value").unwrap();
        let b = hash_password("s3cret-value").unwrap();
        assert!(!a.contains("s3cret-value"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_dummy_hash_is_stable_and_valid() {
        let first = dummy_hash().unwrap();
        assert_eq!(first, dummy_hash().unwrap());
        assert!(!verify_password("", first).unwrap());
    }
}
