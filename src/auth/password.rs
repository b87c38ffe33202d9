//! Password and reset-token hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose};
use rand::prelude::RngExt;
use rand::rng;

use crate::services::{ServiceError, ServiceResult};

/// Hash a secret (password or reset token) with Argon2id defaults.
pub fn hash_secret(input: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(input.as_bytes(), &salt)
        .map_err(|e| ServiceError::Internal(format!("hash secret: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a secret against a stored hash.
///
/// An unparsable hash counts as a mismatch.
pub fn verify_secret(input: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(input.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            log::error!("Stored hash could not be parsed: {err}");
            false
        }
    }
}

/// Generate a random, URL-safe password reset token.
pub fn generate_reset_token() -> String {
    let mut token_bytes = [0u8; 32];
    rng().fill(&mut token_bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_secret("Secret123").unwrap();
        assert!(verify_secret("Secret123", &hash));
        assert!(!verify_secret("secret123", &hash));
    }

    #[test]
    fn same_input_gets_new_salt() {
        assert_ne!(hash_secret("Secret123").unwrap(), hash_secret("Secret123").unwrap());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_secret("anything", "not-a-phc-string"));
    }

    #[test]
    fn reset_tokens_are_url_safe_and_unique() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
