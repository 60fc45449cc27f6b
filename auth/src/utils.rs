//! Email validation, password hashing and token generation.

use crate::config::MIN_PASSWORD_LENGTH;
use crate::error::{AuthError, Result};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const HASH_SCHEME: &str = "sha256";
const HASH_ITERATIONS: u32 = 100_000;
const SALT_BYTES: usize = 16;

/// Checked when the account does not exist, so unknown emails take as long
/// as wrong passwords. No password matches it.
const DUMMY_PASSWORD_HASH: &str =
    "sha256$100000$AAAAAAAAAAAAAAAAAAAAAA==$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

/// Trim and lowercase an email address.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic structural email check: one `@`, non-empty local part, a dot in the
/// domain, no whitespace.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Validate an email and return it normalized.
///
/// # Errors
///
/// Returns [`AuthError::InvalidEmail`] when the address is malformed.
pub fn validate_email(email: &str) -> Result<String> {
    let email = normalize_email(email);
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail)
    }
}

/// Check the password length rule.
///
/// # Errors
///
/// Returns [`AuthError::WeakPassword`] below the minimum length.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

/// Hash a password as `sha256$<iterations>$<salt>$<digest>`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = stretch(password.as_bytes(), &salt, HASH_ITERATIONS);
    format!(
        "{HASH_SCHEME}${HASH_ITERATIONS}${}${}",
        STANDARD.encode(salt),
        STANDARD.encode(digest)
    )
}

/// Check `password` against a hash from [`hash_password`].
///
/// Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((iterations, salt, expected)) = parse_hash(stored) else {
        return false;
    };
    let actual = stretch(password.as_bytes(), &salt, iterations);
    constant_time_eq::constant_time_eq(&actual, &expected)
}

fn parse_hash(stored: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = stored.split('$');
    let (Some(HASH_SCHEME), Some(iterations), Some(salt), Some(digest), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return None;
    };
    Some((
        iterations.parse().ok()?,
        STANDARD.decode(salt).ok()?,
        STANDARD.decode(digest).ok()?,
    ))
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// Returns [`AuthError::InternalError`] if the hashing task dies.
pub async fn hash_password_blocking(password: &str) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::InternalError(format!("Password hashing failed: {e}")))
}

/// [`verify_password`] on the blocking pool.
///
/// With no stored hash (unknown account) a dummy hash is checked instead,
/// so the answer is `false` after the same amount of work.
///
/// # Errors
///
/// Returns [`AuthError::InternalError`] if the hashing task dies.
pub async fn verify_password_blocking(password: &str, stored: Option<String>) -> Result<bool> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || match stored {
        Some(hash) => verify_password(&password, &hash),
        None => {
            let _ = verify_password(&password, DUMMY_PASSWORD_HASH);
            false
        }
    })
    .await
    .map_err(|e| AuthError::InternalError(format!("Password verification failed: {e}")))
}

fn stretch(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut digest: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password)
        .finalize()
        .into();
    for _ in 1..iterations {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt)
            .finalize()
            .into();
    }
    digest
}

/// 256-bit random token, base64url without padding.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada @example.com"));
        assert_eq!(validate_email("  Ada@Example.COM "), Ok("ada@example.com".to_string()));
    }

    #[test]
    fn test_password_minimum() {
        assert_eq!(validate_password("12345"), Err(AuthError::WeakPassword));
        assert_eq!(validate_password("123456"), Ok(()));
    }

    #[test]
    fn test_password_hash_verifies_only_the_right_password() {
        let hash = hash_password("hunter22");
        assert!(hash.starts_with("sha256$100000$"));
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "plaintext"));
    }

    #[test]
    fn test_dummy_hash_costs_a_real_verification() {
        let (iterations, salt, digest) = parse_hash(DUMMY_PASSWORD_HASH).unwrap();
        assert_eq!(iterations, HASH_ITERATIONS);
        assert_eq!(salt.len(), SALT_BYTES);
        assert_eq!(digest.len(), 32);
        assert!(!verify_password("", DUMMY_PASSWORD_HASH));
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let hash = hash_password_blocking("hunter22").await.unwrap();
        assert_eq!(verify_password_blocking("hunter22", Some(hash.clone())).await, Ok(true));
        assert_eq!(verify_password_blocking("hunter23", Some(hash)).await, Ok(false));
        assert_eq!(verify_password_blocking("hunter22", None).await, Ok(false));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        assert_ne!(hash_password("secret1"), hash_password("secret1"));
    }

    #[test]
    fn test_tokens_are_url_safe_and_unique() {
        let a = generate_token();
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(a, generate_token());
    }
}
