use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::error::AppError;

lazy_static! {
    // The fixed special-character set accepted by the strength check.
    static ref SPECIAL_CHARS: Regex = Regex::new(r"[!@#$%^&*()_\-+={}|?<>/\\]").unwrap();
}

/// Checks password strength. True iff ALL hold: length in [8,32], at least
/// one digit, one uppercase letter, one lowercase letter, and one character
/// from the fixed special set. Pure function.
pub fn check_strength(password: &str) -> bool {
    let length = password.chars().count();
    (8..=32).contains(&length)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && SPECIAL_CHARS.is_match(password)
}

/// `validator`-compatible wrapper around [`check_strength`] for request
/// payload derives.
pub fn strength_rule(password: &str) -> Result<(), ValidationError> {
    if check_strength(password) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "password must be 8-32 chars with a digit, an uppercase, a lowercase and a special character",
        ))
    }
}

/// Hashes a password with bcrypt at the given cost. The hash runs on the
/// blocking pool; an actix worker is never tied up by it.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Configuration(format!("hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Compares a plaintext password against a stored bcrypt hash using bcrypt's
/// own compare primitive. A mismatch is `Ok(false)`, not an error.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Configuration(format!("hashing task failed: {}", e)))?
        .map_err(AppError::from)
}
