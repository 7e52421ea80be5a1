//! Unlock PIN validation and hashing.
//!
//! The PIN is kept in secure storage as an Argon2id PHC string, never as the
//! raw digits.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};

use super::AuthError;

/// Number of digits in an unlock PIN.
pub const PIN_LENGTH: usize = 4;

/// Check that `pin` is exactly four ASCII digits.
///
/// # Errors
///
/// Returns `AuthError::InvalidPinFormat` otherwise.
pub fn validate_pin(pin: &SecretString) -> Result<(), AuthError> {
    let digits = pin.expose_secret();
    if digits.len() == PIN_LENGTH && digits.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AuthError::InvalidPinFormat)
    }
}

/// Hash a PIN using Argon2id.
pub(crate) fn hash_pin(pin: &SecretString) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(pin.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PinHash)
}

/// Verify a PIN against a stored hash.
pub(crate) fn verify_pin(pin: &SecretString, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PinHash)?;

    Argon2::default()
        .verify_password(pin.expose_secret().as_bytes(), &parsed)
        .map_err(|_| AuthError::IncorrectPin)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pin(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin(&pin("0420")).is_ok());
        assert!(matches!(validate_pin(&pin("123")), Err(AuthError::InvalidPinFormat)));
        assert!(matches!(validate_pin(&pin("12345")), Err(AuthError::InvalidPinFormat)));
        assert!(matches!(validate_pin(&pin("12a4")), Err(AuthError::InvalidPinFormat)));
        assert!(matches!(validate_pin(&pin("١٢٣٤")), Err(AuthError::InvalidPinFormat)));
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_pin(&pin("2468")).unwrap();
        assert!(!hash.contains("2468"));
        assert!(verify_pin(&pin("2468"), &hash).is_ok());
        assert!(matches!(
            verify_pin(&pin("1357"), &hash),
            Err(AuthError::IncorrectPin)
        ));
    }

    #[test]
    fn test_garbage_hash_is_hash_error() {
        assert!(matches!(
            verify_pin(&pin("2468"), "2468"),
            Err(AuthError::PinHash)
        ));
    }
}
