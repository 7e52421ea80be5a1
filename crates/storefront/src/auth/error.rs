//! Authentication error types.

use thiserror::Error;

use super::biometrics::BiometricError;
use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
///
/// The `Display` text of the verification variants is what the unlock and
/// checkout screens show before offering the other method.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] farmstand_core::EmailError),

    /// Password left blank.
    #[error("password is required")]
    MissingPassword,

    /// First name left blank on signup.
    #[error("first name is required")]
    MissingName,

    /// PIN is not exactly four digits.
    #[error("Please enter a 4-digit PIN")]
    InvalidPinFormat,

    /// PIN and confirmation differ during setup.
    #[error("PINs do not match. Please try again.")]
    PinMismatch,

    /// No PIN has been stored yet.
    #[error("PIN not set up")]
    PinNotSetUp,

    /// PIN did not match the stored one.
    #[error("Incorrect PIN")]
    IncorrectPin,

    /// PIN hashing error.
    #[error("PIN hashing error")]
    PinHash,

    /// One-time code is not six characters.
    #[error("Please enter the 6-digit code")]
    InvalidOtpFormat,

    /// One-time code did not match.
    #[error("Invalid verification code")]
    IncorrectOtp,

    /// Device lacks biometric hardware or enrollment.
    #[error("Biometric authentication is not available on this device")]
    BiometricUnavailable,

    /// Prompt was dismissed or the biometric did not match.
    #[error("Biometric authentication failed. Please use your PIN.")]
    BiometricFailed,

    /// Biometric provider error.
    #[error("biometric error: {0}")]
    Biometric(#[from] BiometricError),

    /// No user is signed in on this device.
    #[error("not signed in")]
    NotSignedIn,

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Whether the caller should offer the other verification method.
    #[must_use]
    pub const fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::BiometricFailed
                | Self::BiometricUnavailable
                | Self::Biometric(_)
                | Self::IncorrectPin
                | Self::InvalidPinFormat
        )
    }
}
