//! Platform biometric prompt.
//!
//! [`Biometrics`] is the seam to the OS sensor API. [`NoBiometrics`] is a
//! device without a sensor; [`SimulatedBiometrics`] answers from a script and
//! backs the CLI's `FARMSTAND_BIOMETRICS` setting and the tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use farmstand_core::BiometricKind;

/// Error reported by the platform biometric API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("biometric provider error: {0}")]
pub struct BiometricError(pub String);

/// Text shown on the system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricPrompt {
    pub message: String,
    /// Label of the button that falls back to the PIN, if offered.
    pub fallback_label: Option<String>,
    pub cancel_label: String,
}

impl BiometricPrompt {
    /// Prompt used when unlocking or confirming a payment.
    #[must_use]
    pub fn authenticate(kind: BiometricKind) -> Self {
        Self {
            message: format!("Authenticate with {}", kind.label()),
            fallback_label: Some("Use PIN".to_owned()),
            cancel_label: "Cancel".to_owned(),
        }
    }

    /// Prompt used when enrolling the app for biometric unlock. The device
    /// passcode fallback is disabled here.
    #[must_use]
    pub fn setup(kind: BiometricKind) -> Self {
        let target = match kind {
            BiometricKind::Fingerprint => "fingerprint",
            BiometricKind::Facial | BiometricKind::None => "face",
        };
        Self {
            message: format!("Set up {target} recognition"),
            fallback_label: None,
            cancel_label: "Cancel".to_owned(),
        }
    }
}

/// Access to the device's biometric sensor.
pub trait Biometrics: Send + Sync + 'static {
    /// Whether the device has a biometric sensor.
    fn has_hardware(&self) -> impl Future<Output = Result<bool, BiometricError>> + Send;

    /// Whether the user has enrolled at least one biometric.
    fn is_enrolled(&self) -> impl Future<Output = Result<bool, BiometricError>> + Send;

    /// Sensor kinds the device supports.
    fn supported_kinds(
        &self,
    ) -> impl Future<Output = Result<Vec<BiometricKind>, BiometricError>> + Send;

    /// Show the system prompt. `Ok(false)` means cancelled or not matched.
    fn authenticate(
        &self,
        prompt: &BiometricPrompt,
    ) -> impl Future<Output = Result<bool, BiometricError>> + Send;
}

/// A device without a biometric sensor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBiometrics;

impl Biometrics for NoBiometrics {
    async fn has_hardware(&self) -> Result<bool, BiometricError> {
        Ok(false)
    }

    async fn is_enrolled(&self) -> Result<bool, BiometricError> {
        Ok(false)
    }

    async fn supported_kinds(&self) -> Result<Vec<BiometricKind>, BiometricError> {
        Ok(Vec::new())
    }

    async fn authenticate(&self, _prompt: &BiometricPrompt) -> Result<bool, BiometricError> {
        Ok(false)
    }
}

/// A scripted sensor.
///
/// Each prompt pops the next queued outcome, or uses the default outcome when
/// the queue is empty. Every prompt message is recorded.
#[derive(Debug)]
pub struct SimulatedBiometrics {
    kind: BiometricKind,
    enrolled: bool,
    default_outcome: bool,
    queued: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
}

impl SimulatedBiometrics {
    /// Enrolled sensor that accepts every prompt.
    #[must_use]
    pub fn accepting(kind: BiometricKind) -> Self {
        Self::new(kind, true)
    }

    /// Enrolled sensor that rejects every prompt.
    #[must_use]
    pub fn rejecting(kind: BiometricKind) -> Self {
        Self::new(kind, false)
    }

    fn new(kind: BiometricKind, default_outcome: bool) -> Self {
        Self {
            kind,
            enrolled: true,
            default_outcome,
            queued: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Sensor present but nothing enrolled.
    #[must_use]
    pub const fn not_enrolled(mut self) -> Self {
        self.enrolled = false;
        self
    }

    /// Queue the outcome of the next unanswered prompt.
    #[must_use]
    pub fn then(self, outcome: bool) -> Self {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
        self
    }

    /// Messages of every prompt shown so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Biometrics for SimulatedBiometrics {
    async fn has_hardware(&self) -> Result<bool, BiometricError> {
        Ok(self.kind != BiometricKind::None)
    }

    async fn is_enrolled(&self) -> Result<bool, BiometricError> {
        Ok(self.enrolled)
    }

    async fn supported_kinds(&self) -> Result<Vec<BiometricKind>, BiometricError> {
        if self.kind == BiometricKind::None {
            Ok(Vec::new())
        } else {
            Ok(vec![self.kind])
        }
    }

    async fn authenticate(&self, prompt: &BiometricPrompt) -> Result<bool, BiometricError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.message.clone());
        let queued = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        Ok(queued.unwrap_or(self.default_outcome) && self.enrolled)
    }
}
