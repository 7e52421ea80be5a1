//! Authentication store.
//!
//! Holds the single signed-in user and the unlock gate. Sign-in, signup and
//! one-time codes are mocked locally after a configurable delay. The gate
//! offers two alternative verification paths:
//!
//! - the platform biometric prompt, through [`Biometrics`];
//! - a 4-digit PIN checked against a hash in secure storage.
//!
//! Failing one path never locks anything; the caller offers the other one.

pub mod biometrics;
mod error;
pub mod pin;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::instrument;

use farmstand_core::{BiometricKind, Email, User, UserId, UserRole};

use crate::storage::{Storage, keys, secure_keys};

pub use biometrics::{BiometricError, BiometricPrompt, Biometrics, NoBiometrics, SimulatedBiometrics};
pub use error::AuthError;

/// Id given to every mock account.
const MOCK_USER_ID: &str = "1";
/// Phone number given to accounts created through `login`.
const MOCK_PHONE_NUMBER: &str = "+1234567890";
/// Length of a one-time code.
const OTP_LENGTH: usize = 6;

const FLAG_TRUE: &str = "true";
const FLAG_FALSE: &str = "false";

/// Tunables for the mocked backend.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Delay before mocked network calls resolve.
    pub simulated_latency: Duration,
    /// Sign-ins with this address get the vendor role.
    pub vendor_email: String,
    /// The one-time code `verify_otp` accepts.
    pub otp_code: SecretString,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            simulated_latency: Duration::from_secs(1),
            vendor_email: "vendor@gmail.com".to_owned(),
            otp_code: SecretString::from("123456"),
        }
    }
}

impl AuthSettings {
    /// Default settings without the simulated delay.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            simulated_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub user: Option<User>,
}

impl AuthSession {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Fields collected by the signup form.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// Result of [`AuthStore::check_biometric_availability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiometricAvailability {
    pub is_available: bool,
    pub kind: BiometricKind,
}

/// Result of [`AuthStore::is_biometric_setup_complete`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupStatus {
    pub biometric_enabled: bool,
    pub pin_enabled: bool,
}

/// How the unlock gate resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Biometrics succeeded and the stored user was restored.
    Biometric(User),
    /// Biometrics unavailable or failed; ask for the PIN.
    PinRequired,
}

/// Which path to verify a sensitive action with.
#[derive(Debug, Clone)]
pub enum Verification {
    Biometric,
    Pin(SecretString),
}

/// Session and unlock gate.
pub struct AuthStore<B> {
    session: watch::Sender<AuthSession>,
    local: Storage,
    secure: Storage,
    biometrics: B,
    settings: AuthSettings,
}

impl<B> std::fmt::Debug for AuthStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("session", &*self.session.borrow())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<B: Biometrics> AuthStore<B> {
    /// Restore the session from a stored `user` blob, if any.
    pub async fn load(
        local: Storage,
        secure: Storage,
        biometrics: B,
        settings: AuthSettings,
    ) -> Self {
        let user = match local.get_json::<User>(keys::USER).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stored user");
                None
            }
        };
        if let Some(user) = &user {
            tracing::info!(user_id = %user.id, "Restored session");
        }
        let (session, _) = watch::channel(AuthSession { user });
        Self {
            session,
            local,
            secure,
            biometrics,
            settings,
        }
    }

    /// Watch the session.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.session.subscribe()
    }

    #[must_use]
    pub fn session(&self) -> AuthSession {
        self.session.borrow().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.borrow().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    #[must_use]
    pub const fn biometrics(&self) -> &B {
        &self.biometrics
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Mock sign-in. Any non-empty password is accepted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::MissingPassword` for
    /// bad input, `AuthError::Storage` if the user cannot be saved.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(AuthError::MissingPassword);
        }
        self.simulate_network().await;

        let user = User {
            id: UserId::new(MOCK_USER_ID),
            first_name: email.local_part().to_owned(),
            last_name: String::new(),
            phone_number: Some(MOCK_PHONE_NUMBER.to_owned()),
            avatar: None,
            role: self.role_for(&email),
            email,
        };
        self.start_session(user).await
    }

    /// Mock account creation.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, `AuthError::Storage` if the
    /// user cannot be saved.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<User, AuthError> {
        let email = Email::parse(&request.email)?;
        if request.password.expose_secret().is_empty() {
            return Err(AuthError::MissingPassword);
        }
        if request.first_name.trim().is_empty() {
            return Err(AuthError::MissingName);
        }
        self.simulate_network().await;

        let user = User {
            id: UserId::new(MOCK_USER_ID),
            first_name: request.first_name,
            last_name: request.last_name,
            phone_number: request.phone_number.filter(|phone| !phone.trim().is_empty()),
            avatar: None,
            role: self.role_for(&email),
            email,
        };
        self.start_session(user).await
    }

    /// Sign out and forget the stored user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored user cannot be removed; the
    /// session is left unchanged in that case.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.local.remove(keys::USER).await?;
        self.session.send_replace(AuthSession::default());
        tracing::info!("Signed out");
        Ok(())
    }

    /// Mock sending a one-time code by SMS.
    ///
    /// # Errors
    ///
    /// Never fails today; the signature leaves room for a real sender.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, phone_number: &str) -> Result<(), AuthError> {
        self.simulate_network().await;
        tracing::debug!("One-time code sent");
        Ok(())
    }

    /// Check a one-time code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOtpFormat` unless the code has six
    /// characters, `AuthError::IncorrectOtp` if it does not match.
    #[instrument(skip(self, code))]
    pub async fn verify_otp(&self, code: &str) -> Result<(), AuthError> {
        let code = code.trim();
        if code.chars().count() != OTP_LENGTH {
            return Err(AuthError::InvalidOtpFormat);
        }
        self.simulate_network().await;
        if code == self.settings.otp_code.expose_secret() {
            Ok(())
        } else {
            Err(AuthError::IncorrectOtp)
        }
    }

    // =========================================================================
    // Unlock gate
    // =========================================================================

    /// Whether biometric unlock can be offered, and with which sensor.
    ///
    /// Requires hardware, an enrolled biometric, and the app-level
    /// `biometric_enabled` flag. Provider errors read as unavailable.
    pub async fn check_biometric_availability(&self) -> BiometricAvailability {
        match self.probe_biometrics().await {
            Ok(availability) => availability,
            Err(e) => {
                tracing::warn!(error = %e, "Biometric availability check failed");
                BiometricAvailability {
                    is_available: false,
                    kind: BiometricKind::None,
                }
            }
        }
    }

    /// Show the biometric prompt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::BiometricFailed` if the prompt is dismissed or does
    /// not match, `AuthError::Biometric` if the provider fails.
    #[instrument(skip(self))]
    pub async fn authenticate_with_biometrics(&self) -> Result<(), AuthError> {
        let kind = self.biometric_kind().await;
        let prompt = BiometricPrompt::authenticate(kind);
        if self.biometrics.authenticate(&prompt).await? {
            Ok(())
        } else {
            Err(AuthError::BiometricFailed)
        }
    }

    /// Compare `pin` against the stored PIN.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPinFormat`, `AuthError::PinNotSetUp` or
    /// `AuthError::IncorrectPin`.
    #[instrument(skip(self, pin))]
    pub async fn authenticate_with_pin(&self, pin: &SecretString) -> Result<(), AuthError> {
        pin::validate_pin(pin)?;
        let stored = self
            .secure
            .get(secure_keys::USER_PIN)
            .await?
            .ok_or(AuthError::PinNotSetUp)?;
        pin::verify_pin(pin, &stored)
    }

    /// Try biometric unlock and restore the stored user on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored user cannot be read.
    #[instrument(skip(self))]
    pub async fn authenticate_user(&self) -> Result<GateOutcome, AuthError> {
        let availability = self.check_biometric_availability().await;
        if !availability.is_available {
            return Ok(GateOutcome::PinRequired);
        }
        if let Err(e) = self.authenticate_with_biometrics().await {
            tracing::debug!(error = %e, "Biometric unlock failed, PIN required");
            return Ok(GateOutcome::PinRequired);
        }
        match self.restore_stored_user().await? {
            Some(user) => Ok(GateOutcome::Biometric(user)),
            None => Ok(GateOutcome::PinRequired),
        }
    }

    /// PIN path of the unlock gate: verify, then restore the stored user.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`AuthStore::authenticate_with_pin`], or
    /// `AuthError::NotSignedIn` if no user is stored.
    #[instrument(skip(self, pin))]
    pub async fn unlock_with_pin(&self, pin: &SecretString) -> Result<User, AuthError> {
        self.authenticate_with_pin(pin).await?;
        self.restore_stored_user()
            .await?
            .ok_or(AuthError::NotSignedIn)
    }

    /// Verify a sensitive action, such as paying, with the chosen method.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::BiometricUnavailable` if biometrics were chosen but
    /// are not enabled for this app, otherwise the error of the chosen path.
    #[instrument(skip(self, verification))]
    pub async fn verify(&self, verification: &Verification) -> Result<(), AuthError> {
        match verification {
            Verification::Biometric => {
                if !self.check_biometric_availability().await.is_available {
                    return Err(AuthError::BiometricUnavailable);
                }
                self.authenticate_with_biometrics().await
            }
            Verification::Pin(pin) => self.authenticate_with_pin(pin).await,
        }
    }

    /// Read the biometric and PIN setup flags.
    pub async fn is_biometric_setup_complete(&self) -> SetupStatus {
        let biometric = self.secure.get(secure_keys::BIOMETRIC_ENABLED).await;
        let pin = self.secure.get(secure_keys::PIN_ENABLED).await;
        match (biometric, pin) {
            (Ok(biometric), Ok(pin)) => SetupStatus {
                biometric_enabled: biometric.as_deref() == Some(FLAG_TRUE),
                pin_enabled: pin.as_deref() == Some(FLAG_TRUE),
            },
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to read setup flags");
                SetupStatus::default()
            }
        }
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Store a new unlock PIN.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPinFormat` or `AuthError::PinMismatch` for
    /// bad input, `AuthError::Storage` if secure storage fails.
    #[instrument(skip(self, pin, confirmation))]
    pub async fn setup_pin(
        &self,
        pin: &SecretString,
        confirmation: &SecretString,
    ) -> Result<(), AuthError> {
        pin::validate_pin(pin)?;
        pin::validate_pin(confirmation)?;
        if pin.expose_secret() != confirmation.expose_secret() {
            return Err(AuthError::PinMismatch);
        }
        let hash = pin::hash_pin(pin)?;
        self.secure.set(secure_keys::USER_PIN, hash).await?;
        self.secure.set(secure_keys::PIN_ENABLED, FLAG_TRUE).await?;
        tracing::info!("PIN set up");
        Ok(())
    }

    /// Enroll this app for biometric unlock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::BiometricUnavailable` without hardware or
    /// enrollment, `AuthError::BiometricFailed` if the prompt is declined.
    #[instrument(skip(self))]
    pub async fn enable_biometrics(&self) -> Result<BiometricKind, AuthError> {
        if !self.biometrics.has_hardware().await? || !self.biometrics.is_enrolled().await? {
            return Err(AuthError::BiometricUnavailable);
        }
        let kind = self.biometric_kind().await;
        if !self
            .biometrics
            .authenticate(&BiometricPrompt::setup(kind))
            .await?
        {
            return Err(AuthError::BiometricFailed);
        }
        self.secure
            .set(secure_keys::BIOMETRIC_ENABLED, FLAG_TRUE)
            .await?;
        self.secure
            .set(secure_keys::BIOMETRIC_TYPE, kind.as_str())
            .await?;
        tracing::info!(%kind, "Biometric unlock enabled");
        Ok(kind)
    }

    /// Record that the user declined biometric unlock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if secure storage fails.
    #[instrument(skip(self))]
    pub async fn skip_biometrics(&self) -> Result<(), AuthError> {
        self.secure
            .set(secure_keys::BIOMETRIC_ENABLED, FLAG_FALSE)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn role_for(&self, email: &Email) -> UserRole {
        if email.as_str() == self.settings.vendor_email {
            UserRole::Vendor
        } else {
            UserRole::Customer
        }
    }

    async fn simulate_network(&self) {
        if !self.settings.simulated_latency.is_zero() {
            tokio::time::sleep(self.settings.simulated_latency).await;
        }
    }

    async fn start_session(&self, user: User) -> Result<User, AuthError> {
        self.local.set_json(keys::USER, &user).await?;
        self.session.send_replace(AuthSession {
            user: Some(user.clone()),
        });
        tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(user)
    }

    async fn restore_stored_user(&self) -> Result<Option<User>, AuthError> {
        let user = self.local.get_json::<User>(keys::USER).await?;
        if let Some(user) = &user {
            self.session.send_replace(AuthSession {
                user: Some(user.clone()),
            });
        }
        Ok(user)
    }

    async fn probe_biometrics(&self) -> Result<BiometricAvailability, AuthError> {
        let compatible = self.biometrics.has_hardware().await?;
        let enrolled = self.biometrics.is_enrolled().await?;
        let enabled = self.secure.get(secure_keys::BIOMETRIC_ENABLED).await?;
        Ok(BiometricAvailability {
            is_available: compatible && enrolled && enabled.as_deref() == Some(FLAG_TRUE),
            kind: self.biometric_kind().await,
        })
    }

    /// Fingerprint is preferred over facial when both are present.
    async fn biometric_kind(&self) -> BiometricKind {
        match self.biometrics.supported_kinds().await {
            Ok(kinds) if kinds.contains(&BiometricKind::Fingerprint) => BiometricKind::Fingerprint,
            Ok(kinds) if kinds.contains(&BiometricKind::Facial) => BiometricKind::Facial,
            Ok(_) | Err(_) => BiometricKind::None,
        }
    }
}
