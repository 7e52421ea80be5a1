//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional.
//! - `FARMSTAND_DATA_DIR` - Directory for local and secure storage (default: .farmstand)
//! - `FARMSTAND_CATALOG` - Product catalog JSON file (default: demos/catalog.json)
//! - `FARMSTAND_SIMULATED_LATENCY_MS` - Delay of mocked sign-in calls (default: 1000)
//! - `FARMSTAND_VENDOR_EMAIL` - Address that signs in as a vendor (default: vendor@gmail.com)
//! - `FARMSTAND_OTP_CODE` - One-time code the mock SMS check accepts (default: 123456)
//! - `FARMSTAND_BIOMETRICS` - Simulated sensor: `none`, `accept` or `reject` (default: none)
//! - `FARMSTAND_BIOMETRIC_KIND` - Simulated sensor kind: `fingerprint` or `facial` (default: fingerprint)
//! - `FARMSTAND_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use farmstand_core::{BiometricKind, Email};

use crate::auth::AuthSettings;

const OTP_CODE_LENGTH: usize = 6;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How the simulated biometric sensor answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BiometricMode {
    /// No sensor on this device.
    #[default]
    None,
    /// Sensor accepts every prompt.
    Accept,
    /// Sensor rejects every prompt.
    Reject,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of the storage directories
    pub data_dir: PathBuf,
    /// Product catalog file
    pub catalog_path: PathBuf,
    /// Mocked sign-in backend
    pub auth: AuthSettings,
    /// Simulated biometric sensor behavior
    pub biometrics: BiometricMode,
    /// Simulated biometric sensor kind
    pub biometric_kind: BiometricKind,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let data_dir = PathBuf::from(get_or("FARMSTAND_DATA_DIR", ".farmstand"));
        let catalog_path = PathBuf::from(get_or("FARMSTAND_CATALOG", "demos/catalog.json"));

        let latency_ms = get_or("FARMSTAND_SIMULATED_LATENCY_MS", "1000")
            .parse::<u64>()
            .map_err(|e| invalid("FARMSTAND_SIMULATED_LATENCY_MS", e))?;

        let vendor_email = get_or("FARMSTAND_VENDOR_EMAIL", "vendor@gmail.com");
        let vendor_email = Email::parse(&vendor_email)
            .map_err(|e| invalid("FARMSTAND_VENDOR_EMAIL", e))?
            .to_string();

        let otp_code = SecretString::from(get_or("FARMSTAND_OTP_CODE", "123456"));
        validate_otp_code(&otp_code)?;

        let biometrics = parse_biometric_mode(&get_or("FARMSTAND_BIOMETRICS", "none"))?;
        let biometric_kind = parse_biometric_kind(&get_or("FARMSTAND_BIOMETRIC_KIND", "fingerprint"))?;
        let log_format = parse_log_format(&get_or("FARMSTAND_LOG_FORMAT", "pretty"))?;
        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());

        Ok(Self {
            data_dir,
            catalog_path,
            auth: AuthSettings {
                simulated_latency: Duration::from_millis(latency_ms),
                vendor_email,
                otp_code,
            },
            biometrics,
            biometric_kind,
            log_format,
            sentry_dsn,
        })
    }

    /// Directory of the local key-value store.
    #[must_use]
    pub fn local_dir(&self) -> PathBuf {
        self.data_dir.join("local")
    }

    /// Directory of the secure key-value store.
    #[must_use]
    pub fn secure_dir(&self) -> PathBuf {
        self.data_dir.join("secure")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn invalid(key: &str, err: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), err.to_string())
}

fn validate_otp_code(code: &SecretString) -> Result<(), ConfigError> {
    let value = code.expose_secret();
    if value.chars().count() == OTP_CODE_LENGTH && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(invalid(
            "FARMSTAND_OTP_CODE",
            format!("must be {OTP_CODE_LENGTH} digits"),
        ))
    }
}

fn parse_biometric_mode(value: &str) -> Result<BiometricMode, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "none" | "off" => Ok(BiometricMode::None),
        "accept" => Ok(BiometricMode::Accept),
        "reject" => Ok(BiometricMode::Reject),
        other => Err(invalid(
            "FARMSTAND_BIOMETRICS",
            format!("expected none, accept or reject, got {other}"),
        )),
    }
}

fn parse_biometric_kind(value: &str) -> Result<BiometricKind, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "fingerprint" => Ok(BiometricKind::Fingerprint),
        "facial" | "face" => Ok(BiometricKind::Facial),
        other => Err(invalid(
            "FARMSTAND_BIOMETRIC_KIND",
            format!("expected fingerprint or facial, got {other}"),
        )),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(invalid(
            "FARMSTAND_LOG_FORMAT",
            format!("expected pretty or json, got {other}"),
        )),
    }
}
