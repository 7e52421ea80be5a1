//! Integration tests for Farmstand.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p farmstand-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `persistence` - Stores reloaded from the file backend
//! - `auth_gate` - Sign-in, PIN and biometric unlock
//! - `checkout_flow` - Browsing through to a placed order
//!
//! Each test gets a [`TestDevice`]: a temporary data directory with a small
//! catalog. Opening the device twice simulates an app restart.

use std::path::{Path, PathBuf};

use farmstand_core::BiometricKind;
use farmstand_storefront::auth::SimulatedBiometrics;
use farmstand_storefront::storage::StorageError;
use farmstand_storefront::{AppConfig, AppError, AppState};
use tempfile::TempDir;

/// Catalog written into every test device.
pub const CATALOG_JSON: &str = r#"[
  {"id": "tomatoes", "name": "Heirloom Tomatoes", "description": "Sweet and juicy", "price": "4.99", "category": "Vegetables", "isLocal": true, "isOrganic": true},
  {"id": "eggs", "name": "Pasture-Raised Eggs", "description": "One dozen", "price": 6.5, "category": "Dairy & Eggs"},
  {"id": "honey", "name": "Raw Honey", "description": "Wildflower honey", "price": "12.00", "category": "Pantry"}
]"#;

/// App state as wired in tests.
pub type TestState = AppState<SimulatedBiometrics>;

/// A simulated device with its own data directory.
#[derive(Debug)]
pub struct TestDevice {
    dir: TempDir,
    config: AppConfig,
}

impl TestDevice {
    /// Create a data directory with the test catalog and no simulated delay.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be prepared.
    pub fn new() -> Result<Self, AppError> {
        let dir = TempDir::new().map_err(StorageError::Io)?;
        let catalog_path = dir.path().join("catalog.json");
        write_catalog(&catalog_path)?;

        let data_dir = dir.path().join("data");
        let config = AppConfig::from_lookup(|key| match key {
            "FARMSTAND_DATA_DIR" => Some(data_dir.display().to_string()),
            "FARMSTAND_CATALOG" => Some(catalog_path.display().to_string()),
            "FARMSTAND_SIMULATED_LATENCY_MS" => Some("0".to_owned()),
            _ => None,
        })?;

        Ok(Self { dir, config })
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// File holding `key` in local storage.
    #[must_use]
    pub fn local_file(&self, key: &str) -> PathBuf {
        self.config.local_dir().join(format!("{key}.json"))
    }

    /// File holding `key` in secure storage.
    #[must_use]
    pub fn secure_file(&self, key: &str) -> PathBuf {
        self.config.secure_dir().join(format!("{key}.json"))
    }

    /// Start the app on this device.
    ///
    /// # Errors
    ///
    /// Returns an error if storage or the catalog cannot be opened.
    pub async fn open(&self, biometrics: SimulatedBiometrics) -> Result<TestState, AppError> {
        AppState::open(&self.config, biometrics).await
    }

    /// Start the app on a device without a biometric sensor.
    ///
    /// # Errors
    ///
    /// Returns an error if storage or the catalog cannot be opened.
    pub async fn open_without_biometrics(&self) -> Result<TestState, AppError> {
        self.open(SimulatedBiometrics::rejecting(BiometricKind::None))
            .await
    }
}

fn write_catalog(path: &Path) -> Result<(), AppError> {
    std::fs::write(path, CATALOG_JSON).map_err(StorageError::Io)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_write_failure_is_storage_error() {
        let missing = Path::new("/nonexistent/farmstand/catalog.json");
        let err = write_catalog(missing).unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::Io(_))));
        assert!(err.is_internal());
    }
}
