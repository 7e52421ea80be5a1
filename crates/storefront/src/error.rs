//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that front ends report before showing
//! the user a message. Internal failures are captured to Sentry; input and
//! verification errors are not.

use thiserror::Error;

use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::state::CheckoutError;
use crate::storage::StorageError;
use crate::stores::AddressError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Local or secure storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Address book rejected an edit.
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout did not complete.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this is a failure of the app rather than of the user's input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        match self {
            Self::Storage(_) | Self::Catalog(_) | Self::Config(_) => true,
            Self::Auth(err) | Self::Checkout(CheckoutError::Verification(err)) => {
                auth_is_internal(err)
            }
            Self::Address(_) | Self::Checkout(_) | Self::NotFound(_) | Self::BadRequest(_) => {
                false
            }
        }
    }

    /// Message safe to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        // Don't expose internal error details to users
        match self {
            Self::Storage(_) => "Something went wrong saving your data".to_string(),
            Self::Catalog(_) => "Products are unavailable right now".to_string(),
            Self::Config(err) => err.to_string(),
            Self::Auth(err) | Self::Checkout(CheckoutError::Verification(err)) => {
                auth_message(err)
            }
            Self::Checkout(err) => err.to_string(),
            Self::Address(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Capture internal errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Operation rejected");
        }
    }
}

fn auth_is_internal(err: &AuthError) -> bool {
    matches!(
        err,
        AuthError::Storage(_) | AuthError::PinHash | AuthError::Biometric(_)
    )
}

fn auth_message(err: &AuthError) -> String {
    match err {
        AuthError::Storage(_) | AuthError::PinHash => "Authentication error".to_string(),
        AuthError::Biometric(_) => AuthError::BiometricFailed.to_string(),
        AuthError::InvalidEmail(_) => "Please enter a valid email address".to_string(),
        AuthError::NotSignedIn => "Please sign in first".to_string(),
        other => other.to_string(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_internal_classification() {
        assert!(AppError::Storage(StorageError::Closed).is_internal());
        assert!(AppError::Auth(AuthError::PinHash).is_internal());
        assert!(!AppError::Auth(AuthError::IncorrectPin).is_internal());
        assert!(!AppError::Checkout(CheckoutError::EmptyCart).is_internal());
        assert!(
            AppError::Checkout(CheckoutError::Verification(AuthError::Storage(
                StorageError::Closed
            )))
            .is_internal()
        );
        assert!(!AppError::NotFound("order".to_string()).is_internal());
    }

    #[test]
    fn test_user_messages_hide_internals() {
        let err = AppError::Storage(StorageError::InvalidKey("../etc".to_string()));
        assert!(!err.user_message().contains("etc"));

        assert_eq!(
            AppError::Auth(AuthError::IncorrectPin).user_message(),
            "Incorrect PIN"
        );
        assert_eq!(
            AppError::Checkout(CheckoutError::Verification(AuthError::BiometricFailed))
                .user_message(),
            "Biometric authentication failed. Please use your PIN."
        );
        assert_eq!(
            AppError::NotFound("Order order_1".to_string()).user_message(),
            "Order order_1 not found"
        );
    }

    #[test]
    fn test_report_without_sentry_client() {
        AppError::Storage(StorageError::Closed).report();
        AppError::BadRequest("nope".to_string()).report();
    }
}
