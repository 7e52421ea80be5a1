//! Signed-in user record.

use serde::{Deserialize, Serialize};

use super::{Email, UserId, UserRole};

/// The single active user on this device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    /// First and last name joined, without a trailing space when the last
    /// name is empty.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    #[must_use]
    pub fn is_vendor(&self) -> bool {
        self.role == UserRole::Vendor
    }
}
