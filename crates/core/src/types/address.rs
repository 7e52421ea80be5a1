//! Delivery addresses.

use serde::{Deserialize, Serialize};

use super::AddressId;

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Build an address from a draft under the given id.
    #[must_use]
    pub fn from_draft(id: AddressId, draft: AddressDraft) -> Self {
        Self {
            id,
            street: draft.street,
            city: draft.city,
            state: draft.state,
            country: draft.country,
            zip_code: draft.zip_code,
            is_default: draft.is_default,
        }
    }

    /// Single-line form stored on orders.
    #[must_use]
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.street, self.city, self.state, self.zip_code, self.country
        )
    }
}

/// Address fields as entered on the form, before an id is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressDraft {
    /// Name of the first required field that is blank, if any.
    #[must_use]
    pub fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("zip code", &self.zip_code),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> AddressDraft {
        AddressDraft {
            street: "12 Orchard Lane".to_owned(),
            city: "Hudson".to_owned(),
            state: "NY".to_owned(),
            country: "USA".to_owned(),
            zip_code: "12534".to_owned(),
            is_default: false,
        }
    }

    #[test]
    fn test_one_line() {
        let address = Address::from_draft(AddressId::new("a"), draft());
        assert_eq!(address.one_line(), "12 Orchard Lane, Hudson, NY 12534, USA");
    }

    #[test]
    fn test_first_blank_field() {
        assert_eq!(draft().first_blank_field(), None);

        let mut missing_city = draft();
        missing_city.city = "  ".to_owned();
        assert_eq!(missing_city.first_blank_field(), Some("city"));
    }
}
