//! Address - Type-safe account identifiers
//!
//! Borrowers, the bank itself, token contracts and role holders are all
//! identified by an `Address`. Addresses are case-insensitive and stored
//! lowercased, so `0xABC` and `0xabc` refer to the same account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum accepted address length
pub const MAX_ADDRESS_LEN: usize = 64;

/// Errors that can occur when parsing addresses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Empty address")]
    Empty,

    #[error("Address too long (max {MAX_ADDRESS_LEN} chars): {0}")]
    TooLong(String),

    #[error("Invalid address format: {0}")]
    InvalidFormat(String),
}

/// An account identifier
///
/// # Examples
/// ```
/// use flowbank_core::Address;
///
/// let alice: Address = "Alice".parse().unwrap();
/// assert_eq!(alice.as_str(), "alice");
///
/// assert!("".parse::<Address>().is_err());
/// assert!("no spaces".parse::<Address>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AddressError> {
        raw.as_ref().parse()
    }

    /// Returns the normalized address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        if trimmed.len() > MAX_ADDRESS_LEN {
            return Err(AddressError::TooLong(trimmed.to_string()));
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AddressError::InvalidFormat(trimmed.to_string()));
        }

        Ok(Address(trimmed.to_ascii_lowercase()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_case_insensitive() {
        let a: Address = "0xABCdef".parse().unwrap();
        let b: Address = "0xabcDEF".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0xabcdef");
    }

    #[test]
    fn test_address_trims_whitespace() {
        let a: Address = "  bank  ".parse().unwrap();
        assert_eq!(a.as_str(), "bank");
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert_eq!("".parse::<Address>(), Err(AddressError::Empty));
        assert!(matches!(
            "a".repeat(65).parse::<Address>(),
            Err(AddressError::TooLong(_))
        ));
        assert!(matches!(
            "alice@bank".parse::<Address>(),
            Err(AddressError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_address_serde() {
        let json = "\"Alice\"";
        let parsed: Address = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.as_str(), "alice");
        assert!(serde_json::from_str::<Address>("\"\"").is_err());
    }
}
