// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Non-empty string validation
//!
//! [`NonEmptyString`] guarantees at construction that a value holds at least one
//! non-whitespace character. The client uses it for the settings a request can
//! not be built without: the server host and the API key.
//!
//! ```rust
//! use redash_client::NonEmptyString;
//!
//! let host = NonEmptyString::new("redash.internal").expect("valid host");
//! assert_eq!(host.as_str(), "redash.internal");
//!
//! assert!(NonEmptyString::new("").is_err());
//! assert!(NonEmptyString::new(" \t ").is_err());
//! ```

use core::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// A string that contains at least one non-whitespace character
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct NonEmptyString(Box<str>);

impl NonEmptyString {
    /// Validate and wrap a string
    ///
    /// Leading and trailing whitespace is kept; only blank input is rejected.
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        if s.trim().is_empty() {
            Err("String cannot be empty or whitespace-only".to_string())
        } else {
            Ok(NonEmptyString(s.into_boxed_str()))
        }
    }

    /// Get a string slice of the contained value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NonEmptyString {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejects_blank_input() {
        assert!(NonEmptyString::new("").is_err());
        assert!(NonEmptyString::new("   ").is_err());
        assert!(NonEmptyString::new("\t\n").is_err());
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        let value = NonEmptyString::new(" key ").unwrap();
        assert_eq!(value.as_str(), " key ");
        assert_eq!(value.to_string(), " key ");
    }

    #[test]
    fn parses_and_deserializes() {
        let parsed: NonEmptyString = "redash.internal".parse().unwrap();
        assert_eq!(parsed.as_ref(), "redash.internal");

        let decoded: NonEmptyString = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(decoded.as_str(), "abc");

        let rejected: Result<NonEmptyString, _> = serde_json::from_value(json!(""));
        assert!(rejected.is_err());
    }
}
