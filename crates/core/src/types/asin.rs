//! Amazon Standard Identification Number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Asin`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsinError {
    /// The input string is empty.
    #[error("ASIN cannot be empty")]
    Empty,
    /// The input does not have exactly ten characters.
    #[error("ASIN must be exactly {expected} characters (got {len})", expected = Asin::LENGTH)]
    InvalidLength {
        /// Length of the trimmed input.
        len: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9]`.
    #[error("ASIN contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// An Amazon product identifier.
///
/// Both classic ASINs (`B00005N5PF`) and ISBN-10s (`0439136369`) are accepted.
/// The value is trimmed and stored upper-cased so that cache keys compare
/// equal regardless of how an administrator typed them.
///
/// ## Examples
///
/// ```
/// use amazon_product_widget_core::Asin;
///
/// assert_eq!(Asin::parse(" b00005n5pf ").unwrap().as_str(), "B00005N5PF");
/// assert!(Asin::parse("0439136369").is_ok());
///
/// assert!(Asin::parse("").is_err());
/// assert!(Asin::parse("123").is_err());
/// assert!(Asin::parse("B00005N5P!").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Asin(String);

impl Asin {
    /// Number of characters in an ASIN.
    pub const LENGTH: usize = 10;

    /// Parse an `Asin` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, is not exactly ten
    /// characters long, or contains anything other than ASCII letters and digits.
    pub fn parse(s: &str) -> Result<Self, AsinError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(AsinError::Empty);
        }

        if let Some(bad) = s.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(AsinError::InvalidCharacter(bad));
        }

        if s.len() != Self::LENGTH {
            return Err(AsinError::InvalidLength { len: s.len() });
        }

        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the ASIN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Asin` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Asin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Asin {
    type Err = AsinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Asin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_asins() {
        assert!(Asin::parse("B00005N5PF").is_ok());
        assert!(Asin::parse("0439136369").is_ok());
        assert!(Asin::parse("0132350882").is_ok());
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let asin = Asin::parse("\t b00005n5pf \n").unwrap();
        assert_eq!(asin.as_str(), "B00005N5PF");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Asin::parse(""), Err(AsinError::Empty));
        assert_eq!(Asin::parse("   "), Err(AsinError::Empty));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(
            Asin::parse("B00005N5P"),
            Err(AsinError::InvalidLength { len: 9 })
        );
        assert_eq!(
            Asin::parse("B00005N5PFX"),
            Err(AsinError::InvalidLength { len: 11 })
        );
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            Asin::parse("B0000-N5PF"),
            Err(AsinError::InvalidCharacter('-'))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AsinError::InvalidLength { len: 3 }.to_string(),
            "ASIN must be exactly 10 characters (got 3)"
        );
        assert_eq!(
            AsinError::InvalidCharacter('!').to_string(),
            "ASIN contains invalid character '!'"
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let asin = Asin::parse("0439136369").unwrap();
        let json = serde_json::to_string(&asin).unwrap();
        assert_eq!(json, "\"0439136369\"");

        let parsed: Asin = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, asin);
    }

    #[test]
    fn test_from_str_and_display() {
        let asin: Asin = "b00005n5pf".parse().unwrap();
        assert_eq!(format!("{asin}"), "B00005N5PF");
    }
}
