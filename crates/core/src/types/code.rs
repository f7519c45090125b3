//! Customer account code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`AccountCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum AccountCodeError {
    /// The input string is empty.
    #[error("account code cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("account code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains non-alphanumeric characters.
    #[error("account code may only contain letters and digits")]
    InvalidCharacter,
}

/// A customer's external-facing account code.
///
/// Account codes are short, globally unique identifiers customers quote when
/// contacting support (e.g. `ALC01`). They are stored uppercased so lookups
/// are case-insensitive.
///
/// ## Constraints
///
/// - Length: 1-10 characters
/// - ASCII letters and digits only
///
/// ## Examples
///
/// ```
/// use duka_core::AccountCode;
///
/// let code = AccountCode::parse("alc01").unwrap();
/// assert_eq!(code.as_str(), "ALC01");
///
/// assert!(AccountCode::parse("").is_err());
/// assert!(AccountCode::parse("A-01").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AccountCode(String);

impl AccountCode {
    /// Maximum length of an account code.
    pub const MAX_LENGTH: usize = 10;

    /// Parse an `AccountCode` from a string, uppercasing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 10 characters, or
    /// contains anything other than ASCII letters and digits.
    pub fn parse(s: &str) -> Result<Self, AccountCodeError> {
        if s.is_empty() {
            return Err(AccountCodeError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(AccountCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AccountCodeError::InvalidCharacter);
        }

        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the account code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `AccountCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AccountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccountCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_on_parse() {
        let code = AccountCode::parse("test001").unwrap();
        assert_eq!(code.as_str(), "TEST001");
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(AccountCode::parse(""), Err(AccountCodeError::Empty)));
    }

    #[test]
    fn rejects_punctuation() {
        assert!(matches!(
            AccountCode::parse("AB-01"),
            Err(AccountCodeError::InvalidCharacter)
        ));
    }

    #[test]
    fn rejects_too_long() {
        assert!(matches!(
            AccountCode::parse("ABCDEFGHIJK"),
            Err(AccountCodeError::TooLong { .. })
        ));
    }

    #[test]
    fn max_length_is_accepted() {
        assert!(AccountCode::parse("ABCDEFGHIJ").is_ok());
    }
}
