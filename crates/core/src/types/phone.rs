//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("phone number must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters other than digits and a leading +.
    #[error("phone number may only contain digits and a leading +")]
    InvalidCharacter,
    /// The input has no digits at all.
    #[error("phone number must contain at least one digit")]
    NoDigits,
}

/// A phone number in international dialing format.
///
/// This type is deliberately permissive: it stores whatever the subscriber
/// gave us, after checking it looks like a dialable number. The SMS provider
/// is the final authority on deliverability.
///
/// ## Constraints
///
/// - Length: 1-20 characters
/// - Optional leading `+`, digits only after that
///
/// ## Examples
///
/// ```
/// use duka_core::Phone;
///
/// assert!(Phone::parse("+254700000001").is_ok());
/// assert!(Phone::parse("0712345678").is_ok());
///
/// assert!(Phone::parse("").is_err());          // empty
/// assert!(Phone::parse("call me").is_err());   // letters
/// assert!(Phone::parse("+").is_err());         // no digits
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Maximum length of a stored phone number.
    pub const MAX_LENGTH: usize = 20;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 20 characters,
    /// contains characters other than digits and a leading `+`, or has no
    /// digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(PhoneError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let rest = s.strip_prefix('+').unwrap_or(s);

        if rest.is_empty() {
            return Err(PhoneError::NoDigits);
        }

        if !rest.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_international_format() {
        let phone = Phone::parse("+254700000001").unwrap();
        assert_eq!(phone.as_str(), "+254700000001");
    }

    #[test]
    fn parses_local_format() {
        assert!(Phone::parse("0712345678").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
    }

    #[test]
    fn rejects_letters() {
        assert!(matches!(
            Phone::parse("+2547abc"),
            Err(PhoneError::InvalidCharacter)
        ));
    }

    #[test]
    fn rejects_bare_plus() {
        assert!(matches!(Phone::parse("+"), Err(PhoneError::NoDigits)));
    }

    #[test]
    fn rejects_interior_plus() {
        assert!(matches!(
            Phone::parse("+254+700"),
            Err(PhoneError::InvalidCharacter)
        ));
    }

    #[test]
    fn rejects_too_long() {
        let long = "1".repeat(Phone::MAX_LENGTH + 1);
        assert!(matches!(
            Phone::parse(&long),
            Err(PhoneError::TooLong { .. })
        ));
    }
}
