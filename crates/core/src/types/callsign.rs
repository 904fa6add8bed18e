//! Callsign type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Callsign`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CallsignError {
    /// The input string is empty.
    #[error("callsign cannot be empty")]
    Empty,
    /// The input string is too short.
    #[error("callsign must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input string is too long.
    #[error("callsign must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-zA-Z0-9]`.
    #[error("callsign may only contain ASCII letters and digits")]
    InvalidCharacter,
}

/// A user-chosen identifier, unique within a deployment.
///
/// Uniqueness is enforced server-side; this type only guarantees the
/// client-side shape.
///
/// ## Constraints
///
/// - Length: 3-30 characters
/// - ASCII letters and digits only
///
/// ## Examples
///
/// ```
/// use rasenmaeher_core::Callsign;
///
/// assert!(Callsign::parse("eagle1").is_ok());
/// assert!(Callsign::parse("OTTER02").is_ok());
///
/// assert!(Callsign::parse("ab").is_err());        // too short
/// assert!(Callsign::parse("eagle one").is_err()); // whitespace
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Callsign(String);

impl Callsign {
    /// Minimum length of a callsign.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum length of a callsign.
    pub const MAX_LENGTH: usize = 30;

    /// Parse a `Callsign` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is shorter than 3 or longer than 30 characters
    /// - Contains anything other than ASCII letters and digits
    pub fn parse(s: &str) -> Result<Self, CallsignError> {
        if s.is_empty() {
            return Err(CallsignError::Empty);
        }

        if s.len() < Self::MIN_LENGTH {
            return Err(CallsignError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(CallsignError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(CallsignError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the callsign as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Callsign` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Callsign {
    type Err = CallsignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Callsign {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
