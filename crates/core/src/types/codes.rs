//! Login and approval code types.
//!
//! Both codes are opaque secrets minted by the backend. The client only
//! normalizes and shape-checks them before sending them anywhere.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`LoginCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginCodeError {
    /// The input string is empty.
    #[error("login code cannot be empty")]
    Empty,
    /// The normalized input is too short.
    #[error("login code must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input contains a character outside `[A-Z0-9]` after normalization.
    #[error("login code may only contain letters and digits")]
    InvalidCharacter,
}

/// An opaque code supplied by a prospective user at login.
///
/// The code is either an admin bootstrap code or an enrollment invite code;
/// the client cannot tell which without asking the backend. Codes are
/// case-insensitive and normalized to uppercase on parse.
///
/// ## Examples
///
/// ```
/// use rasenmaeher_core::LoginCode;
///
/// let code = LoginCode::parse(" abcd1234 ").unwrap();
/// assert_eq!(code.as_str(), "ABCD1234");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct LoginCode(String);

impl LoginCode {
    /// Minimum length of a login code after normalization.
    pub const MIN_LENGTH: usize = 8;

    /// Parse a `LoginCode` from a raw user-supplied string.
    ///
    /// Leading/trailing whitespace is stripped and the code is uppercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized input is empty, shorter than 8
    /// characters, or contains anything other than ASCII letters and digits.
    pub fn parse(raw: &str) -> Result<Self, LoginCodeError> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(LoginCodeError::Empty);
        }

        if normalized.len() < Self::MIN_LENGTH {
            return Err(LoginCodeError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if !normalized.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(LoginCodeError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `LoginCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for LoginCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LoginCode {
    type Err = LoginCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for LoginCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing an [`InviteCodeToken`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InviteCodeTokenError {
    /// The input string is empty.
    #[error("invite code cannot be empty")]
    Empty,
    /// The input contains a character outside `[A-Z0-9]` after normalization.
    #[error("invite code may only contain letters and digits")]
    InvalidCharacter,
}

/// A reusable admin-issued invite-code token.
///
/// Minted by the backend; the client never constructs one from scratch,
/// only round-trips it through the lifecycle endpoints. Unlike
/// [`LoginCode`] there is no length constraint, because the backend owns
/// the format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct InviteCodeToken(String);

impl InviteCodeToken {
    /// Parse an `InviteCodeToken` from a raw string.
    ///
    /// Leading/trailing whitespace is stripped and the token is uppercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized input is empty or contains
    /// anything other than ASCII letters and digits.
    pub fn parse(raw: &str) -> Result<Self, InviteCodeTokenError> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(InviteCodeTokenError::Empty);
        }

        if !normalized.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InviteCodeTokenError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `InviteCodeToken` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for InviteCodeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for InviteCodeToken {
    type Err = InviteCodeTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for InviteCodeToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing an [`ApprovalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApprovalCodeError {
    /// The input string is empty.
    #[error("approval code cannot be empty")]
    Empty,
    /// The normalized input is not exactly 8 characters.
    #[error("approval code must be exactly {expected} characters")]
    WrongLength {
        /// Expected length.
        expected: usize,
    },
    /// The input contains a character outside `[A-Z0-9]` after normalization.
    #[error("approval code may only contain letters and digits")]
    InvalidCharacter,
}

/// A per-enrollee one-time secret used by an admin to authenticate the
/// approval of that specific pending user.
///
/// Distinct from the invite code: the invite code admits a user into the
/// pending queue, the approval code proves the in-person/QR handoff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ApprovalCode(String);

impl ApprovalCode {
    /// Exact length of an approval code.
    pub const LENGTH: usize = 8;

    /// Parse an `ApprovalCode` from a raw string.
    ///
    /// Leading/trailing whitespace is stripped and the code is uppercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized input is empty, not exactly 8
    /// characters, or contains anything other than ASCII letters and digits.
    pub fn parse(raw: &str) -> Result<Self, ApprovalCodeError> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(ApprovalCodeError::Empty);
        }

        if normalized.len() != Self::LENGTH {
            return Err(ApprovalCodeError::WrongLength {
                expected: Self::LENGTH,
            });
        }

        if !normalized.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ApprovalCodeError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ApprovalCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ApprovalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ApprovalCode {
    type Err = ApprovalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ApprovalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_code_normalizes_case_and_whitespace() {
        let code = LoginCode::parse("  abcd1234\n").unwrap();
        assert_eq!(code.as_str(), "ABCD1234");
    }

    #[test]
    fn test_login_code_minimum_length() {
        assert!(matches!(
            LoginCode::parse("abc123"),
            Err(LoginCodeError::TooShort { min: 8 })
        ));
        assert!(LoginCode::parse("abcd1234").is_ok());
    }

    #[test]
    fn test_login_code_rejects_symbols() {
        assert!(matches!(
            LoginCode::parse("abcd-1234"),
            Err(LoginCodeError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_login_code_empty() {
        assert!(matches!(LoginCode::parse("   "), Err(LoginCodeError::Empty)));
    }

    #[test]
    fn test_invite_code_token_normalizes() {
        let token = InviteCodeToken::parse(" code123x\n").unwrap();
        assert_eq!(token.as_str(), "CODE123X");
    }

    #[test]
    fn test_invite_code_token_rejects_empty_and_symbols() {
        assert!(matches!(
            InviteCodeToken::parse("  "),
            Err(InviteCodeTokenError::Empty)
        ));
        assert!(matches!(
            InviteCodeToken::parse("code-123"),
            Err(InviteCodeTokenError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_invite_code_token_has_no_length_floor() {
        assert!(InviteCodeToken::parse("AB1").is_ok());
    }

    #[test]
    fn test_approval_code_exact_length() {
        assert!(ApprovalCode::parse("zzz999aa").is_ok());
        assert!(matches!(
            ApprovalCode::parse("zzz999"),
            Err(ApprovalCodeError::WrongLength { expected: 8 })
        ));
        assert!(matches!(
            ApprovalCode::parse("zzz999aabb"),
            Err(ApprovalCodeError::WrongLength { expected: 8 })
        ));
    }

    #[test]
    fn test_approval_code_normalizes() {
        let code = ApprovalCode::parse(" zzz999aa ").unwrap();
        assert_eq!(code.as_str(), "ZZZ999AA");
    }

    #[test]
    fn test_approval_code_rejects_symbols() {
        assert!(matches!(
            ApprovalCode::parse("zzz-99aa"),
            Err(ApprovalCodeError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let code = LoginCode::parse("ABCD1234").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"ABCD1234\"");

        let parsed: LoginCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
    }
}
