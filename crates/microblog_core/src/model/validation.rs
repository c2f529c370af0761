//! Field validation errors shared by user and post models.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum nickname length in characters.
pub const NICKNAME_MAX_CHARS: usize = 64;
/// Maximum email length in characters.
pub const EMAIL_MAX_CHARS: usize = 120;
/// Maximum `about_me` length in characters.
pub const ABOUT_ME_MAX_CHARS: usize = 140;
/// Maximum post body length in characters.
pub const POST_BODY_MAX_CHARS: usize = 140;

/// A model field failed validation before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty or whitespace-only.
    Blank { field: &'static str },
    /// Field exceeds its character budget.
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Nickname contains characters outside `[A-Za-z0-9_.]`.
    InvalidNickname(String),
    /// Email does not look like `local@domain`.
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "{field} cannot be blank"),
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} must be at most {max_chars} characters, got {actual_chars}"
            ),
            Self::InvalidNickname(value) => write!(
                f,
                "nickname `{value}` may only contain letters, digits, `_` and `.`"
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

pub(crate) fn require_max_chars(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}
