//! User domain model.
//!
//! # Responsibility
//! - Define the `user` record and its unsaved counterpart.
//! - Provide nickname normalization and avatar helpers.
//!
//! # Invariants
//! - `nickname` matches `[A-Za-z0-9_.]+` and is at most 64 chars.
//! - `email` is at most 120 chars, `about_me` at most 140 chars.
//! - Uniqueness of nickname/email is enforced by storage, not here.

use crate::model::avatar::gravatar_url;
use crate::model::validation::{
    require_max_chars, require_non_blank, ValidationError, ABOUT_ME_MAX_CHARS, EMAIL_MAX_CHARS,
    NICKNAME_MAX_CHARS,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned user identifier.
pub type UserId = i64;

static NICKNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("valid nickname regex"));
static NICKNAME_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.]").expect("valid nickname strip regex"));

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub nickname: String,
    pub email: String,
    pub about_me: Option<String>,
    /// Unix epoch milliseconds.
    pub last_seen: Option<i64>,
}

impl NewUser {
    /// Creates an unsaved user with no bio and no last-seen time.
    pub fn new(nickname: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            email: email.into(),
            about_me: None,
            last_seen: None,
        }
    }

    /// Gravatar URL for this user's email at `size` pixels.
    pub fn avatar(&self, size: u32) -> String {
        gravatar_url(&self.email, size)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_profile(&self.nickname, &self.email, self.about_me.as_deref())
    }

    /// Attaches a storage id, producing the persisted shape.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            nickname: self.nickname,
            email: self.email,
            about_me: self.about_me,
            last_seen: self.last_seen,
        }
    }
}

/// A persisted row of the `user` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub nickname: String,
    pub email: String,
    pub about_me: Option<String>,
    /// Unix epoch milliseconds.
    pub last_seen: Option<i64>,
}

impl User {
    /// Gravatar URL for this user's email at `size` pixels.
    pub fn avatar(&self, size: u32) -> String {
        gravatar_url(&self.email, size)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_profile(&self.nickname, &self.email, self.about_me.as_deref())
    }

    /// Identity string used as a login-session key.
    pub fn session_id(&self) -> String {
        self.id.to_string()
    }

    /// Stored users always hold valid credentials.
    pub fn is_authenticated(&self) -> bool {
        true
    }

    /// Accounts are never deactivated.
    pub fn is_active(&self) -> bool {
        true
    }

    pub fn is_anonymous(&self) -> bool {
        false
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<User '{}'>", self.nickname)
    }
}

/// Returns whether `nickname` is non-empty and uses only `[A-Za-z0-9_.]`.
pub fn is_valid_nickname(nickname: &str) -> bool {
    NICKNAME_RE.is_match(nickname)
}

/// Strips every character outside `[A-Za-z0-9_.]`.
///
/// The result may be empty; callers decide on a fallback.
pub fn make_valid_nickname(raw: &str) -> String {
    NICKNAME_STRIP_RE.replace_all(raw, "").into_owned()
}

fn validate_profile(
    nickname: &str,
    email: &str,
    about_me: Option<&str>,
) -> Result<(), ValidationError> {
    require_non_blank("nickname", nickname)?;
    require_max_chars("nickname", nickname, NICKNAME_MAX_CHARS)?;
    if !is_valid_nickname(nickname) {
        return Err(ValidationError::InvalidNickname(nickname.to_string()));
    }

    require_non_blank("email", email)?;
    require_max_chars("email", email, EMAIL_MAX_CHARS)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(ValidationError::InvalidEmail(email.to_string())),
    }

    if let Some(about_me) = about_me {
        require_max_chars("about_me", about_me, ABOUT_ME_MAX_CHARS)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{is_valid_nickname, make_valid_nickname, NewUser};
    use crate::model::validation::ValidationError;

    #[test]
    fn strip_keeps_allowed_characters() {
        assert_eq!(make_valid_nickname("jo hn!_doe.99"), "john_doe.99");
        assert_eq!(make_valid_nickname("☃☃"), "");
    }

    #[test]
    fn nickname_pattern_rejects_spaces_and_empty() {
        assert!(is_valid_nickname("john.doe_2"));
        assert!(!is_valid_nickname("john doe"));
        assert!(!is_valid_nickname(""));
    }

    #[test]
    fn validate_reports_first_failing_field() {
        let mut user = NewUser::new("john", "not-an-email");
        assert!(matches!(
            user.validate(),
            Err(ValidationError::InvalidEmail(_))
        ));

        user.email = "john@example.com".to_string();
        user.about_me = Some("x".repeat(141));
        assert!(matches!(
            user.validate(),
            Err(ValidationError::TooLong {
                field: "about_me",
                max_chars: 140,
                actual_chars: 141,
            })
        ));
    }
}
