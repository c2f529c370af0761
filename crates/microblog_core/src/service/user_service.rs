//! User use-case service.
//!
//! # Responsibility
//! - Register users under a unique, valid nickname.
//! - Manage the follow graph and profile fields.
//!
//! # Invariants
//! - Registered users always follow themselves, so their own posts appear
//!   in their followed-posts feed. The user row and the self-follow edge are
//!   written in one transaction.
//! - Nickname allocation never returns a nickname present in storage at the
//!   time of the lookup; a concurrent insert of the same candidate is caught
//!   by the UNIQUE constraint and retried.

use crate::model::user::{make_valid_nickname, NewUser, User, UserId};
use crate::model::validation::{ValidationError, NICKNAME_MAX_CHARS};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::now_epoch_ms;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_REGISTER_ATTEMPTS: u32 = 5;
const FALLBACK_NICKNAME: &str = "user";

/// Service error for user use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    Validation(ValidationError),
    /// Exact nickname requested by the caller is already stored.
    NicknameTaken(String),
    EmailTaken(String),
    UserNotFound(UserId),
    /// Every allocation attempt lost a race for its candidate nickname.
    NicknameExhausted(String),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NicknameTaken(nickname) => write!(f, "nickname `{nickname}` is already taken"),
            Self::EmailTaken(email) => write!(f, "email `{email}` is already registered"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::NicknameExhausted(base) => write!(
                f,
                "could not allocate a unique nickname for `{base}` after {MAX_REGISTER_ATTEMPTS} attempts"
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent user state: {details}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UserNotFound(id) => Self::UserNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Returns `nickname` if unused, otherwise the first free `nickname2`,
/// `nickname3`, ... candidate.
///
/// Candidates stay within the nickname length limit by truncating the base
/// before appending the suffix.
pub fn make_unique_nickname<R>(repo: &R, nickname: &str) -> RepoResult<String>
where
    R: UserRepository + ?Sized,
{
    if !repo.nickname_exists(nickname)? {
        return Ok(nickname.to_string());
    }

    let mut version: u64 = 2;
    loop {
        let candidate = nickname_with_suffix(nickname, version);
        if !repo.nickname_exists(&candidate)? {
            return Ok(candidate);
        }
        version += 1;
    }
}

fn nickname_with_suffix(base: &str, version: u64) -> String {
    let suffix = version.to_string();
    let room = NICKNAME_MAX_CHARS.saturating_sub(suffix.len());
    let mut candidate: String = base.chars().take(room).collect();
    candidate.push_str(&suffix);
    candidate
}

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Suggests a free nickname derived from `nickname`.
    pub fn make_unique_nickname(&self, nickname: &str) -> Result<String, UserServiceError> {
        Ok(make_unique_nickname(&self.repo, nickname)?)
    }

    /// Registers a user, deriving a valid unique nickname from `nickname`.
    ///
    /// Characters outside `[A-Za-z0-9_.]` are dropped; an empty result falls
    /// back to `user`. The new user follows themselves.
    pub fn register(&self, nickname: &str, email: &str) -> Result<User, UserServiceError> {
        let mut base = make_valid_nickname(nickname);
        if base.is_empty() {
            base = FALLBACK_NICKNAME.to_string();
        }
        let base: String = base.chars().take(NICKNAME_MAX_CHARS).collect();

        for attempt in 1..=MAX_REGISTER_ATTEMPTS {
            let candidate = make_unique_nickname(&self.repo, &base)?;
            let new_user = NewUser::new(candidate, email);
            match self.repo.create_user_following_self(&new_user) {
                Ok(id) => {
                    info!(
                        "event=user_register module=service status=ok user_id={} attempt={}",
                        id, attempt
                    );
                    return Ok(new_user.into_user(id));
                }
                Err(RepoError::Duplicate { field: "nickname" }) => {
                    warn!(
                        "event=user_register module=service status=retry attempt={} reason=nickname_race",
                        attempt
                    );
                }
                Err(RepoError::Duplicate { field: "email" }) => {
                    return Err(UserServiceError::EmailTaken(email.to_string()));
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(UserServiceError::NicknameExhausted(base))
    }

    /// Inserts `user` exactly as given, without nickname allocation.
    pub fn create_user(&self, user: &NewUser) -> Result<User, UserServiceError> {
        match self.repo.create_user(user) {
            Ok(id) => Ok(user.clone().into_user(id)),
            Err(RepoError::Duplicate { field: "nickname" }) => {
                Err(UserServiceError::NicknameTaken(user.nickname.clone()))
            }
            Err(RepoError::Duplicate { field: "email" }) => {
                Err(UserServiceError::EmailTaken(user.email.clone()))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>, UserServiceError> {
        Ok(self.repo.get_user(id)?)
    }

    pub fn find_by_nickname(&self, nickname: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repo.find_by_nickname(nickname)?)
    }

    /// Replaces the bio of one user; `None` clears it.
    pub fn update_about_me(
        &self,
        id: UserId,
        about_me: Option<String>,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .repo
            .get_user(id)?
            .ok_or(UserServiceError::UserNotFound(id))?;
        user.about_me = about_me;
        self.repo.update_user(&user)?;
        self.repo
            .get_user(id)?
            .ok_or(UserServiceError::InconsistentState(
                "updated user not found in read-back",
            ))
    }

    /// Stamps `last_seen` with the current time.
    pub fn record_seen(&self, id: UserId) -> Result<(), UserServiceError> {
        self.record_seen_at(id, now_epoch_ms())
    }

    pub fn record_seen_at(&self, id: UserId, seen_at: i64) -> Result<(), UserServiceError> {
        Ok(self.repo.touch_last_seen(id, seen_at)?)
    }

    /// Makes `follower` follow `followed`. Returns `false` when the edge
    /// already existed.
    pub fn follow(&self, follower: UserId, followed: UserId) -> Result<bool, UserServiceError> {
        let added = self.repo.follow(follower, followed)?;
        info!(
            "event=follow module=service status=ok follower_id={} followed_id={} changed={}",
            follower, followed, added
        );
        Ok(added)
    }

    /// Removes the edge if present; unfollowing a non-followed user is a no-op
    /// that returns `false`.
    pub fn unfollow(&self, follower: UserId, followed: UserId) -> Result<bool, UserServiceError> {
        let removed = self.repo.unfollow(follower, followed)?;
        info!(
            "event=unfollow module=service status=ok follower_id={} followed_id={} changed={}",
            follower, followed, removed
        );
        Ok(removed)
    }

    pub fn is_following(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<bool, UserServiceError> {
        Ok(self.repo.is_following(follower, followed)?)
    }

    pub fn followed(&self, user: UserId) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repo.list_followed(user)?)
    }

    pub fn followers(&self, user: UserId) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repo.list_followers(user)?)
    }

    /// `(followed, followers)` edge counts, self-follow included.
    pub fn follow_counts(&self, user: UserId) -> Result<(u64, u64), UserServiceError> {
        Ok((
            self.repo.count_followed(user)?,
            self.repo.count_followers(user)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::nickname_with_suffix;
    use crate::model::validation::NICKNAME_MAX_CHARS;

    #[test]
    fn suffix_is_appended_to_short_bases() {
        assert_eq!(nickname_with_suffix("john", 2), "john2");
        assert_eq!(nickname_with_suffix("john", 17), "john17");
    }

    #[test]
    fn long_bases_are_truncated_to_fit_suffix() {
        let base = "a".repeat(NICKNAME_MAX_CHARS);
        let candidate = nickname_with_suffix(&base, 12);
        assert_eq!(candidate.chars().count(), NICKNAME_MAX_CHARS);
        assert!(candidate.ends_with("12"));
    }
}
