//! Post use-case service.
//!
//! # Responsibility
//! - Publish posts on behalf of existing users.
//! - Serve paginated author timelines and followed-posts feeds.
//!
//! # Invariants
//! - Page size defaults to 20 and is capped at 100.

use crate::model::post::{NewPost, Post, PostId};
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::repo::post_repo::PostRepository;
use crate::repo::{PostListQuery, RepoError};
use crate::service::now_epoch_ms;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const POSTS_DEFAULT_LIMIT: u32 = 20;
const POSTS_LIMIT_MAX: u32 = 100;

#[derive(Debug)]
pub enum PostServiceError {
    Validation(ValidationError),
    AuthorNotFound(UserId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for PostServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::AuthorNotFound(id) => write!(f, "post author not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent post state: {details}"),
        }
    }
}

impl Error for PostServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PostServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UserNotFound(id) => Self::AuthorNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// One page of posts, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPage {
    pub items: Vec<Post>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
    pub offset: u32,
}

pub struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Publishes `body` as `author`, stamped with the current time.
    pub fn publish(
        &self,
        author: UserId,
        body: impl Into<String>,
    ) -> Result<Post, PostServiceError> {
        self.publish_at(author, body, now_epoch_ms())
    }

    /// Publishes `body` as `author` at an explicit epoch-millisecond time.
    pub fn publish_at(
        &self,
        author: UserId,
        body: impl Into<String>,
        timestamp: i64,
    ) -> Result<Post, PostServiceError> {
        let post = NewPost::new(author, body, timestamp);
        let post_id = self.repo.create_post(&post)?;
        info!(
            "event=post_publish module=service status=ok post_id={} user_id={}",
            post_id, author
        );
        self.repo
            .get_post(post_id)?
            .ok_or(PostServiceError::InconsistentState(
                "published post not found in read-back",
            ))
    }

    pub fn get_post(&self, id: PostId) -> Result<Option<Post>, PostServiceError> {
        Ok(self.repo.get_post(id)?)
    }

    /// Posts written by `author`.
    pub fn posts_by(
        &self,
        author: UserId,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<PostPage, PostServiceError> {
        let query = page_query(limit, offset);
        let items = self.repo.list_posts_by_author(author, &query)?;
        Ok(to_page(items, &query))
    }

    /// Posts written by the users `user` follows, newest first.
    pub fn followed_posts(
        &self,
        user: UserId,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<PostPage, PostServiceError> {
        let query = page_query(limit, offset);
        let items = self.repo.followed_posts(user, &query)?;
        Ok(to_page(items, &query))
    }
}

/// Normalizes a requested page size: `None`/`0` use the default, large
/// values are capped.
pub fn normalize_post_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => POSTS_DEFAULT_LIMIT,
        Some(value) => value.min(POSTS_LIMIT_MAX),
    }
}

fn page_query(limit: Option<u32>, offset: u32) -> PostListQuery {
    PostListQuery {
        limit: Some(normalize_post_limit(limit)),
        offset,
    }
}

fn to_page(items: Vec<Post>, query: &PostListQuery) -> PostPage {
    PostPage {
        items,
        applied_limit: query.limit.unwrap_or(POSTS_DEFAULT_LIMIT),
        offset: query.offset,
    }
}
