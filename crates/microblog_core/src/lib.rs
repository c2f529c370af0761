//! Core data layer for the microblog: users, posts and the follow graph.
//! This crate is the single source of truth for storage invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{DatabaseTarget, StoreConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::avatar::gravatar_url;
pub use model::post::{NewPost, Post, PostId};
pub use model::user::{is_valid_nickname, make_valid_nickname, NewUser, User, UserId};
pub use model::validation::ValidationError;
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{PostListQuery, RepoError, RepoResult};
pub use service::post_service::{normalize_post_limit, PostPage, PostService, PostServiceError};
pub use service::user_service::{make_unique_nickname, UserService, UserServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
