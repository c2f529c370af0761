//! Domain model for users, posts and the follow graph.
//!
//! # Responsibility
//! - Define the records persisted in `user` and `post`.
//! - Own field-level validation shared by repositories and services.
//!
//! # Invariants
//! - Identifiers are assigned by storage; `New*` types carry no id.
//! - Follow edges have no model type; they live only in `followers`.

pub mod avatar;
pub mod post;
pub mod user;
pub mod validation;
