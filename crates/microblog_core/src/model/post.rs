//! Post domain model.
//!
//! Posts are immutable once stored; there is no update path.

use crate::model::user::UserId;
use crate::model::validation::{
    require_max_chars, require_non_blank, ValidationError, POST_BODY_MAX_CHARS,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned post identifier.
pub type PostId = i64;

/// A post that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub body: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub user_id: UserId,
}

impl NewPost {
    pub fn new(user_id: UserId, body: impl Into<String>, timestamp: i64) -> Self {
        Self {
            body: body.into(),
            timestamp,
            user_id,
        }
    }

    /// Body must be non-blank and at most 140 characters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("body", &self.body)?;
        require_max_chars("body", &self.body, POST_BODY_MAX_CHARS)
    }
}

/// A persisted row of the `post` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub body: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub user_id: UserId,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Post '{}'>", self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::NewPost;
    use crate::model::validation::ValidationError;

    #[test]
    fn body_length_is_counted_in_chars() {
        let post = NewPost::new(1, "é".repeat(140), 0);
        assert!(post.validate().is_ok());

        let post = NewPost::new(1, "é".repeat(141), 0);
        assert!(matches!(
            post.validate(),
            Err(ValidationError::TooLong { field: "body", .. })
        ));
    }

    #[test]
    fn blank_body_is_rejected() {
        let post = NewPost::new(1, "  \n", 0);
        assert_eq!(
            post.validate(),
            Err(ValidationError::Blank { field: "body" })
        );
    }
}
