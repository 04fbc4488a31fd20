//! Post record - references an author, survives its deletion

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{min_text, required_text, validated_text};
use super::ValidationError;

/// Maximum length for post titles
pub const MAX_TITLE_LEN: usize = 200;

/// Minimum length for post content
pub const MIN_CONTENT_LEN: usize = 50;

validated_text!(
    /// Validated post title
    PostTitle
);

impl PostTitle {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text(s, "title", MAX_TITLE_LEN).map(Self)
    }
}

validated_text!(
    /// Validated post content (at least 50 characters)
    PostContent
);

impl PostContent {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        min_text(s, "content", MIN_CONTENT_LEN).map(Self)
    }
}

/// Persisted post.
///
/// `author_id` is `None` once the author has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// `created_at` is not accepted from editors; the store sets it on insert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub author_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: PostTitle,
    pub content: PostContent,
    pub author_id: Option<i64>,
}

impl PostInput {
    pub fn validate(self) -> Result<NewPost, ValidationError> {
        Ok(NewPost {
            title: PostTitle::new(&self.title)?,
            content: PostContent::new(&self.content)?,
            author_id: self.author_id,
        })
    }
}
