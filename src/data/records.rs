//! Normalized comment records consumed by the graph builder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single comment or reply in normalized form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Platform identifier of the comment, unique within a record set
    pub comment_id: String,

    /// Display name of the commenter; graph nodes are keyed on this
    pub author: String,

    #[serde(default)]
    pub comment_text: String,

    #[serde(default)]
    pub comment_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub like_count: Option<i64>,

    /// Comment id this record replies to
    #[serde(default)]
    pub linkage: Option<String>,
}

impl CommentRecord {
    /// Create a top-level comment with no text, date or likes
    pub fn new(comment_id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            comment_id: comment_id.into(),
            author: author.into(),
            comment_text: String::new(),
            comment_date: None,
            like_count: None,
            linkage: None,
        }
    }

    /// Mark this record as a reply to `parent_id`
    pub fn reply_to(mut self, parent_id: impl Into<String>) -> Self {
        self.linkage = Some(parent_id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.comment_text = text.into();
        self
    }

    pub fn with_likes(mut self, likes: i64) -> Self {
        self.like_count = Some(likes);
        self
    }
}
