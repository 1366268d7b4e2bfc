use std::fmt;

use serde::{Deserialize, Serialize};

/// What the backend lists in place of a comment a moderator removed.
pub const REMOVED_BY_MODERATOR: &str = "COMMENT REMOVED BY MODERATOR";

/// Redacted comments are listed as this character repeated once per
/// character of the original text.
pub const REDACTION_MARK: char = '█';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Moderation {
    Visible,
    Removed,
    Redacted,
}

impl fmt::Display for Moderation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Moderation::Visible => f.write_str("visible"),
            Moderation::Removed => f.write_str("removed"),
            Moderation::Redacted => f.write_str("redacted"),
        }
    }
}

/// A comment as the backend lists it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user: String,
    pub content: String,
    #[serde(
        rename = "parentId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Moderation state, read off the text the backend substituted.
    pub fn moderation(&self) -> Moderation {
        if self.content == REMOVED_BY_MODERATOR {
            Moderation::Removed
        } else if !self.content.is_empty() && self.content.chars().all(|c| c == REDACTION_MARK) {
            Moderation::Redacted
        } else {
            Moderation::Visible
        }
    }
}

/// Body of `POST /api/comments`. `parentId` is always sent, as `null` for a
/// top level comment.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CommentRequest {
    #[serde(rename = "articleTitle")]
    pub article_title: String,
    pub content: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
}

impl CommentRequest {
    pub fn new(article_title: &str, content: &str, parent_id: Option<&str>) -> Self {
        Self {
            article_title: article_title.to_owned(),
            content: content.to_owned(),
            parent_id: parent_id.map(str::to_owned),
        }
    }
}

/// Count shown next to an article; a missing count reads as zero.
pub fn format_comment_count(count: Option<u64>) -> u64 {
    count.unwrap_or(0)
}
