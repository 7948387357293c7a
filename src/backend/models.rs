use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signed-in member as issued by the hosted auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Outcome of a sign-up call. Services that require email confirmation
/// create the user without handing out a session.
#[derive(Debug, Clone)]
pub enum SignUp {
    SignedIn(AuthSession),
    ConfirmationRequired(User),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRow {
    pub id: String,
    #[serde(default)]
    pub author_id: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub view_count: Option<i64>,
    #[serde(default)]
    pub like_count: Option<i64>,
    #[serde(default)]
    pub comment_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub board: Option<Board>,
}

/// Title of the post a comment hangs off, embedded by the table API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostTitle {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    #[serde(default)]
    pub author_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub post: Option<PostTitle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub board_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub post_id: String,
    pub author_id: String,
    pub content: String,
}

/// Filters for `posts` reads. Results are always newest first.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub author_id: Option<String>,
    pub limit: Option<usize>,
}

impl PostQuery {
    pub fn latest(limit: usize) -> Self {
        Self {
            author_id: None,
            limit: Some(limit),
        }
    }

    pub fn by_author(author_id: &str) -> Self {
        Self {
            author_id: Some(author_id.to_string()),
            limit: None,
        }
    }
}

/// Filters for `comments` reads. Comments under a post come back oldest
/// first; every other listing is newest first.
#[derive(Debug, Clone)]
pub enum CommentQuery {
    ForPost(String),
    ByAuthor(String),
    Latest(usize),
}
