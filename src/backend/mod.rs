//! Access to the hosted auth/table service.
//!
//! Everything the board stores lives in the hosted service; this module is
//! the only place that talks to it. Handlers hold an `Arc<dyn Backend>` so
//! the live REST client and the in-memory stand-in are interchangeable.

pub mod memory;
pub mod models;
pub mod rest;

use async_trait::async_trait;

pub use memory::MemoryBackend;
pub use models::{
    AuthSession, Board, CommentQuery, CommentRow, NewComment, NewPost, PostQuery, PostRow,
    SignUp, User,
};
pub use rest::RestBackend;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The auth service rejected the request; carries its message.
    #[error("{0}")]
    Auth(String),

    #[error("Row not found")]
    NotFound,

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait Backend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession>;

    async fn sign_up(&self, email: &str, password: &str, nickname: &str)
        -> BackendResult<SignUp>;

    async fn refresh(&self, refresh_token: &str) -> BackendResult<AuthSession>;

    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;

    /// Boards whose slug is one of `slugs`, ordered by name.
    async fn list_boards(&self, slugs: &[&str]) -> BackendResult<Vec<Board>>;

    async fn list_posts(&self, query: PostQuery) -> BackendResult<Vec<PostRow>>;

    async fn get_post(&self, id: &str) -> BackendResult<PostRow>;

    async fn create_post(&self, access_token: Option<&str>, post: NewPost) -> BackendResult<()>;

    async fn list_comments(&self, query: CommentQuery) -> BackendResult<Vec<CommentRow>>;

    async fn create_comment(&self, access_token: &str, comment: NewComment)
        -> BackendResult<()>;
}
