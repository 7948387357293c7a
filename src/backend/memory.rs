//! In-process stand-in for the hosted service.
//!
//! Mirrors what the board observes from the real service (password
//! sign-in, nickname metadata, three seeded boards, newest-first listings)
//! so the router can run without network access. Counters are left as
//! the rows were created.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::{
    AuthSession, Backend, BackendError, BackendResult, Board, CommentQuery, CommentRow,
    NewComment, NewPost, PostQuery, PostRow, SignUp, User,
};
use super::models::PostTitle;

const TOKEN_TTL_SECS: i64 = 3600;

struct Account {
    password: String,
    user: User,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    /// access token -> (user id, expiry)
    access_tokens: HashMap<String, (String, DateTime<Utc>)>,
    /// refresh token -> user id
    refresh_tokens: HashMap<String, String>,
    boards: Vec<Board>,
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
}

pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// A backend holding the notice/free/tips boards and nothing else.
    pub fn new() -> Self {
        let boards = [("notice", "공지사항"), ("free", "자유게시판"), ("tips", "꿀팁")]
            .iter()
            .map(|(slug, name)| Board {
                id: uuid::Uuid::now_v7().to_string(),
                slug: slug.to_string(),
                name: name.to_string(),
            })
            .collect();

        Self {
            inner: Mutex::new(Inner {
                boards,
                ..Inner::default()
            }),
        }
    }

    /// Register a confirmed account directly, bypassing sign-up.
    pub async fn add_user(
        &self,
        email: &str,
        password: &str,
        nickname: &str,
        is_admin: bool,
    ) -> User {
        let user = User {
            id: uuid::Uuid::now_v7().to_string(),
            email: Some(email.to_string()),
            nickname: Some(nickname.to_string()),
            is_admin,
        };

        let mut inner = self.inner.lock().await;
        inner.accounts.insert(
            email.to_lowercase(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    /// Drop every board, as if the lookup table had not been populated.
    pub async fn clear_boards(&self) {
        self.inner.lock().await.boards.clear();
    }

    /// Expire an access token immediately. Its refresh token stays valid.
    pub async fn expire_access_token(&self, access_token: &str) {
        let mut inner = self.inner.lock().await;
        if let Some((_, expires_at)) = inner.access_tokens.get_mut(access_token) {
            *expires_at = Utc::now() - Duration::seconds(1);
        }
    }

    pub async fn post_count(&self) -> usize {
        self.inner.lock().await.posts.len()
    }
}

impl Inner {
    fn issue_session(&mut self, user: User) -> AuthSession {
        let access_token = crate::auth::session::generate_token();
        let refresh_token = crate::auth::session::generate_token();
        let now = Utc::now();
        let expires_at = now + Duration::seconds(TOKEN_TTL_SECS);

        // Superseded tokens are useless once expired.
        self.access_tokens.retain(|_, (_, expiry)| *expiry > now);
        self.access_tokens
            .insert(access_token.clone(), (user.id.clone(), expires_at));
        self.refresh_tokens
            .insert(refresh_token.clone(), user.id.clone());

        AuthSession {
            access_token,
            refresh_token,
            expires_at,
            user,
        }
    }

    fn user_by_id(&self, id: &str) -> Option<User> {
        self.accounts
            .values()
            .find(|account| account.user.id == id)
            .map(|account| account.user.clone())
    }

    /// Resolve a bearer token the way row-level security would.
    fn authorize(&self, access_token: &str) -> BackendResult<String> {
        match self.access_tokens.get(access_token) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(user_id.clone()),
            _ => Err(BackendError::Status {
                status: 401,
                message: "JWT expired".to_string(),
            }),
        }
    }

    fn with_post_title(&self, mut comment: CommentRow) -> CommentRow {
        comment.post = self
            .posts
            .iter()
            .find(|post| post.id == comment.post_id)
            .map(|post| PostTitle {
                title: post.title.clone(),
            });
        comment
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let mut inner = self.inner.lock().await;
        let user = match inner.accounts.get(&email.trim().to_lowercase()) {
            Some(account) if account.password == password => account.user.clone(),
            _ => return Err(BackendError::Auth("Invalid login credentials".to_string())),
        };
        Ok(inner.issue_session(user))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        nickname: &str,
    ) -> BackendResult<SignUp> {
        let key = email.trim().to_lowercase();
        let mut inner = self.inner.lock().await;
        if inner.accounts.contains_key(&key) {
            return Err(BackendError::Auth("User already registered".to_string()));
        }
        if password.chars().count() < 6 {
            return Err(BackendError::Auth(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let user = User {
            id: uuid::Uuid::now_v7().to_string(),
            email: Some(email.trim().to_string()),
            nickname: Some(nickname.to_string()),
            is_admin: false,
        };
        inner.accounts.insert(
            key,
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        Ok(SignUp::SignedIn(inner.issue_session(user)))
    }

    async fn refresh(&self, refresh_token: &str) -> BackendResult<AuthSession> {
        let mut inner = self.inner.lock().await;
        let user_id = inner
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| BackendError::Auth("Invalid Refresh Token".to_string()))?;
        let user = inner
            .user_by_id(&user_id)
            .ok_or_else(|| BackendError::Auth("User not found".to_string()))?;
        Ok(inner.issue_session(user))
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let mut inner = self.inner.lock().await;
        let user_id = inner.authorize(access_token)?;
        inner.access_tokens.retain(|_, (owner, _)| *owner != user_id);
        inner.refresh_tokens.retain(|_, owner| *owner != user_id);
        Ok(())
    }

    async fn list_boards(&self, slugs: &[&str]) -> BackendResult<Vec<Board>> {
        let inner = self.inner.lock().await;
        let mut boards: Vec<Board> = inner
            .boards
            .iter()
            .filter(|board| slugs.contains(&board.slug.as_str()))
            .cloned()
            .collect();
        boards.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(boards)
    }

    async fn list_posts(&self, query: PostQuery) -> BackendResult<Vec<PostRow>> {
        let inner = self.inner.lock().await;
        let mut posts: Vec<PostRow> = inner
            .posts
            .iter()
            .filter(|post| match &query.author_id {
                Some(author_id) => post.author_id.as_deref() == Some(author_id.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            posts.truncate(limit);
        }
        Ok(posts)
    }

    async fn get_post(&self, id: &str) -> BackendResult<PostRow> {
        let inner = self.inner.lock().await;
        inner
            .posts
            .iter()
            .find(|post| post.id == id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn create_post(&self, access_token: Option<&str>, post: NewPost) -> BackendResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(token) = access_token {
            inner.authorize(token)?;
        }

        let board = inner
            .boards
            .iter()
            .find(|board| board.id == post.board_id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 409,
                message: "insert or update on table \"posts\" violates foreign key constraint"
                    .to_string(),
            })?;

        inner.posts.push(PostRow {
            id: uuid::Uuid::now_v7().to_string(),
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            tags: Some(post.tags),
            view_count: Some(0),
            like_count: Some(0),
            comment_count: Some(0),
            created_at: Utc::now(),
            board: Some(board),
        });
        Ok(())
    }

    async fn list_comments(&self, query: CommentQuery) -> BackendResult<Vec<CommentRow>> {
        let inner = self.inner.lock().await;
        let mut comments: Vec<CommentRow> = match &query {
            CommentQuery::ForPost(post_id) => inner
                .comments
                .iter()
                .filter(|c| &c.post_id == post_id)
                .cloned()
                .collect(),
            CommentQuery::ByAuthor(author_id) => inner
                .comments
                .iter()
                .filter(|c| c.author_id.as_deref() == Some(author_id.as_str()))
                .cloned()
                .collect(),
            CommentQuery::Latest(_) => inner.comments.clone(),
        };

        match query {
            CommentQuery::ForPost(_) => comments.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            _ => comments.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        if let CommentQuery::Latest(limit) = query {
            comments.truncate(limit);
        }

        Ok(comments
            .into_iter()
            .map(|comment| inner.with_post_title(comment))
            .collect())
    }

    async fn create_comment(&self, access_token: &str, comment: NewComment) -> BackendResult<()> {
        let mut inner = self.inner.lock().await;
        inner.authorize(access_token)?;
        if !inner.posts.iter().any(|post| post.id == comment.post_id) {
            return Err(BackendError::Status {
                status: 409,
                message: "insert or update on table \"comments\" violates foreign key constraint"
                    .to_string(),
            });
        }

        inner.comments.push(CommentRow {
            id: uuid::Uuid::now_v7().to_string(),
            post_id: comment.post_id,
            author_id: Some(comment.author_id),
            content: comment.content,
            created_at: Utc::now(),
            post: None,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(board: &Board, title: &str, author: Option<&str>) -> NewPost {
        NewPost {
            board_id: board.id.clone(),
            author_id: author.map(str::to_string),
            title: title.to_string(),
            content: format!("{} 본문", title),
            tags: vec!["홀덤".to_string()],
        }
    }

    #[tokio::test]
    async fn seeds_three_boards() {
        let backend = MemoryBackend::new();
        let boards = backend.list_boards(&["notice", "free", "tips"]).await.unwrap();
        assert_eq!(boards.len(), 3);
        assert!(backend.list_boards(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn refresh_prunes_expired_access_tokens() {
        let backend = MemoryBackend::new();
        backend.add_user("r@example.com", "secret1", "알", false).await;
        let mut session = backend.sign_in("r@example.com", "secret1").await.unwrap();

        for _ in 0..5 {
            backend.expire_access_token(&session.access_token).await;
            session = backend.refresh(&session.refresh_token).await.unwrap();
        }

        let inner = backend.inner.lock().await;
        assert_eq!(inner.access_tokens.len(), 1);
        assert!(inner.access_tokens.contains_key(&session.access_token));
    }

    #[tokio::test]
    async fn sign_in_checks_password() {
        let backend = MemoryBackend::new();
        backend.add_user("a@example.com", "secret1", "에이", false).await;

        assert!(backend.sign_in("a@example.com", "secret1").await.is_ok());
        let err = backend.sign_in("a@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, BackendError::Auth(_)));
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_rejected() {
        let backend = MemoryBackend::new();
        backend.sign_up("b@example.com", "secret1", "비").await.unwrap();
        let err = backend
            .sign_up("B@example.com", "secret1", "비")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User already registered");
    }

    #[tokio::test]
    async fn posts_come_back_newest_first() {
        let backend = MemoryBackend::new();
        let free = backend.list_boards(&["free"]).await.unwrap().remove(0);
        backend.create_post(None, new_post(&free, "첫 글", None)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        backend.create_post(None, new_post(&free, "둘째 글", None)).await.unwrap();

        let posts = backend.list_posts(PostQuery::default()).await.unwrap();
        assert_eq!(posts[0].title, "둘째 글");
        assert_eq!(posts[1].title, "첫 글");

        let limited = backend.list_posts(PostQuery::latest(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn comment_requires_live_token() {
        let backend = MemoryBackend::new();
        backend.add_user("c@example.com", "secret1", "씨", false).await;
        let session = backend.sign_in("c@example.com", "secret1").await.unwrap();
        let free = backend.list_boards(&["free"]).await.unwrap().remove(0);
        backend
            .create_post(
                Some(session.access_token.as_str()),
                new_post(&free, "글", Some(session.user.id.as_str())),
            )
            .await
            .unwrap();
        let post = backend.list_posts(PostQuery::default()).await.unwrap().remove(0);

        let comment = NewComment {
            post_id: post.id.clone(),
            author_id: session.user.id.clone(),
            content: "댓글".to_string(),
        };
        backend
            .create_comment(&session.access_token, comment.clone())
            .await
            .unwrap();

        backend.expire_access_token(&session.access_token).await;
        assert!(backend
            .create_comment(&session.access_token, comment)
            .await
            .is_err());

        let mine = backend
            .list_comments(CommentQuery::ByAuthor(session.user.id.clone()))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].post.as_ref().map(|p| p.title.as_str()), Some("글"));
    }

    #[tokio::test]
    async fn refresh_token_is_single_use() {
        let backend = MemoryBackend::new();
        backend.add_user("d@example.com", "secret1", "디", false).await;
        let session = backend.sign_in("d@example.com", "secret1").await.unwrap();

        let renewed = backend.refresh(&session.refresh_token).await.unwrap();
        assert_ne!(renewed.access_token, session.access_token);
        assert!(backend.refresh(&session.refresh_token).await.is_err());
    }
}
