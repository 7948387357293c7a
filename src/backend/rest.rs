//! Client for the hosted service's HTTP API: the GoTrue-style auth
//! endpoints under `/auth/v1` and the PostgREST-style table endpoints
//! under `/rest/v1`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{
    AuthSession, Backend, BackendError, BackendResult, Board, CommentQuery, CommentRow,
    NewComment, NewPost, PostQuery, PostRow, SignUp, User,
};

const POST_SELECT: &str = "id,author_id,title,content,tags,view_count,like_count,comment_count,created_at,board:boards(id,slug,name)";
const COMMENT_SELECT: &str = "id,post_id,author_id,content,created_at,post:posts(title)";

/// Access tokens without an explicit expiry are assumed to last this long.
const DEFAULT_TOKEN_SECS: i64 = 3600;

#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
    #[serde(default)]
    app_metadata: Value,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl From<AuthUser> for User {
    fn from(raw: AuthUser) -> Self {
        let is_admin = raw.app_metadata.get("is_admin").and_then(Value::as_bool) == Some(true)
            || raw.app_metadata.get("role").and_then(Value::as_str) == Some("admin");
        let nickname = raw
            .user_metadata
            .get("nickname")
            .and_then(Value::as_str)
            .map(str::to_string);

        User {
            id: raw.id,
            email: raw.email,
            nickname,
            is_admin,
        }
    }
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(|| {
                now + chrono::Duration::seconds(self.expires_in.unwrap_or(DEFAULT_TOKEN_SECS))
            });

        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into(),
        }
    }
}

/// Pull a human readable message out of an error body. Auth and table
/// endpoints disagree on the field name, so try each in turn.
pub(crate) fn error_message(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["msg", "error_description", "message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

impl RestBackend {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attach the project key and the caller's bearer token (the anon key
    /// stands in for signed-out visitors).
    fn authorize(&self, request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
    }

    async fn check(response: Response, auth_endpoint: bool) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        debug!("Backend returned {}: {}", status, message);

        if auth_endpoint && status.is_client_error() {
            Err(BackendError::Auth(message))
        } else {
            Err(BackendError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<T> {
        let response = Self::check(request.send().await?, false).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn insert(
        &self,
        table: &str,
        access_token: Option<&str>,
        body: Value,
    ) -> BackendResult<()> {
        let request = self
            .authorize(self.client.post(self.table_url(table)), access_token)
            .header("Prefer", "return=minimal")
            .json(&body);
        Self::check(request.send().await?, false).await?;
        Ok(())
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> BackendResult<AuthSession> {
        let request = self
            .authorize(self.client.post(self.auth_url("token")), None)
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let response = Self::check(request.send().await?, true).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(token.into_session(Utc::now()))
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        nickname: &str,
    ) -> BackendResult<SignUp> {
        let request = self
            .authorize(self.client.post(self.auth_url("signup")), None)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "nickname": nickname },
            }));
        let response = Self::check(request.send().await?, true).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        // Auto-confirmed projects answer with a full session, the others
        // with the bare user (older servers wrap it in `{"user": ...}`).
        if body.get("access_token").is_some() {
            let token: TokenResponse =
                serde_json::from_value(body).map_err(|e| BackendError::Decode(e.to_string()))?;
            return Ok(SignUp::SignedIn(token.into_session(Utc::now())));
        }

        let raw_user = match body.get("user") {
            Some(user) if user.is_object() => user.clone(),
            _ => body,
        };
        let user: AuthUser =
            serde_json::from_value(raw_user).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(SignUp::ConfirmationRequired(user.into()))
    }

    async fn refresh(&self, refresh_token: &str) -> BackendResult<AuthSession> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let request = self.authorize(self.client.post(self.auth_url("logout")), Some(access_token));
        Self::check(request.send().await?, true).await?;
        info!("Revoked backend session");
        Ok(())
    }

    async fn list_boards(&self, slugs: &[&str]) -> BackendResult<Vec<Board>> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let filter = format!("in.({})", slugs.join(","));
        let request = self
            .authorize(self.client.get(self.table_url("boards")), None)
            .query(&[
                ("select", "id,slug,name"),
                ("slug", filter.as_str()),
                ("order", "name.asc"),
            ]);
        self.fetch(request).await
    }

    async fn list_posts(&self, query: PostQuery) -> BackendResult<Vec<PostRow>> {
        let mut params: Vec<(&str, String)> = vec![
            ("select", POST_SELECT.to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(author_id) = &query.author_id {
            params.push(("author_id", format!("eq.{}", author_id)));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let request = self
            .authorize(self.client.get(self.table_url("posts")), None)
            .query(&params);
        self.fetch(request).await
    }

    async fn get_post(&self, id: &str) -> BackendResult<PostRow> {
        let filter = format!("eq.{}", id);
        let request = self
            .authorize(self.client.get(self.table_url("posts")), None)
            .query(&[
                ("select", POST_SELECT),
                ("id", filter.as_str()),
                ("limit", "1"),
            ]);
        // A malformed id is rejected by the table API (400, invalid uuid
        // syntax); for a reader that is the same as a missing post.
        let rows: Vec<PostRow> = match self.fetch(request).await {
            Err(BackendError::Status { status, message }) if (400..500).contains(&status) => {
                debug!("Post lookup for {} rejected: {}", id, message);
                return Err(BackendError::NotFound);
            }
            other => other?,
        };
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }

    async fn create_post(&self, access_token: Option<&str>, post: NewPost) -> BackendResult<()> {
        let body = serde_json::to_value(&post).map_err(|e| BackendError::Decode(e.to_string()))?;
        self.insert("posts", access_token, body).await
    }

    async fn list_comments(&self, query: CommentQuery) -> BackendResult<Vec<CommentRow>> {
        let mut params: Vec<(&str, String)> = vec![("select", COMMENT_SELECT.to_string())];
        match query {
            CommentQuery::ForPost(post_id) => {
                params.push(("post_id", format!("eq.{}", post_id)));
                params.push(("order", "created_at.asc".to_string()));
            }
            CommentQuery::ByAuthor(author_id) => {
                params.push(("author_id", format!("eq.{}", author_id)));
                params.push(("order", "created_at.desc".to_string()));
            }
            CommentQuery::Latest(limit) => {
                params.push(("order", "created_at.desc".to_string()));
                params.push(("limit", limit.to_string()));
            }
        }

        let request = self
            .authorize(self.client.get(self.table_url("comments")), None)
            .query(&params);
        self.fetch(request).await
    }

    async fn create_comment(&self, access_token: &str, comment: NewComment) -> BackendResult<()> {
        let body =
            serde_json::to_value(&comment).map_err(|e| BackendError::Decode(e.to_string()))?;
        self.insert("comments", Some(access_token), body).await
    }
}
