use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};

use crate::backend::{BackendError, CommentQuery, CommentRow, NewComment, PostRow};
use crate::board::forms::CommentForm;
use crate::board::time;
use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::home::{Html, POSTS_LOAD_FAILED};
use crate::routes::Nav;
use crate::state::AppState;

pub const COMMENT_FAILED: &str = "댓글 등록에 실패했습니다.";

pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

pub struct CommentView {
    pub id: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Template)]
#[template(path = "pages/post.html")]
pub struct PostTemplate {
    pub nav: Nav,
    pub post_id: String,
    pub post: Option<PostView>,
    pub error: String,
    pub comments: Vec<CommentView>,
    pub comments_loaded: bool,
    pub comment_error: String,
    pub comment_draft: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}", get(show))
        .route("/posts/{id}/comments", post(add_comment))
}

impl From<PostRow> for PostView {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: time::date_time(row.created_at),
        }
    }
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            created_at: time::date_time(row.created_at),
        }
    }
}

/// Load the post and its comments and render the detail page.
async fn render(
    state: &AppState,
    user: Option<&CurrentUser>,
    id: &str,
    comment_error: &str,
    comment_draft: &str,
) -> Response {
    let (post, comments) = tokio::join!(
        state.backend.get_post(id),
        state
            .backend
            .list_comments(CommentQuery::ForPost(id.to_string())),
    );

    let (status, post, error) = match post {
        Ok(row) => (StatusCode::OK, Some(PostView::from(row)), String::new()),
        Err(BackendError::NotFound) => (StatusCode::NOT_FOUND, None, POSTS_LOAD_FAILED.to_string()),
        Err(e) => {
            tracing::error!("Failed to load post {}: {}", id, e);
            (StatusCode::BAD_GATEWAY, None, POSTS_LOAD_FAILED.to_string())
        }
    };

    let (comments, comments_loaded) = match comments {
        Ok(rows) => (rows.into_iter().map(CommentView::from).collect(), true),
        Err(e) => {
            tracing::error!("Failed to load comments for post {}: {}", id, e);
            (Vec::new(), false)
        }
    };

    let template = PostTemplate {
        nav: Nav::new(user),
        post_id: id.to_string(),
        post,
        error,
        comments,
        comments_loaded,
        comment_error: comment_error.to_string(),
        comment_draft: comment_draft.to_string(),
    };

    (status, Html(template)).into_response()
}

async fn show(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    Ok(render(&state, maybe_user.0.as_ref(), &id, "", "").await)
}

async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let content = form.content.trim();
    if content.is_empty() {
        return Ok(Redirect::to(&format!("/posts/{}", id)).into_response());
    }

    let comment = NewComment {
        post_id: id.clone(),
        author_id: user.id.clone(),
        content: content.to_string(),
    };

    if let Err(e) = state.backend.create_comment(&user.access_token, comment).await {
        tracing::error!("Failed to add comment to post {}: {}", id, e);
        return Ok(render(&state, Some(&user), &id, COMMENT_FAILED, content).await);
    }

    tracing::info!("User {} commented on post {}", user.id, id);
    Ok(Redirect::to(&format!("/posts/{}", id)).into_response())
}
