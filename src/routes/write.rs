use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};

use crate::backend::NewPost;
use crate::board::forms::PostForm;
use crate::board::{slug, tags};
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::routes::home::Html;
use crate::routes::Nav;
use crate::state::AppState;

pub const BOARD_MISSING: &str = "게시판을 선택해주세요.";
pub const POST_FAILED: &str = "게시글 등록에 실패했습니다.";

#[derive(Template)]
#[template(path = "pages/write.html")]
pub struct WriteTemplate {
    pub nav: Nav,
    pub has_board: bool,
    pub form: PostForm,
    pub error: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/write", get(write_page).post(submit))
}

/// Members write to the free board only; notices and tips go through
/// the admin page.
async fn free_board_id(state: &AppState) -> Option<String> {
    match state.backend.list_boards(&[slug::FREE]).await {
        Ok(boards) => boards.into_iter().next().map(|board| board.id),
        Err(e) => {
            tracing::error!("Failed to load boards: {}", e);
            None
        }
    }
}

async fn write_page(State(state): State<AppState>, maybe_user: MaybeUser) -> AppResult<Response> {
    let has_board = free_board_id(&state).await.is_some();
    Ok(Html(WriteTemplate {
        nav: Nav::new(maybe_user.0.as_ref()),
        has_board,
        form: PostForm::default(),
        error: String::new(),
    })
    .into_response())
}

async fn submit(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let user = maybe_user.0;
    let board_id = free_board_id(&state).await;

    let rerender = |form: PostForm, error: &str, has_board: bool| {
        Html(WriteTemplate {
            nav: Nav::new(user.as_ref()),
            has_board,
            form,
            error: error.to_string(),
        })
        .into_response()
    };

    let Some(board_id) = board_id else {
        return Ok(rerender(form, BOARD_MISSING, false));
    };
    if let Err(message) = form.validate() {
        return Ok(rerender(form, message, true));
    }

    // Anonymous posts are allowed; signed-in members get their id attached.
    let new_post = NewPost {
        board_id,
        author_id: user.as_ref().map(|u| u.id.clone()),
        title: form.title.clone(),
        content: form.content.clone(),
        tags: tags::parse_input(&form.tags),
    };
    let token = user.as_ref().map(|u| u.access_token.as_str());

    if let Err(e) = state.backend.create_post(token, new_post).await {
        tracing::error!("Failed to create post: {}", e);
        return Ok(rerender(form, POST_FAILED, true));
    }

    tracing::info!("New post on the free board: {}", form.title);
    Ok(Redirect::to("/").into_response())
}
