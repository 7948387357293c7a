use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::backend::{CommentQuery, CommentRow, PostQuery, PostRow};
use crate::board::time;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::routes::home::Html;
use crate::routes::Nav;
use crate::state::AppState;

const DEFAULT_BOARD_NAME: &str = "게시판";
const DELETED_POST_TITLE: &str = "삭제된 게시글";
const NICKNAME_UNSET: &str = "설정되지 않음";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeTab {
    Posts,
    Comments,
}

impl MeTab {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("comments") => MeTab::Comments,
            _ => MeTab::Posts,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MeParams {
    pub tab: Option<String>,
}

pub struct MyPost {
    pub id: String,
    pub title: String,
    pub board_name: String,
    pub created_at: String,
}

pub struct MyComment {
    pub id: String,
    pub post_id: String,
    pub post_title: String,
    pub content: String,
    pub created_at: String,
}

impl From<PostRow> for MyPost {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            board_name: row
                .board
                .map(|b| b.name)
                .unwrap_or_else(|| DEFAULT_BOARD_NAME.to_string()),
            created_at: time::date_time(row.created_at),
        }
    }
}

impl From<CommentRow> for MyComment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            post_title: row
                .post
                .map(|p| p.title)
                .unwrap_or_else(|| DELETED_POST_TITLE.to_string()),
            content: row.content,
            created_at: time::date_time(row.created_at),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/me.html")]
pub struct MeTemplate {
    pub nav: Nav,
    pub nickname: String,
    pub email: String,
    pub show_comments: bool,
    pub posts: Vec<MyPost>,
    pub comments: Vec<MyComment>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me_page))
}

async fn me_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<MeParams>,
) -> AppResult<Response> {
    let tab = MeTab::parse(params.tab.as_deref());

    let (posts, comments) = tokio::join!(
        state.backend.list_posts(PostQuery::by_author(&user.id)),
        state
            .backend
            .list_comments(CommentQuery::ByAuthor(user.id.clone())),
    );

    // A failed listing renders as empty, same as the empty state.
    let posts = match posts {
        Ok(rows) => rows.into_iter().map(MyPost::from).collect(),
        Err(e) => {
            tracing::error!("Failed to load posts of {}: {}", user.id, e);
            Vec::new()
        }
    };
    let comments = match comments {
        Ok(rows) => rows.into_iter().map(MyComment::from).collect(),
        Err(e) => {
            tracing::error!("Failed to load comments of {}: {}", user.id, e);
            Vec::new()
        }
    };

    let nickname = user
        .nickname
        .clone()
        .unwrap_or_else(|| NICKNAME_UNSET.to_string());

    Ok(Html(MeTemplate {
        nav: Nav::new(Some(&user)),
        nickname,
        email: user.email.clone().unwrap_or_default(),
        show_comments: tab == MeTab::Comments,
        posts,
        comments,
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn orphaned_rows_get_placeholder_names() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();
        let post = MyPost::from(PostRow {
            id: "p1".into(),
            author_id: Some("u1".into()),
            title: "제목".into(),
            content: "본문".into(),
            tags: None,
            view_count: None,
            like_count: None,
            comment_count: None,
            created_at: at,
            board: None,
        });
        assert_eq!(post.board_name, "게시판");
        assert_eq!(post.created_at, "2024. 5. 1. 오후 12:00:00");

        let comment = MyComment::from(CommentRow {
            id: "c1".into(),
            post_id: "p1".into(),
            author_id: Some("u1".into()),
            content: "댓글".into(),
            created_at: at,
            post: None,
        });
        assert_eq!(comment.post_title, "삭제된 게시글");
    }

    #[test]
    fn tab_defaults_to_posts() {
        assert_eq!(MeTab::parse(None), MeTab::Posts);
        assert_eq!(MeTab::parse(Some("comments")), MeTab::Comments);
        assert_eq!(MeTab::parse(Some("likes")), MeTab::Posts);
    }
}
