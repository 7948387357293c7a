use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::backend::NewPost;
use crate::board::forms::PostForm;
use crate::board::{slug, tags};
use crate::error::AppResult;
use crate::extractors::AdminUser;
use crate::routes::home::Html;
use crate::routes::write::POST_FAILED;
use crate::routes::Nav;
use crate::state::AppState;

pub const BOARD_UNAVAILABLE: &str = "해당 게시판 정보를 불러오지 못했습니다.";
pub const POSTED: &str = "게시글이 등록되었습니다.";

/// Which staff board the admin page writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Notice,
    Tips,
}

impl AdminTab {
    pub const ALL: [AdminTab; 2] = [AdminTab::Notice, AdminTab::Tips];

    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("tips") => AdminTab::Tips,
            _ => AdminTab::Notice,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            AdminTab::Notice => "notice",
            AdminTab::Tips => "tips",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Notice => "공지 작성",
            AdminTab::Tips => "꿀팁 작성",
        }
    }

    pub fn board_label(&self) -> &'static str {
        match self {
            AdminTab::Notice => "공지 게시판",
            AdminTab::Tips => "꿀팁 게시판",
        }
    }

    fn board_slug(&self) -> &'static str {
        match self {
            AdminTab::Notice => slug::NOTICE,
            AdminTab::Tips => slug::TIPS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminParams {
    pub tab: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminForm {
    #[serde(default)]
    pub tab: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: String,
}

pub struct AdminTabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "pages/admin.html")]
pub struct AdminTemplate {
    pub nav: Nav,
    pub tabs: Vec<AdminTabLink>,
    pub tab: &'static str,
    pub board_label: &'static str,
    pub form: PostForm,
    pub error: String,
    pub message: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/admin", get(admin_page).post(submit))
}

fn page(admin: &AdminUser, tab: AdminTab, form: PostForm, error: &str, message: &str) -> Response {
    let tabs = AdminTab::ALL
        .iter()
        .map(|t| AdminTabLink {
            label: t.label(),
            href: format!("/admin?tab={}", t.id()),
            active: *t == tab,
        })
        .collect();

    Html(AdminTemplate {
        nav: Nav::new(Some(&admin.0)),
        tabs,
        tab: tab.id(),
        board_label: tab.board_label(),
        form,
        error: error.to_string(),
        message: message.to_string(),
    })
    .into_response()
}

async fn admin_page(admin: AdminUser, Query(params): Query<AdminParams>) -> AppResult<Response> {
    let tab = AdminTab::parse(params.tab.as_deref());
    Ok(page(&admin, tab, PostForm::default(), "", ""))
}

async fn submit(
    State(state): State<AppState>,
    admin: AdminUser,
    Form(form): Form<AdminForm>,
) -> AppResult<Response> {
    let tab = AdminTab::parse(Some(form.tab.as_str()));
    let post_form = PostForm {
        title: form.title,
        content: form.content,
        tags: form.tags,
    };

    let boards = match state
        .backend
        .list_boards(&[slug::NOTICE, slug::TIPS])
        .await
    {
        Ok(boards) => boards,
        Err(e) => {
            tracing::error!("Failed to load staff boards: {}", e);
            Vec::new()
        }
    };
    let Some(board) = boards.into_iter().find(|b| b.slug == tab.board_slug()) else {
        return Ok(page(&admin, tab, post_form, BOARD_UNAVAILABLE, ""));
    };

    if let Err(message) = post_form.validate() {
        return Ok(page(&admin, tab, post_form, message, ""));
    }

    let new_post = NewPost {
        board_id: board.id,
        author_id: Some(admin.0.id.clone()),
        title: post_form.title.clone(),
        content: post_form.content.clone(),
        tags: tags::parse_input(&post_form.tags),
    };

    if let Err(e) = state
        .backend
        .create_post(Some(&admin.0.access_token), new_post)
        .await
    {
        tracing::error!("Failed to create {} post: {}", tab.id(), e);
        return Ok(page(&admin, tab, post_form, POST_FAILED, ""));
    }

    tracing::info!("Admin {} posted to {}", admin.0.id, tab.id());
    Ok(page(&admin, tab, PostForm::default(), "", POSTED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tab_falls_back_to_notice() {
        assert_eq!(AdminTab::parse(None), AdminTab::Notice);
        assert_eq!(AdminTab::parse(Some("free")), AdminTab::Notice);
        assert_eq!(AdminTab::parse(Some("tips")), AdminTab::Tips);
    }

    #[test]
    fn tabs_target_staff_boards() {
        assert_eq!(AdminTab::Notice.board_slug(), slug::NOTICE);
        assert_eq!(AdminTab::Tips.board_slug(), slug::TIPS);
        assert_eq!(AdminTab::Tips.label(), "꿀팁 작성");
    }
}
