use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::backend::{CommentQuery, PostQuery};
use crate::board::feed::{self, FeedFilter, FeedParams, FeedTab, PostCard, RecentComment};
use crate::board::tags;
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::routes::{tag_href, Nav};
use crate::state::AppState;

pub const POSTS_LOAD_FAILED: &str = "게시글을 불러오지 못했습니다.";

pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

pub struct TagLink {
    pub label: String,
    pub href: String,
}

pub struct FeedItem {
    pub card: PostCard,
    pub tags: Vec<TagLink>,
}

pub struct PopularTagLink {
    pub label: String,
    pub href: String,
    pub count: usize,
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub tabs: Vec<TabLink>,
    pub posts: Vec<FeedItem>,
    pub posts_error: String,
    pub query: String,
    pub tag: String,
    pub recent_comments: Vec<RecentComment>,
    pub popular_tags: Vec<PopularTagLink>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => AppError::Template(e).into_response(),
        }
    }
}

fn feed_item(card: PostCard) -> FeedItem {
    let tags = card
        .tags
        .iter()
        .map(|tag| TagLink {
            label: format!("#{}", tags::normalize(tag)),
            href: tag_href(tag),
        })
        .collect();
    FeedItem { card, tags }
}

pub async fn index(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Query(params): Query<FeedParams>,
) -> AppResult<Response> {
    let now = Utc::now();
    let filter = FeedFilter::from_params(&params);
    let board = &state.config.board;

    // Feed and sidebar load independently; a sidebar failure only empties
    // that box.
    let (posts, comments, tag_rows) = tokio::join!(
        state.backend.list_posts(PostQuery::default()),
        state
            .backend
            .list_comments(CommentQuery::Latest(board.recent_comment_limit)),
        state
            .backend
            .list_posts(PostQuery::latest(board.popular_tag_window)),
    );

    let (posts, posts_error) = match posts {
        Ok(rows) => (
            feed::build(rows, &filter, now)
                .into_iter()
                .map(feed_item)
                .collect(),
            String::new(),
        ),
        Err(e) => {
            tracing::error!("Failed to load posts: {}", e);
            (Vec::new(), POSTS_LOAD_FAILED.to_string())
        }
    };

    let recent_comments = match comments {
        Ok(rows) => rows
            .into_iter()
            .map(|row| RecentComment::from_row(row, now))
            .collect(),
        Err(e) => {
            tracing::error!("Failed to load recent comments: {}", e);
            Vec::new()
        }
    };

    let popular_tags = match tag_rows {
        Ok(rows) => tags::popular(&rows, board.popular_tag_limit)
            .into_iter()
            .map(|tag| PopularTagLink {
                href: tag_href(tag.name.strip_prefix('#').unwrap_or(&tag.name)),
                label: tag.name,
                count: tag.count,
            })
            .collect(),
        Err(e) => {
            tracing::error!("Failed to load popular tags: {}", e);
            Vec::new()
        }
    };

    let tabs = FeedTab::ALL
        .iter()
        .map(|tab| TabLink {
            label: tab.label(),
            href: format!("/?tab={}", tab.id()),
            active: *tab == filter.tab,
        })
        .collect();

    let query = filter.query.unwrap_or_default();
    Ok(Html(HomeTemplate {
        nav: Nav::new(maybe_user.0.as_ref()).with_search(&query),
        tabs,
        posts,
        posts_error,
        query,
        tag: filter.tag.unwrap_or_default(),
        recent_comments,
        popular_tags,
    })
    .into_response())
}
