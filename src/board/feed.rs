use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::backend::{CommentRow, PostRow};
use crate::board::{tags, time};

/// Shown in place of an author name; the board does not expose authors.
pub const ANONYMOUS: &str = "익명";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Best,
    Notice,
    Free,
    Tip,
}

impl Category {
    /// Unknown or missing board slugs count as free talk.
    pub fn from_slug(slug: Option<&str>) -> Self {
        match slug {
            Some("notice") => Category::Notice,
            Some("tips") => Category::Tip,
            Some("best") => Category::Best,
            _ => Category::Free,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Best => "베스트",
            Category::Notice => "공지",
            Category::Free => "자유",
            Category::Tip => "꿀팁",
        }
    }

    /// CSS modifier for the badge.
    pub fn css(&self) -> &'static str {
        match self {
            Category::Best => "best",
            Category::Notice => "notice",
            Category::Free => "free",
            Category::Tip => "tip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTab {
    All,
    Notice,
    Free,
    Tip,
}

impl FeedTab {
    pub const ALL: [FeedTab; 4] = [FeedTab::All, FeedTab::Notice, FeedTab::Free, FeedTab::Tip];

    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("notice") => FeedTab::Notice,
            Some("free") => FeedTab::Free,
            Some("tip") => FeedTab::Tip,
            _ => FeedTab::All,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            FeedTab::All => "all",
            FeedTab::Notice => "notice",
            FeedTab::Free => "free",
            FeedTab::Tip => "tip",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedTab::All => "전체글",
            FeedTab::Notice => "공지",
            FeedTab::Free => "자유",
            FeedTab::Tip => "꿀팁",
        }
    }

    pub fn admits(&self, category: Category) -> bool {
        match self {
            FeedTab::All => true,
            FeedTab::Notice => category == Category::Notice,
            FeedTab::Free => category == Category::Free,
            FeedTab::Tip => category == Category::Tip,
        }
    }
}

/// Query string of the home feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedParams {
    pub tab: Option<String>,
    pub q: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FeedFilter {
    pub tab: FeedTab,
    pub query: Option<String>,
    pub tag: Option<String>,
}

impl FeedFilter {
    pub fn from_params(params: &FeedParams) -> Self {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            tab: FeedTab::parse(params.tab.as_deref()),
            query: non_empty(&params.q),
            tag: non_empty(&params.tag)
                .map(|t| tags::normalize(&t).to_string())
                .filter(|t| !t.is_empty()),
        }
    }

    pub fn admits(&self, card: &PostCard) -> bool {
        if !self.tab.admits(card.category) {
            return false;
        }
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            if !card.title.to_lowercase().contains(&needle)
                && !card.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !card.tags.iter().any(|t| tags::normalize(t) == tag) {
                return false;
            }
        }
        true
    }
}

/// A post as listed on the home feed.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: String,
    pub category: Category,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub author: String,
    pub time: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
}

impl PostCard {
    pub fn from_row(row: PostRow, now: DateTime<Utc>) -> Self {
        let category = Category::from_slug(row.board.as_ref().map(|b| b.slug.as_str()));
        Self {
            id: row.id,
            category,
            title: row.title,
            content: row.content,
            tags: row.tags.unwrap_or_default(),
            author: ANONYMOUS.to_string(),
            time: time::relative(row.created_at, now),
            views: row.view_count.unwrap_or(0),
            likes: row.like_count.unwrap_or(0),
            comments: row.comment_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecentComment {
    pub id: String,
    pub post_id: String,
    pub text: String,
    pub time: String,
}

impl RecentComment {
    pub fn from_row(row: CommentRow, now: DateTime<Utc>) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            text: row.content,
            time: time::relative(row.created_at, now),
        }
    }
}

/// Map rows to cards and keep the ones the filter admits, preserving
/// the backend's newest-first order.
pub fn build(rows: Vec<PostRow>, filter: &FeedFilter, now: DateTime<Utc>) -> Vec<PostCard> {
    rows.into_iter()
        .map(|row| PostCard::from_row(row, now))
        .filter(|card| filter.admits(card))
        .collect()
}
