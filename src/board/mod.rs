//! Presentation rules of the board: categories, feed filtering, tags,
//! timestamps and form checks. Nothing here talks to the backend.

pub mod feed;
pub mod forms;
pub mod tags;
pub mod time;

/// Board slugs as stored in the `boards` table.
pub mod slug {
    pub const NOTICE: &str = "notice";
    pub const FREE: &str = "free";
    pub const TIPS: &str = "tips";
}
