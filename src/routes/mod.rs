pub mod admin;
pub mod assets;
pub mod auth;
pub mod guides;
pub mod home;
pub mod me;
pub mod posts;
pub mod write;

use crate::extractors::CurrentUser;

/// What the shared header needs to know about the visitor.
pub struct Nav {
    pub signed_in: bool,
    pub is_admin: bool,
    pub display_name: String,
    /// Current feed search, echoed in the header search box.
    pub search: String,
}

impl Nav {
    pub fn new(user: Option<&CurrentUser>) -> Self {
        match user {
            Some(user) => Self {
                signed_in: true,
                is_admin: user.is_admin,
                display_name: user.display_name(),
                search: String::new(),
            },
            None => Self {
                signed_in: false,
                is_admin: false,
                display_name: String::new(),
                search: String::new(),
            },
        }
    }

    pub fn with_search(mut self, query: &str) -> Self {
        self.search = query.to_string();
        self
    }
}

/// `/?tag=...` link for a tag, normalized and percent-encoded.
pub fn tag_href(tag: &str) -> String {
    let tag = crate::board::tags::normalize(tag);
    let encoded: String = url::form_urlencoded::byte_serialize(tag.as_bytes()).collect();
    format!("/?tag={}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_href_escapes_query_characters() {
        assert_eq!(tag_href("a&b"), "/?tag=a%26b");
        assert_eq!(tag_href("홀덤"), "/?tag=%ED%99%80%EB%8D%A4");
    }

    #[test]
    fn tag_href_drops_leading_hash() {
        assert_eq!(tag_href("#홀덤"), tag_href("홀덤"));
        assert_eq!(tag_href(" #a "), "/?tag=a");
    }

    #[test]
    fn anonymous_nav_is_signed_out() {
        let nav = Nav::new(None);
        assert!(!nav.signed_in);
        assert!(!nav.is_admin);
        assert!(nav.search.is_empty());
        assert_eq!(Nav::new(None).with_search("블러핑").search, "블러핑");
    }
}
