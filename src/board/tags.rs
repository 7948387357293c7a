use std::collections::HashMap;

use crate::backend::PostRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularTag {
    /// Display form, `#` prefixed.
    pub name: String,
    pub count: usize,
}

/// Canonical form used to match and link tags: trimmed, one leading `#`
/// dropped.
pub fn normalize(tag: &str) -> &str {
    let trimmed = tag.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed).trim()
}

/// Split the comma separated tag field of the write forms.
pub fn parse_input(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Frequency of each normalized tag across `posts`, most used first. Ties
/// keep the order in which the tags were first seen.
pub fn popular(posts: &[PostRow], limit: usize) -> Vec<PopularTag> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for tag in posts.iter().filter_map(|post| post.tags.as_ref()).flatten() {
        let name = normalize(tag);
        if name.is_empty() {
            continue;
        }
        let count = counts.entry(name.to_string()).or_insert_with(|| {
            order.push(name.to_string());
            0
        });
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|name| {
            let count = counts.get(&name).copied().unwrap_or_default();
            (name, count)
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(limit)
        .map(|(name, count)| PopularTag {
            name: format!("#{}", name),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post_with(tags: Option<Vec<&str>>) -> PostRow {
        PostRow {
            id: uuid::Uuid::now_v7().to_string(),
            author_id: None,
            title: "t".into(),
            content: "c".into(),
            tags: tags.map(|t| t.into_iter().map(str::to_string).collect()),
            view_count: None,
            like_count: None,
            comment_count: None,
            created_at: Utc::now(),
            board: None,
        }
    }

    #[test]
    fn parse_input_trims_and_drops_empties() {
        assert_eq!(
            parse_input(" 피망머니, 전략 ,, ,홀덤"),
            vec!["피망머니", "전략", "홀덤"]
        );
        assert!(parse_input("   ").is_empty());
    }

    #[test]
    fn popular_counts_trimmed_tags() {
        let posts = vec![
            post_with(Some(vec!["전략", " 홀덤"])),
            post_with(Some(vec!["홀덤 ", ""])),
            post_with(None),
            post_with(Some(vec!["이벤트", "홀덤"])),
        ];

        let tags = popular(&posts, 20);
        assert_eq!(
            tags[0],
            PopularTag {
                name: "#홀덤".into(),
                count: 3
            }
        );
        assert_eq!(tags.len(), 3);
        // 전략 and 이벤트 tie; 전략 was seen first.
        assert_eq!(tags[1].name, "#전략");
        assert_eq!(tags[2].name, "#이벤트");
    }

    #[test]
    fn normalize_strips_one_hash() {
        assert_eq!(normalize(" #홀덤 "), "홀덤");
        assert_eq!(normalize("홀덤"), "홀덤");
        assert_eq!(normalize("##홀덤"), "#홀덤");
    }

    #[test]
    fn popular_merges_hash_prefixed_spellings() {
        let posts = vec![
            post_with(Some(vec!["#홀덤"])),
            post_with(Some(vec!["홀덤", "#"])),
        ];
        let tags = popular(&posts, 20);
        assert_eq!(
            tags,
            vec![PopularTag {
                name: "#홀덤".into(),
                count: 2
            }]
        );
    }

    #[test]
    fn popular_respects_limit() {
        let posts = vec![post_with(Some(vec!["a", "b", "c", "d"]))];
        assert_eq!(popular(&posts, 2).len(), 2);
    }
}
