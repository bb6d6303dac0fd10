//! Own timeline posts
//!
//! Each post is counted once under `own_posts_all` and once under exactly one
//! of media, links or text only. Media wins when a post carries both media
//! and a link.

use crate::types::{Category, RawRecord, RawTimestamp, TimestampUnit};
use serde_json::Value;

const MEDIA_KEY: &str = "media";
const LINK_KEY: &str = "external_context";

/// Kind of an own post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    Media,
    Links,
    TextOnly,
}

impl PostKind {
    pub fn category(&self) -> Category {
        match self {
            PostKind::Media => Category::OwnPostsMedia,
            PostKind::Links => Category::OwnPostsLinks,
            PostKind::TextOnly => Category::OwnPostsTextOnly,
        }
    }
}

/// Classify a post by the attachments it carries
pub fn classify_post(post: &Value) -> PostKind {
    if contains_key(post, MEDIA_KEY) {
        PostKind::Media
    } else if contains_key(post, LINK_KEY) {
        PostKind::Links
    } else {
        PostKind::TextOnly
    }
}

pub(super) fn extract_posts(doc: &Value, field: &str, unit: TimestampUnit) -> Vec<RawRecord> {
    let mut records = Vec::new();

    for post in posts_in(doc) {
        // Posts without a timestamp count nowhere, keeping all == sum of kinds
        let Some(raw) = post.get(field) else {
            continue;
        };
        let timestamp = RawTimestamp::from(raw);
        records.push(RawRecord::new(Category::OwnPostsAll, timestamp.clone(), unit));
        records.push(RawRecord::new(classify_post(post).category(), timestamp, unit));
    }

    records
}

/// Posts are either the top-level array or arrays wrapped in an object
fn posts_in(doc: &Value) -> Vec<&Value> {
    match doc {
        Value::Array(items) => items.iter().filter(|p| p.is_object()).collect(),
        Value::Object(map) => map
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .filter(|p| p.is_object())
            .collect(),
        _ => Vec::new(),
    }
}

fn contains_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| k == key || contains_key(v, key)),
        Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count(records: &[RawRecord], category: Category) -> usize {
        records.iter().filter(|r| r.category == category).count()
    }

    #[test]
    fn test_classify_media() {
        let post = json!({
            "timestamp": 1,
            "attachments": [{"data": [{"media": {"uri": "photos/1.jpg"}}]}]
        });
        assert_eq!(classify_post(&post), PostKind::Media);
    }

    #[test]
    fn test_classify_link() {
        let post = json!({
            "timestamp": 1,
            "attachments": [{"data": [{"external_context": {"url": "https://example.com"}}]}]
        });
        assert_eq!(classify_post(&post), PostKind::Links);
    }

    #[test]
    fn test_classify_text_only() {
        let post = json!({
            "timestamp": 1,
            "data": [{"post": "I love social media"}]
        });
        // The word inside a value is not an attachment
        assert_eq!(classify_post(&post), PostKind::TextOnly);
    }

    #[test]
    fn test_media_wins_over_link() {
        let post = json!({
            "timestamp": 1,
            "attachments": [
                {"data": [{"external_context": {"url": "https://example.com"}}]},
                {"data": [{"media": {"uri": "videos/1.mp4"}}]}
            ]
        });
        assert_eq!(classify_post(&post), PostKind::Media);
    }

    #[test]
    fn test_every_post_counted_once_in_all_and_once_in_a_kind() {
        let doc = json!([
            {"timestamp": 10, "attachments": [{"data": [{"media": {}}]}]},
            {"timestamp": 11, "attachments": [{"data": [{"external_context": {}}]}]},
            {"timestamp": 12, "data": [{"post": "hello"}]},
            {"timestamp": 13, "attachments": [{"data": [{"media": {}}, {"external_context": {}}]}]},
            {"title": "no timestamp"}
        ]);
        let records = extract_posts(&doc, "timestamp", TimestampUnit::Seconds);

        assert_eq!(count(&records, Category::OwnPostsAll), 4);
        assert_eq!(count(&records, Category::OwnPostsMedia), 2);
        assert_eq!(count(&records, Category::OwnPostsLinks), 1);
        assert_eq!(count(&records, Category::OwnPostsTextOnly), 1);
        assert_eq!(records.len(), 8);
    }

    #[test]
    fn test_wrapped_posts() {
        let doc = json!({"status_updates": [{"timestamp": 10}, {"timestamp": 11}]});
        let records = extract_posts(&doc, "timestamp", TimestampUnit::Seconds);
        assert_eq!(count(&records, Category::OwnPostsAll), 2);
        assert_eq!(count(&records, Category::OwnPostsTextOnly), 2);
    }
}
