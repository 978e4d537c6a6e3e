// src/services/parse.rs

//! Decoding of API responses into domain records.

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Bounds, Item, ItemKind, User};
use crate::utils::unescape;

/// One decoded page of search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Total matches the server reports for the requested window
    pub hits_count: u64,
    pub items: Vec<Item>,
    /// `None` when the page has no hits
    pub bounds: Option<Bounds>,
}

impl SearchPage {
    /// True when this page holds every match of its window.
    pub fn drains_window(&self) -> bool {
        self.items.len() as u64 >= self.hits_count
    }
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(rename = "nbHits")]
    nb_hits: u64,
    hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    created_at: String,
    created_at_i: i64,
    #[serde(rename = "objectID")]
    object_id: String,
    #[serde(rename = "_tags")]
    tags: Vec<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    points: Option<i64>,
    #[serde(default)]
    story_text: Option<String>,
    #[serde(default)]
    comment_text: Option<String>,
    #[serde(default)]
    num_comments: Option<i64>,
    #[serde(default)]
    story_id: Option<u64>,
    #[serde(default)]
    story_title: Option<String>,
    #[serde(default)]
    story_url: Option<String>,
    #[serde(default)]
    parent_id: Option<u64>,
}

impl RawHit {
    fn into_item(self) -> Result<Item> {
        let object_id = self.object_id.parse::<u64>().map_err(|e| {
            AppError::decode("search hit", format!("objectID '{}': {e}", self.object_id))
        })?;
        let kind = self
            .tags
            .first()
            .map(|tag| ItemKind::from(tag.as_str()))
            .ok_or_else(|| AppError::decode("search hit", format!("item {object_id} has no tags")))?;

        Ok(Item {
            created_at: self.created_at,
            title: unescape(self.title),
            url: self.url,
            author: unescape(self.author),
            points: self.points,
            story_text: unescape(self.story_text),
            comment_text: unescape(self.comment_text),
            num_comments: self.num_comments,
            story_id: self.story_id,
            story_title: unescape(self.story_title),
            story_url: self.story_url,
            parent_id: self.parent_id,
            created_at_i: self.created_at_i,
            kind,
            object_id,
        })
    }
}

/// Decode one search response and compute its bounds.
pub fn parse_search_page(body: &str) -> Result<SearchPage> {
    let raw: RawPage = serde_json::from_str(body)?;

    let mut bounds = None;
    let mut items = Vec::with_capacity(raw.hits.len());
    for hit in raw.hits {
        let item = hit.into_item()?;
        bounds = Bounds::merge_into(bounds, item.bounds());
        items.push(item);
    }

    Ok(SearchPage {
        hits_count: raw.nb_hits,
        items,
        bounds,
    })
}

#[derive(Deserialize)]
struct RawUser {
    id: u64,
    username: String,
    karma: i64,
    #[serde(default)]
    about: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    created_at_i: Option<i64>,
    #[serde(default)]
    submission_count: Option<u64>,
    #[serde(default)]
    comment_count: Option<u64>,
}

/// Decode one user detail response.
pub fn parse_user(body: &str) -> Result<User> {
    let raw: RawUser = serde_json::from_str(body)?;
    Ok(User {
        id: raw.id,
        username: raw.username,
        karma: raw.karma,
        about: unescape(raw.about),
        created_at: raw.created_at,
        created_at_i: raw.created_at_i,
        submission_count: raw.submission_count,
        comment_count: raw.comment_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "nbHits": 1234,
        "hits": [
            {
                "created_at": "2024-01-01T00:01:40.000Z",
                "created_at_i": 100,
                "objectID": "12",
                "_tags": ["story", "author_alice", "story_12"],
                "title": "Show HN: Tom &amp; Jerry",
                "url": "https://example.com",
                "author": "alice",
                "points": 10,
                "story_text": null,
                "num_comments": 3
            },
            {
                "created_at": "2024-01-01T00:01:20.000Z",
                "created_at_i": 80,
                "objectID": "15",
                "_tags": ["comment", "author_bob", "story_12"],
                "author": "bob",
                "comment_text": "I&#x27;d agree",
                "story_id": 12,
                "parent_id": 12,
                "story_title": "Show HN: Tom &amp; Jerry"
            },
            {
                "created_at": "2024-01-01T00:01:30.000Z",
                "created_at_i": 90,
                "objectID": "9",
                "_tags": ["job"],
                "title": "Hiring"
            }
        ]
    }"#;

    #[test]
    fn test_parse_page_items_and_bounds() {
        let page = parse_search_page(PAGE).unwrap();

        assert_eq!(page.hits_count, 1234);
        assert_eq!(page.items.len(), 3);
        assert!(!page.drains_window());

        let bounds = page.bounds.unwrap();
        assert_eq!(bounds.min_created_at_i, 80);
        assert_eq!(bounds.max_created_at_i, 100);
        assert_eq!(bounds.min_id, 9);
        assert_eq!(bounds.max_id, 15);

        for item in &page.items {
            assert!(bounds.min_created_at_i <= item.created_at_i);
            assert!(item.created_at_i <= bounds.max_created_at_i);
            assert!(bounds.min_id <= item.object_id && item.object_id <= bounds.max_id);
        }
    }

    #[test]
    fn test_parse_decodes_entities_and_keeps_nulls() {
        let page = parse_search_page(PAGE).unwrap();
        let story = &page.items[0];
        let comment = &page.items[1];

        assert_eq!(story.kind, ItemKind::Story);
        assert_eq!(story.title.as_deref(), Some("Show HN: Tom & Jerry"));
        assert_eq!(story.story_text, None);
        assert_eq!(story.comment_text, None);

        assert_eq!(comment.kind, ItemKind::Comment);
        assert_eq!(comment.comment_text.as_deref(), Some("I'd agree"));
        assert_eq!(comment.parent_id, Some(12));
        assert_eq!(page.items[2].kind, ItemKind::Job);
    }

    #[test]
    fn test_parse_empty_page() {
        let page = parse_search_page(r#"{"nbHits": 0, "hits": []}"#).unwrap();
        assert_eq!(page.hits_count, 0);
        assert!(page.items.is_empty());
        assert!(page.bounds.is_none());
        assert!(page.drains_window());
    }

    #[test]
    fn test_parse_keeps_unrecognised_first_tag() {
        let body = r#"{"nbHits": 2, "hits": [
            {"created_at": "x", "created_at_i": 20, "objectID": "2", "_tags": ["story"]},
            {"created_at": "y", "created_at_i": 10, "objectID": "1", "_tags": ["ask_hn", "story"]}
        ]}"#;
        let page = parse_search_page(body).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].kind, ItemKind::Other("ask_hn".to_string()));
        assert_eq!(page.items[1].kind.as_str(), "ask_hn");
    }

    #[test]
    fn test_parse_hit_without_tags_fails() {
        let body = r#"{"nbHits": 1, "hits": [{"created_at": "x", "created_at_i": 1, "objectID": "1", "_tags": []}]}"#;
        assert!(matches!(
            parse_search_page(body),
            Err(AppError::Decode { .. })
        ));
    }

    #[test]
    fn test_parse_missing_required_field_fails() {
        let body = r#"{"nbHits": 1, "hits": [{"created_at": "x", "objectID": "1", "_tags": ["story"]}]}"#;
        assert!(parse_search_page(body).is_err());
    }

    #[test]
    fn test_parse_non_numeric_object_id_fails() {
        let body = r#"{"nbHits": 1, "hits": [{"created_at": "x", "created_at_i": 1, "objectID": "abc", "_tags": ["story"]}]}"#;
        assert!(matches!(
            parse_search_page(body),
            Err(AppError::Decode { .. })
        ));
    }

    #[test]
    fn test_parse_user() {
        let body = r#"{
            "id": 1,
            "username": "pg",
            "about": "Bug fixer &amp; writer.",
            "karma": 155111,
            "created_at": "2006-10-09T18:21:51.000Z",
            "created_at_i": 1160418111,
            "avg": 3.2,
            "delay": 0,
            "submission_count": 100,
            "comment_count": 200,
            "objectID": "pg"
        }"#;
        let user = parse_user(body).unwrap();
        assert_eq!(user.username, "pg");
        assert_eq!(user.karma, 155_111);
        assert_eq!(user.about.as_deref(), Some("Bug fixer & writer."));
        assert_eq!(user.created_at_i, Some(1_160_418_111));
    }

    #[test]
    fn test_parse_user_missing_karma_fails() {
        let body = r#"{"id": 2, "username": "bob"}"#;
        assert!(matches!(parse_user(body), Err(AppError::Json(_))));
    }
}
