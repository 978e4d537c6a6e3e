//! In-memory stand-ins for the Algolia API.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use hn_harvest::error::{AppError, Result};
use hn_harvest::utils::http::Fetch;
use serde_json::{Value, json};
use url::Url;

/// One search hit as the API would return it.
pub fn hit(created_at_i: i64, object_id: u64, author: &str) -> Value {
    json!({
        "created_at": format!("t{created_at_i}"),
        "created_at_i": created_at_i,
        "objectID": object_id.to_string(),
        "_tags": ["comment", format!("author_{author}")],
        "title": null,
        "url": null,
        "author": author,
        "points": null,
        "story_text": null,
        "comment_text": format!("comment {object_id}"),
        "num_comments": null,
        "story_id": 1,
        "story_title": "A story",
        "story_url": null,
        "parent_id": 1
    })
}

/// A search response body.
pub fn search_body(nb_hits: u64, hits: Vec<Value>) -> String {
    json!({ "nbHits": nb_hits, "hits": hits }).to_string()
}

/// A user detail response body.
pub fn user_body(id: u64, username: &str, karma: i64) -> String {
    json!({
        "id": id,
        "username": username,
        "about": "hi &amp; bye",
        "karma": karma,
        "created_at": "2010-01-01T00:00:00.000Z",
        "created_at_i": 1262304000,
        "submission_count": 3,
        "comment_count": 4,
        "objectID": username
    })
    .to_string()
}

/// Replays canned responses in order and records every requested URL.
pub struct ScriptedFetch {
    responses: Mutex<VecDeque<Result<String>>>,
    pub requests: Mutex<Vec<Url>>,
}

impl ScriptedFetch {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.requests.lock().unwrap().push(url.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::validation(format!("unexpected request {url}"))))
    }
}

/// Serves a fixed dataset, honouring the requested window and page size.
pub struct WindowedApi {
    /// (created_at_i, object_id, author), newest first
    records: Vec<(i64, u64, String)>,
    pub windows: Mutex<Vec<(i64, i64)>>,
}

impl WindowedApi {
    pub fn new(records: &[(i64, u64, &str)]) -> Self {
        let mut records: Vec<_> = records
            .iter()
            .map(|&(t, id, a)| (t, id, a.to_string()))
            .collect();
        records.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        Self {
            records,
            windows: Mutex::new(Vec::new()),
        }
    }

    pub fn windows(&self) -> Vec<(i64, i64)> {
        self.windows.lock().unwrap().clone()
    }
}

/// Parse `created_at_i<=U,created_at_i>=L` into `(L, U)`.
pub fn parse_window(url: &Url) -> (i64, i64) {
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    let filters = &params["numericFilters"];
    let (upper, lower) = filters.split_once(',').unwrap();
    let upper = upper.strip_prefix("created_at_i<=").unwrap().parse().unwrap();
    let lower = lower.strip_prefix("created_at_i>=").unwrap().parse().unwrap();
    (lower, upper)
}

#[async_trait]
impl Fetch for WindowedApi {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let (lower, upper) = parse_window(url);
        self.windows.lock().unwrap().push((lower, upper));

        let per_page: usize = url
            .query_pairs()
            .find(|(k, _)| k == "hitsPerPage")
            .map(|(_, v)| v.parse().unwrap())
            .unwrap();

        let matching: Vec<_> = self
            .records
            .iter()
            .filter(|(t, _, _)| lower <= *t && *t <= upper)
            .collect();
        let hits = matching
            .iter()
            .take(per_page)
            .map(|(t, id, author)| hit(*t, *id, author))
            .collect();
        Ok(search_body(matching.len() as u64, hits))
    }
}
