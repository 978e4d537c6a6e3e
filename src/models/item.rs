//! Item (story, comment, job, poll) data structure.

use std::fmt;

use csv::StringRecord;

use crate::error::Result;
use crate::models::Bounds;
use crate::storage::cell::{self, Columns};

/// Item type, taken from the first `_tags` entry of a search hit.
///
/// Tags outside the known vocabulary are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Story,
    Comment,
    Job,
    Poll,
    PollOpt,
    Other(String),
}

impl ItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            ItemKind::Story => "story",
            ItemKind::Comment => "comment",
            ItemKind::Job => "job",
            ItemKind::Poll => "poll",
            ItemKind::PollOpt => "pollopt",
            ItemKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for ItemKind {
    fn from(tag: &str) -> Self {
        match tag {
            "story" => ItemKind::Story,
            "comment" => ItemKind::Comment,
            "job" => ItemKind::Job,
            "poll" => ItemKind::Poll,
            "pollopt" => ItemKind::PollOpt,
            other => ItemKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record of the primary corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Creation time as reported by the API (ISO 8601)
    pub created_at: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub points: Option<i64>,
    pub story_text: Option<String>,
    pub comment_text: Option<String>,
    pub num_comments: Option<i64>,
    pub story_id: Option<u64>,
    pub story_title: Option<String>,
    pub story_url: Option<String>,
    pub parent_id: Option<u64>,
    /// Creation time in integer seconds; the crawl cursor
    pub created_at_i: i64,
    pub kind: ItemKind,
    pub object_id: u64,
}

impl Item {
    /// Column order of a published partition file.
    pub const HEADER: [&'static str; 15] = [
        "created_at",
        "title",
        "url",
        "author",
        "points",
        "story_text",
        "comment_text",
        "num_comments",
        "story_id",
        "story_title",
        "story_url",
        "parent_id",
        "created_at_i",
        "type",
        "object_id",
    ];

    /// Name of the column holding the author handle.
    pub const AUTHOR_COLUMN: &'static str = "author";

    pub fn bounds(&self) -> Bounds {
        Bounds::point(self.created_at_i, self.object_id)
    }

    /// Encode as a CSV row matching [`Item::HEADER`].
    pub fn to_record(&self) -> Vec<String> {
        vec![
            cell::encode(Some(self.created_at.as_str())),
            cell::encode(self.title.as_deref()),
            cell::encode(self.url.as_deref()),
            cell::encode(self.author.as_deref()),
            cell::encode_num(self.points),
            cell::encode(self.story_text.as_deref()),
            cell::encode(self.comment_text.as_deref()),
            cell::encode_num(self.num_comments),
            cell::encode_num(self.story_id),
            cell::encode(self.story_title.as_deref()),
            cell::encode(self.story_url.as_deref()),
            cell::encode_num(self.parent_id),
            self.created_at_i.to_string(),
            self.kind.to_string(),
            self.object_id.to_string(),
        ]
    }

    /// Decode a CSV row using header positions.
    pub fn from_record(columns: &Columns, record: &StringRecord) -> Result<Self> {
        Ok(Self {
            created_at: columns.required_text(record, "created_at")?,
            title: columns.text(record, "title")?,
            url: columns.text(record, "url")?,
            author: columns.text(record, "author")?,
            points: columns.num(record, "points")?,
            story_text: columns.text(record, "story_text")?,
            comment_text: columns.text(record, "comment_text")?,
            num_comments: columns.num(record, "num_comments")?,
            story_id: columns.num(record, "story_id")?,
            story_title: columns.text(record, "story_title")?,
            story_url: columns.text(record, "story_url")?,
            parent_id: columns.num(record, "parent_id")?,
            created_at_i: columns.required_num(record, "created_at_i")?,
            kind: ItemKind::from(columns.raw(record, "type")?),
            object_id: columns.required_num(record, "object_id")?,
        })
    }
}
