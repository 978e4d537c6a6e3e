//! User detail record.

use csv::StringRecord;

use crate::error::Result;
use crate::storage::cell::{self, Columns};

/// Profile of one author, fetched from the per-user endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub karma: i64,
    /// Free-text bio, HTML entities decoded
    pub about: Option<String>,
    pub created_at: Option<String>,
    pub created_at_i: Option<i64>,
    pub submission_count: Option<u64>,
    pub comment_count: Option<u64>,
}

impl User {
    pub const HEADER: [&'static str; 8] = [
        "id",
        "username",
        "karma",
        "about",
        "created_at",
        "created_at_i",
        "submission_count",
        "comment_count",
    ];

    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            cell::encode(Some(self.username.as_str())),
            self.karma.to_string(),
            cell::encode(self.about.as_deref()),
            cell::encode(self.created_at.as_deref()),
            cell::encode_num(self.created_at_i),
            cell::encode_num(self.submission_count),
            cell::encode_num(self.comment_count),
        ]
    }

    pub fn from_record(columns: &Columns, record: &StringRecord) -> Result<Self> {
        Ok(Self {
            id: columns.required_num(record, "id")?,
            username: columns.required_text(record, "username")?,
            karma: columns.required_num(record, "karma")?,
            about: columns.text(record, "about")?,
            created_at: columns.text(record, "created_at")?,
            created_at_i: columns.num(record, "created_at_i")?,
            submission_count: columns.num(record, "submission_count")?,
            comment_count: columns.num(record, "comment_count")?,
        })
    }
}
