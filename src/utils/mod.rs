//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::Result;

/// Build the search URL for one inclusive creation-time window.
pub fn search_url(base: &str, hits_per_page: usize, lower: i64, upper: i64) -> Result<Url> {
    let filters = format!("created_at_i<={upper},created_at_i>={lower}");
    let url = Url::parse_with_params(
        base,
        &[
            ("hitsPerPage", hits_per_page.to_string()),
            ("numericFilters", filters),
        ],
    )?;
    Ok(url)
}

/// Build the detail URL for one user, escaping the name as a path segment.
pub fn user_url(base: &str, username: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push(username);
    Ok(url)
}

/// Decode HTML entities in an optional text field, keeping null as null.
pub fn unescape(text: Option<String>) -> Option<String> {
    text.map(|t| html_escape::decode_html_entities(&t).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let url = search_url("http://hn.algolia.com/api/v1/search_by_date", 1000, 10, 20).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("hitsPerPage".to_string(), "1000".to_string()),
                (
                    "numericFilters".to_string(),
                    "created_at_i<=20,created_at_i>=10".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_user_url() {
        let url = user_url("https://hn.algolia.com/api/v1/users", "pg").unwrap();
        assert_eq!(url.as_str(), "https://hn.algolia.com/api/v1/users/pg");

        let url = user_url("https://hn.algolia.com/api/v1/users/", "a b").unwrap();
        assert_eq!(url.as_str(), "https://hn.algolia.com/api/v1/users/a%20b");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(
            unescape(Some("Tom &amp; Jerry &#x27;s".to_string())),
            Some("Tom & Jerry 's".to_string())
        );
        assert_eq!(unescape(None), None);
    }
}
