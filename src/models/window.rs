//! Crawl window and aggregate bounds.

use chrono::Utc;

/// Creation instant of item 1, the oldest record the API knows about.
pub const EARLIEST_CREATED_AT_I: i64 = 1_160_418_111;

/// Slack added to "now" for the default upper bound.
const NOW_BUFFER_SECS: i64 = 41;

/// Inclusive `[lower, upper]` range on `created_at_i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub lower: i64,
    pub upper: i64,
}

impl Window {
    pub fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }

    /// Window covering the whole dataset up to a few seconds from now.
    pub fn full() -> Self {
        Self::new(EARLIEST_CREATED_AT_I, Utc::now().timestamp() + NOW_BUFFER_SECS)
    }

    pub fn is_empty(&self) -> bool {
        self.upper < self.lower
    }
}

/// Min/max creation instant and object id over a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_created_at_i: i64,
    pub max_created_at_i: i64,
    pub min_id: u64,
    pub max_id: u64,
}

impl Bounds {
    /// Bounds of a single record.
    pub fn point(created_at_i: i64, id: u64) -> Self {
        Self {
            min_created_at_i: created_at_i,
            max_created_at_i: created_at_i,
            min_id: id,
            max_id: id,
        }
    }

    /// Widen to include `other`.
    pub fn merge(self, other: Bounds) -> Self {
        Self {
            min_created_at_i: self.min_created_at_i.min(other.min_created_at_i),
            max_created_at_i: self.max_created_at_i.max(other.max_created_at_i),
            min_id: self.min_id.min(other.min_id),
            max_id: self.max_id.max(other.max_id),
        }
    }

    /// Merge into an optional accumulator.
    pub fn merge_into(acc: Option<Bounds>, other: Bounds) -> Option<Bounds> {
        Some(match acc {
            Some(bounds) => bounds.merge(other),
            None => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_widens_all_four_bounds() {
        let a = Bounds::point(100, 7);
        let b = Bounds::point(80, 9);
        let merged = a.merge(b);
        assert_eq!(merged.min_created_at_i, 80);
        assert_eq!(merged.max_created_at_i, 100);
        assert_eq!(merged.min_id, 7);
        assert_eq!(merged.max_id, 9);
    }

    #[test]
    fn merge_into_empty_accumulator() {
        let b = Bounds::point(5, 5);
        assert_eq!(Bounds::merge_into(None, b), Some(b));
    }

    #[test]
    fn full_window_starts_at_first_item() {
        let window = Window::full();
        assert_eq!(window.lower, EARLIEST_CREATED_AT_I);
        assert!(window.upper > Utc::now().timestamp());
        assert!(!window.is_empty());
    }
}
