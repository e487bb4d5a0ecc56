//! Dotted version ordering.
//!
//! Versions are split on `.` and each segment is read as an integer. Parsing
//! is permissive: a segment contributes its leading integer (`"10rc1"` is 10)
//! and a segment without one contributes 0. Shorter versions are padded with
//! zeros, so `1.2` and `1.2.0` are equal.

use std::cmp::Ordering;

/// Parsed segments of a version label.
#[derive(Debug, Clone)]
pub struct VersionKey {
    segments: Vec<i64>,
}

impl VersionKey {
    pub fn parse(version: &str) -> Self {
        Self {
            segments: version.split('.').map(parse_segment).collect(),
        }
    }

    pub fn segments(&self) -> &[i64] {
        &self.segments
    }

    fn segment(&self, index: usize) -> i64 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionKey {}

/// Release ordering: newer versions sort first.
///
/// `compare_versions("2.0.0", "1.9.9")` is `Less`, so sorting a list with
/// this comparator puts the newest release at index 0.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    VersionKey::parse(b).cmp(&VersionKey::parse(a))
}

/// Leading integer of a segment, 0 when there is none.
fn parse_segment(segment: &str) -> i64 {
    let trimmed = segment.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });
    if negative { -value } else { value }
}
