use crate::range::DateRange;
use chrono::{DateTime, Utc};

/// One issue or pull request as returned by the API, reduced to the
/// fields the report cares about.
#[derive(Debug, Clone)]
pub struct IssueRecord {
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub is_pull_request: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub new: u32,
    pub closed: u32,
    pub current: u32,
}

/// Per-repo issue and PR counts for one analysis range.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IssueStats {
    pub issues: Counts,
    pub prs: Counts,
}

/// Classify a repo's full issue list against [range_start, range_end).
///
/// "current" counts records created before the range end that carry no
/// closing timestamp at all; a record closed at any point, even after the
/// range end, is never counted as current.
pub fn classify(records: &[IssueRecord], range: &DateRange) -> IssueStats {
    let mut stats = IssueStats::default();

    for record in records {
        let counts = if record.is_pull_request {
            &mut stats.prs
        } else {
            &mut stats.issues
        };

        if in_range(record.created_at, range.range_start, range.range_end) {
            counts.new += 1;
        }
        if let Some(closed_at) = record.closed_at {
            if in_range(closed_at, range.range_start, range.range_end) {
                counts.closed += 1;
            }
        }
        if record.created_at < range.range_end && record.closed_at.is_none() {
            counts.current += 1;
        }
    }

    stats
}

fn in_range(t: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= t && t < end
}
