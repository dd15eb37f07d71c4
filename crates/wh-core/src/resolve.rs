//! Overlap resolution planning.
//!
//! When a timed period is added or moved, every existing timed period on the
//! same date that it intersects must give way. [`plan_resolution`] decides how
//! each conflicting period changes; the storage layer applies the resulting
//! worklist together with the new period in one transaction.
//!
//! Shrinking and splitting only ever remove time from existing periods, so
//! applying the plan cannot create new conflicts among them. One pass over the
//! existing periods is therefore enough.

use crate::period::{EntryId, StoredPeriod, TimeRange};
use crate::types::Category;

/// How a candidate range intersects an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// The candidate covers the existing range entirely.
    Covers,
    /// The candidate lies strictly inside the existing range.
    Inside,
    /// The candidate overlaps the start of the existing range.
    Head,
    /// The candidate overlaps the end of the existing range.
    Tail,
}

/// Classifies the overlap of `candidate` with `existing`.
///
/// Returns `None` when they do not overlap; touching ranges do not. The cases
/// are tested in order: full cover, strict containment, head, tail.
pub fn classify(candidate: &TimeRange, existing: &TimeRange) -> Option<Overlap> {
    if !candidate.overlaps(existing) {
        return None;
    }
    let overlap = if candidate.start() <= existing.start() && candidate.end() >= existing.end() {
        Overlap::Covers
    } else if candidate.start() > existing.start() && candidate.end() < existing.end() {
        Overlap::Inside
    } else if candidate.start() <= existing.start() {
        Overlap::Head
    } else {
        Overlap::Tail
    };
    Some(overlap)
}

/// One change to an existing period.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Remove the period.
    Delete { id: EntryId },
    /// Narrow the period to `range`, recomputing its duration.
    Shrink { id: EntryId, range: TimeRange },
    /// Narrow the period to `left` and insert a copy covering `right`.
    Split {
        id: EntryId,
        left: TimeRange,
        right: TimeRange,
        category: Category,
        has_break: bool,
    },
}

impl Resolution {
    /// The existing period this change applies to.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        match self {
            Self::Delete { id } | Self::Shrink { id, .. } | Self::Split { id, .. } => *id,
        }
    }
}

/// Plans the changes that make room for `candidate`.
///
/// `existing` holds the periods stored on the candidate's date; whole-day
/// periods and the period identified by `exclude` are skipped. The plan holds
/// at most one change per existing period, in the order they were given.
pub fn plan_resolution(
    candidate: &TimeRange,
    existing: &[StoredPeriod],
    exclude: Option<EntryId>,
) -> Vec<Resolution> {
    let mut plan = Vec::new();
    for stored in existing {
        if exclude == Some(stored.id) {
            continue;
        }
        let Some(range) = stored.period.range else {
            continue;
        };
        let Some(overlap) = classify(candidate, &range) else {
            continue;
        };
        let resolution = match overlap {
            Overlap::Covers => Resolution::Delete { id: stored.id },
            Overlap::Inside => Resolution::Split {
                id: stored.id,
                left: TimeRange::ordered(range.start(), candidate.start()),
                right: TimeRange::ordered(candidate.end(), range.end()),
                category: stored.period.category,
                has_break: stored.period.has_break,
            },
            Overlap::Head => Resolution::Shrink {
                id: stored.id,
                range: TimeRange::ordered(candidate.end(), range.end()),
            },
            Overlap::Tail => Resolution::Shrink {
                id: stored.id,
                range: TimeRange::ordered(range.start(), candidate.start()),
            },
        };
        plan.push(resolution);
    }
    plan
}
