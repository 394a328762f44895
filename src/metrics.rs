use indexmap::IndexMap;

use crate::errors::{RecordRejection, RejectionKind};

/// Rejection counts per kind, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RejectionTally {
    counts: IndexMap<RejectionKind, usize>,
}

impl RejectionTally {
    /// Empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one rejection.
    pub fn record(&mut self, rejection: &RecordRejection) {
        *self.counts.entry(rejection.kind()).or_insert(0) += 1;
    }

    /// Add every count from `other`.
    pub fn merge(&mut self, other: &RejectionTally) {
        for (kind, count) in &other.counts {
            *self.counts.entry(*kind).or_insert(0) += count;
        }
    }

    /// Count for one kind.
    pub fn count(&self, kind: RejectionKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Total rejections across kinds.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// True when nothing was rejected.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate `(kind, count)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (RejectionKind, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

/// Aggregate view over a pass's outcomes.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectionSummary {
    /// Accepted plus rejected.
    pub inspected: usize,
    /// Records that produced a project.
    pub accepted: usize,
    /// Records dropped.
    pub rejected: usize,
    /// `accepted / inspected`, or 0 when nothing was inspected.
    pub acceptance_rate: f64,
    /// Share of each rejection kind.
    pub per_kind: Vec<RejectionShare>,
}

/// Share of rejections attributed to one kind.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectionShare {
    /// Rejection kind.
    pub kind: RejectionKind,
    /// Rejections of this kind.
    pub count: usize,
    /// Fraction of all rejections.
    pub share: f64,
}

/// Summarize accepted count plus rejection tally.
/// `per_kind` is sorted by count descending, then by kind.
pub fn rejection_summary(accepted: usize, tally: &RejectionTally) -> RejectionSummary {
    let rejected = tally.total();
    let inspected = accepted + rejected;
    let acceptance_rate = if inspected == 0 {
        0.0
    } else {
        accepted as f64 / inspected as f64
    };
    let mut per_kind: Vec<RejectionShare> = tally
        .iter()
        .map(|(kind, count)| RejectionShare {
            kind,
            count,
            share: if rejected == 0 {
                0.0
            } else {
                count as f64 / rejected as f64
            },
        })
        .collect();
    per_kind.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.kind.cmp(&b.kind)));
    RejectionSummary {
        inspected,
        accepted,
        rejected,
        acceptance_rate,
        per_kind,
    }
}
