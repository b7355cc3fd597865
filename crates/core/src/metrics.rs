//! Call outcome statistics for campaign and agent dashboards.
//!
//! The persistence layer aggregates calls per outcome; everything derived
//! from those tallies (totals, effective contacts, rates, averages) is
//! computed here.

use serde::Serialize;

use crate::call_result::{OutcomeKind, ALL_OUTCOMES};

/// Default look-back window for metrics queries.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Calls recorded with one outcome and their summed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeTally {
    pub outcome: OutcomeKind,
    pub calls: i64,
    pub duration_seconds: i64,
}

/// Number of calls with one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeCount {
    pub outcome: OutcomeKind,
    pub calls: i64,
}

/// Summary of a set of recorded calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallStats {
    pub total_calls: i64,
    pub effective_calls: i64,
    /// Effective calls as a percentage of all calls.
    pub contact_rate: f64,
    /// Mean call duration in whole seconds.
    pub average_duration_seconds: i64,
    /// One entry per outcome, zeros included, in result-form order.
    pub outcomes: Vec<OutcomeCount>,
}

impl CallStats {
    pub fn from_tallies(tallies: &[OutcomeTally]) -> Self {
        let calls_for = |kind: OutcomeKind| -> i64 {
            tallies
                .iter()
                .filter(|t| t.outcome == kind)
                .map(|t| t.calls)
                .sum()
        };

        let total_calls: i64 = tallies.iter().map(|t| t.calls).sum();
        let total_duration: i64 = tallies.iter().map(|t| t.duration_seconds).sum();
        let effective_calls: i64 = tallies
            .iter()
            .filter(|t| t.outcome.is_effective())
            .map(|t| t.calls)
            .sum();

        Self {
            total_calls,
            effective_calls,
            contact_rate: percentage(effective_calls, total_calls),
            average_duration_seconds: average(total_duration, total_calls),
            outcomes: ALL_OUTCOMES
                .into_iter()
                .map(|outcome| OutcomeCount {
                    outcome,
                    calls: calls_for(outcome),
                })
                .collect(),
        }
    }
}

/// Queue entries of a campaign by status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueProgress {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    /// Completed entries as a percentage of all entries.
    pub progress_percent: f64,
}

impl QueueProgress {
    pub fn new(pending: i64, in_progress: i64, completed: i64) -> Self {
        let total = pending + in_progress + completed;
        Self {
            total,
            pending,
            in_progress,
            completed,
            progress_percent: percentage(completed, total),
        }
    }
}

/// `part` as a percentage of `total`, rounded to two decimals. Zero when
/// there is nothing to measure.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let pct = part as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

fn average(sum: i64, count: i64) -> i64 {
    if count <= 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as i64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
