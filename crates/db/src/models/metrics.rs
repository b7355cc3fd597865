//! Aggregates over the `calls` and `campaign_contacts` tables.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use telesales_core::types::{DbId, Timestamp};

/// Calls and summed duration for one outcome code.
#[derive(Debug, Clone, FromRow)]
pub struct OutcomeTallyRow {
    pub outcome: String,
    pub calls: i64,
    pub duration_seconds: i64,
}

/// Queue entries of a campaign by status.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct QueueCounts {
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

/// Calls started on one UTC day.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyCalls {
    pub day: NaiveDate,
    pub total_calls: i64,
    pub effective_calls: i64,
}

/// Time window for metrics. Calls are counted when `from <= started_at < to`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsWindow {
    pub from: Timestamp,
    pub to: Timestamp,
}

/// Whose calls a metrics query covers.
#[derive(Debug, Clone, Copy)]
pub struct MetricsScope {
    pub campaign_id: DbId,
    /// `None` covers every agent of the campaign.
    pub agent_id: Option<DbId>,
}
