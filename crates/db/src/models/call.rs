//! Recorded call model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use telesales_core::types::{DbId, Timestamp};

/// A row from the `calls` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CallRecord {
    pub id: DbId,
    pub campaign_id: DbId,
    pub agent_id: DbId,
    pub contact_id: DbId,
    pub lead_id: DbId,
    pub queue_contact_id: Option<DbId>,
    pub outcome: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub reschedule_at: Option<Timestamp>,
    pub sales_handoff: bool,
    pub opportunity_type: Option<String>,
    pub duration_seconds: i64,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub created_at: Timestamp,
}

/// Query parameters for call history.
#[derive(Debug, Deserialize)]
pub struct CallHistoryParams {
    pub agent_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
