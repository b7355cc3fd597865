//! Campaign call-queue entry model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use telesales_core::collaborators::Contact;
use telesales_core::types::{DbId, Timestamp};

/// A row from the `campaign_contacts` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CampaignContact {
    pub id: DbId,
    pub campaign_id: DbId,
    pub lead_id: DbId,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub priority: String,
    pub queue_status: String,
    pub current_agent_id: Option<DbId>,
    pub scheduled_at: Option<Timestamp>,
    pub attempts: i32,
    pub last_call_at: Option<Timestamp>,
    pub last_outcome: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a lead to a campaign queue.
#[derive(Debug, Deserialize)]
pub struct CreateCampaignContact {
    pub lead_id: DbId,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub priority: Option<String>,
}

impl From<CampaignContact> for Contact {
    fn from(row: CampaignContact) -> Self {
        Contact {
            id: row.id,
            campaign_id: row.campaign_id,
            lead_id: row.lead_id,
            full_name: row.full_name,
            phone: row.phone,
            email: row.email,
            company: row.company,
            priority: row.priority,
            queue_status: row.queue_status,
            attempts: row.attempts,
            last_call_at: row.last_call_at,
            last_outcome: row.last_outcome,
        }
    }
}

/// A pending follow-up call an agent scheduled on a queue entry.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ScheduledCall {
    /// Queue entry id.
    pub id: DbId,
    pub campaign_id: DbId,
    pub campaign_name: String,
    pub lead_id: DbId,
    pub full_name: String,
    pub phone: String,
    pub priority: String,
    pub scheduled_at: Timestamp,
    pub attempts: i32,
    pub last_outcome: Option<String>,
}
