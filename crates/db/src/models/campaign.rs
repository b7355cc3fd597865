//! Telephone campaign model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use telesales_core::types::{DbId, Timestamp};

/// Campaign status in which the queue hands out contacts.
pub const CAMPAIGN_ACTIVE: &str = "ACTIVA";

/// A row from the `campaigns` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Campaign {
    pub id: DbId,
    pub name: String,
    pub status: String,
    pub script_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a campaign.
#[derive(Debug, Deserialize)]
pub struct CreateCampaign {
    pub name: String,
    pub status: Option<String>,
}
