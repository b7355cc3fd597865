//! Campaign script document model.

use serde::Serialize;
use sqlx::FromRow;
use telesales_core::types::{DbId, Timestamp};

/// Metadata of a stored campaign script document (content excluded).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CampaignScriptFile {
    pub id: DbId,
    pub campaign_id: DbId,
    pub script_id: Option<DbId>,
    pub file_name: String,
    pub content_type: String,
    pub description: Option<String>,
    pub size_bytes: i32,
    pub created_at: Timestamp,
}

/// Stored document including its bytes.
#[derive(Debug, Clone, FromRow)]
pub struct CampaignScriptFileContent {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// DTO for storing a new campaign script document.
#[derive(Debug)]
pub struct CreateCampaignScriptFile {
    pub campaign_id: DbId,
    pub script_id: Option<DbId>,
    pub file_name: String,
    pub content_type: String,
    pub description: Option<String>,
    pub content: Vec<u8>,
}
