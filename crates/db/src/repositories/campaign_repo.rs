//! Repository for the `campaigns` table.

use sqlx::PgPool;
use telesales_core::types::DbId;

use crate::models::campaign::{Campaign, CreateCampaign, CAMPAIGN_ACTIVE};

const COLUMNS: &str = "id, name, status, script_id, created_at, updated_at";

/// Provides operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a campaign. Status defaults to active.
    pub async fn create(pool: &PgPool, input: &CreateCampaign) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (name, status)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(&input.name)
            .bind(input.status.as_deref().unwrap_or(CAMPAIGN_ACTIVE))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
