//! Repository for the `campaign_script_files` table.

use sqlx::{PgConnection, PgPool};
use telesales_core::types::DbId;

use crate::models::script_file::{
    CampaignScriptFile, CampaignScriptFileContent, CreateCampaignScriptFile,
};

/// Metadata columns. The content itself is only read by [`ScriptFileRepo::latest_content`].
const COLUMNS: &str = "id, campaign_id, script_id, file_name, content_type, description, \
    octet_length(content)::INT AS size_bytes, created_at";

/// Provides operations for campaign script documents.
pub struct ScriptFileRepo;

impl ScriptFileRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateCampaignScriptFile,
    ) -> Result<CampaignScriptFile, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        insert(&mut conn, input).await
    }

    /// Point the campaign at `input.script_id` and store the document, both or
    /// neither. Returns `None` if the campaign does not exist.
    pub async fn link_and_store(
        pool: &PgPool,
        input: &CreateCampaignScriptFile,
    ) -> Result<Option<CampaignScriptFile>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let linked = sqlx::query(
            "UPDATE campaigns SET script_id = $2, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(input.campaign_id)
        .bind(input.script_id)
        .execute(&mut *tx)
        .await?;
        if linked.rows_affected() == 0 {
            return Ok(None);
        }

        let file = insert(&mut tx, input).await?;
        tx.commit().await?;
        Ok(Some(file))
    }

    /// Metadata of the newest document stored for a campaign.
    pub async fn latest_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Option<CampaignScriptFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaign_script_files
             WHERE campaign_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, CampaignScriptFile>(&query)
            .bind(campaign_id)
            .fetch_optional(pool)
            .await
    }

    /// Bytes of the newest document stored for a campaign.
    pub async fn latest_content(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Option<CampaignScriptFileContent>, sqlx::Error> {
        sqlx::query_as::<_, CampaignScriptFileContent>(
            "SELECT file_name, content_type, content FROM campaign_script_files
             WHERE campaign_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(campaign_id)
        .fetch_optional(pool)
        .await
    }
}

async fn insert(
    conn: &mut PgConnection,
    input: &CreateCampaignScriptFile,
) -> Result<CampaignScriptFile, sqlx::Error> {
    let query = format!(
        "INSERT INTO campaign_script_files
            (campaign_id, script_id, file_name, content_type, description, content)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, CampaignScriptFile>(&query)
        .bind(input.campaign_id)
        .bind(input.script_id)
        .bind(&input.file_name)
        .bind(&input.content_type)
        .bind(input.description.as_deref())
        .bind(&input.content)
        .fetch_one(conn)
        .await
}
