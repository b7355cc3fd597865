//! Repository for the `campaign_contacts` call queue.
//!
//! Claiming uses `FOR UPDATE SKIP LOCKED` so two agents polling the same
//! campaign never receive the same entry.

use sqlx::PgPool;
use telesales_core::call_result::{QUEUE_IN_PROGRESS, QUEUE_PENDING};
use telesales_core::types::DbId;

use crate::models::campaign::CAMPAIGN_ACTIVE;
use crate::models::contact::{CampaignContact, CreateCampaignContact, ScheduledCall};

const COLUMNS: &str = "id, campaign_id, lead_id, full_name, phone, email, company, \
    priority, queue_status, current_agent_id, scheduled_at, attempts, \
    last_call_at, last_outcome, created_at, updated_at";

/// Priority order used when picking the next contact.
const PRIORITY_ORDER: &str =
    "CASE cc.priority WHEN 'ALTA' THEN 1 WHEN 'MEDIA' THEN 2 WHEN 'BAJA' THEN 3 ELSE 4 END";

/// Provides queue operations for campaign contacts.
pub struct ContactRepo;

impl ContactRepo {
    /// Add a lead to a campaign queue.
    pub async fn create(
        pool: &PgPool,
        campaign_id: DbId,
        input: &CreateCampaignContact,
    ) -> Result<CampaignContact, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaign_contacts
                (campaign_id, lead_id, full_name, phone, email, company, priority)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'MEDIA'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CampaignContact>(&query)
            .bind(campaign_id)
            .bind(input.lead_id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(input.email.as_deref())
            .bind(input.company.as_deref())
            .bind(input.priority.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CampaignContact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaign_contacts WHERE id = $1");
        sqlx::query_as::<_, CampaignContact>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All queue entries of a campaign in queue order.
    pub async fn list_by_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<CampaignContact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaign_contacts cc
             WHERE cc.campaign_id = $1
             ORDER BY {PRIORITY_ORDER}, cc.id"
        );
        sqlx::query_as::<_, CampaignContact>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// Claim the next callable entry for `agent_id`.
    ///
    /// Callable means: campaign active, queue not paused by this agent, entry
    /// pending, unassigned or already assigned to this agent, and not
    /// scheduled for later. Highest priority first, then oldest.
    pub async fn claim_next(
        pool: &PgPool,
        campaign_id: DbId,
        agent_id: DbId,
    ) -> Result<Option<CampaignContact>, sqlx::Error> {
        let query = format!(
            "UPDATE campaign_contacts SET
                queue_status = $3, current_agent_id = $2, updated_at = NOW()
             WHERE id = (
                SELECT cc.id FROM campaign_contacts cc
                JOIN campaigns c ON c.id = cc.campaign_id
                WHERE cc.campaign_id = $1
                  AND c.status = $4
                  AND cc.queue_status = $5
                  AND (cc.current_agent_id IS NULL OR cc.current_agent_id = $2)
                  AND (cc.scheduled_at IS NULL OR cc.scheduled_at <= NOW())
                  AND NOT EXISTS (
                      SELECT 1 FROM agent_queue_pauses p
                      WHERE p.campaign_id = cc.campaign_id AND p.agent_id = $2
                  )
                ORDER BY {PRIORITY_ORDER}, cc.id
                LIMIT 1
                FOR UPDATE OF cc SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CampaignContact>(&query)
            .bind(campaign_id)
            .bind(agent_id)
            .bind(QUEUE_IN_PROGRESS)
            .bind(CAMPAIGN_ACTIVE)
            .bind(QUEUE_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Take a specific pending entry for `agent_id`. Returns `None` when the
    /// entry is not in the campaign or is held by another agent.
    pub async fn take(
        pool: &PgPool,
        campaign_id: DbId,
        contact_id: DbId,
        agent_id: DbId,
    ) -> Result<Option<CampaignContact>, sqlx::Error> {
        let query = format!(
            "UPDATE campaign_contacts SET
                queue_status = $4, current_agent_id = $3, updated_at = NOW()
             WHERE id = $2
               AND campaign_id = $1
               AND (queue_status = $5 OR (queue_status = $4 AND current_agent_id = $3))
               AND (current_agent_id IS NULL OR current_agent_id = $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CampaignContact>(&query)
            .bind(campaign_id)
            .bind(contact_id)
            .bind(agent_id)
            .bind(QUEUE_IN_PROGRESS)
            .bind(QUEUE_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Return an entry claimed by `agent_id` to the pending queue without
    /// recording a call. Returns `false` if the agent held no such claim.
    pub async fn release(
        pool: &PgPool,
        campaign_id: DbId,
        contact_id: DbId,
        agent_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaign_contacts SET
                queue_status = $4, current_agent_id = NULL, updated_at = NOW()
             WHERE id = $2 AND campaign_id = $1
               AND current_agent_id = $3 AND queue_status = $5",
        )
        .bind(campaign_id)
        .bind(contact_id)
        .bind(agent_id)
        .bind(QUEUE_PENDING)
        .bind(QUEUE_IN_PROGRESS)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pending entries whose follow-up time was set by one of `agent_id`'s
    /// calls, soonest first. Overdue follow-ups are included.
    pub async fn scheduled_for_agent(
        pool: &PgPool,
        agent_id: DbId,
    ) -> Result<Vec<ScheduledCall>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledCall>(
            "SELECT cc.id, cc.campaign_id, c.name AS campaign_name, cc.lead_id,
                    cc.full_name, cc.phone, cc.priority, cc.scheduled_at,
                    cc.attempts, cc.last_outcome
             FROM campaign_contacts cc
             JOIN campaigns c ON c.id = cc.campaign_id
             WHERE cc.queue_status = $2
               AND cc.scheduled_at IS NOT NULL
               AND EXISTS (
                   SELECT 1 FROM calls k
                   WHERE k.queue_contact_id = cc.id
                     AND k.agent_id = $1
                     AND k.reschedule_at = cc.scheduled_at
               )
             ORDER BY cc.scheduled_at, cc.id",
        )
        .bind(agent_id)
        .bind(QUEUE_PENDING)
        .fetch_all(pool)
        .await
    }

    /// Stop handing out entries of this campaign to `agent_id`. Pausing twice
    /// is a no-op.
    pub async fn pause(
        pool: &PgPool,
        campaign_id: DbId,
        agent_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO agent_queue_pauses (campaign_id, agent_id)
             VALUES ($1, $2)
             ON CONFLICT (campaign_id, agent_id) DO NOTHING",
        )
        .bind(campaign_id)
        .bind(agent_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Resume dispatch. Returns `false` if the queue was not paused.
    pub async fn resume(
        pool: &PgPool,
        campaign_id: DbId,
        agent_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM agent_queue_pauses WHERE campaign_id = $1 AND agent_id = $2")
                .bind(campaign_id)
                .bind(agent_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_paused(
        pool: &PgPool,
        campaign_id: DbId,
        agent_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM agent_queue_pauses WHERE campaign_id = $1 AND agent_id = $2
             )",
        )
        .bind(campaign_id)
        .bind(agent_id)
        .fetch_one(pool)
        .await
    }
}
