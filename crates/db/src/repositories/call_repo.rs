//! Repository for the `calls` table.

use sqlx::PgPool;
use telesales_core::call_result::{CallOutcome, QueueDisposition};
use telesales_core::types::DbId;

use super::{clamp_limit, clamp_offset};
use crate::models::call::{CallHistoryParams, CallRecord};

const COLUMNS: &str = "id, campaign_id, agent_id, contact_id, lead_id, queue_contact_id, \
    outcome, reason, notes, reschedule_at, sales_handoff, opportunity_type, \
    duration_seconds, started_at, ended_at, created_at";

/// Provides operations for recorded calls.
pub struct CallRepo;

impl CallRepo {
    /// Record a call outcome and update its queue entry in one transaction.
    ///
    /// The queue entry gets one more attempt, the outcome as its last result,
    /// and is released from the agent. It returns to pending at the
    /// reschedule time when one was given, otherwise it is completed.
    /// A queue entry that no longer exists in the campaign aborts the whole
    /// write with `RowNotFound`.
    pub async fn record(
        pool: &PgPool,
        campaign_id: DbId,
        agent_id: DbId,
        outcome: &CallOutcome,
    ) -> Result<CallRecord, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let opportunity = outcome.lead_opportunity();

        let query = format!(
            "INSERT INTO calls
                (campaign_id, agent_id, contact_id, lead_id, queue_contact_id, outcome,
                 reason, notes, reschedule_at, sales_handoff, opportunity_type,
                 duration_seconds, started_at, ended_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, CallRecord>(&query)
            .bind(campaign_id)
            .bind(agent_id)
            .bind(outcome.contact_id())
            .bind(outcome.lead_id())
            .bind(outcome.queue_contact_id())
            .bind(outcome.outcome().as_str())
            .bind(outcome.reason())
            .bind(outcome.notes())
            .bind(outcome.reschedule_at())
            .bind(opportunity.is_some_and(|o| o.sales_handoff))
            .bind(opportunity.map(|o| o.opportunity_type.as_str()))
            .bind(outcome.duration_seconds())
            .bind(outcome.started_at())
            .bind(outcome.ended_at())
            .fetch_one(&mut *tx)
            .await?;

        if let Some(queue_contact_id) = outcome.queue_contact_id() {
            let disposition = QueueDisposition::for_outcome(outcome);
            let updated = sqlx::query(
                "UPDATE campaign_contacts SET
                    queue_status = $3,
                    scheduled_at = $4,
                    current_agent_id = NULL,
                    attempts = attempts + 1,
                    last_call_at = $5,
                    last_outcome = $6,
                    updated_at = NOW()
                 WHERE id = $1 AND campaign_id = $2",
            )
            .bind(queue_contact_id)
            .bind(campaign_id)
            .bind(disposition.queue_status)
            .bind(disposition.scheduled_at)
            .bind(outcome.ended_at())
            .bind(outcome.outcome().as_str())
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(sqlx::Error::RowNotFound);
            }
        }

        tx.commit().await?;
        Ok(record)
    }

    /// Calls made in a campaign, newest first, optionally for one agent.
    pub async fn list_history(
        pool: &PgPool,
        campaign_id: DbId,
        params: &CallHistoryParams,
    ) -> Result<Vec<CallRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calls
             WHERE campaign_id = $1
               AND ($2::BIGINT IS NULL OR agent_id = $2)
             ORDER BY started_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, CallRecord>(&query)
            .bind(campaign_id)
            .bind(params.agent_id)
            .bind(clamp_limit(params.limit))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }
}
