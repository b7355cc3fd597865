//! Read-only aggregates for campaign and agent metrics.

use sqlx::PgPool;
use telesales_core::call_result::{
    OutcomeKind, ALL_OUTCOMES, QUEUE_COMPLETED, QUEUE_IN_PROGRESS, QUEUE_PENDING,
};
use telesales_core::metrics::OutcomeTally;
use telesales_core::types::DbId;

use crate::models::metrics::{
    DailyCalls, MetricsScope, MetricsWindow, OutcomeTallyRow, QueueCounts,
};

/// Calls of the scope inside the window. `$1` campaign, `$2` optional agent,
/// `$3`/`$4` window bounds.
const SCOPED_CALLS: &str = "campaign_id = $1
    AND ($2::BIGINT IS NULL OR agent_id = $2)
    AND started_at >= $3 AND started_at < $4";

/// Provides metrics queries.
pub struct MetricsRepo;

impl MetricsRepo {
    /// Calls and summed duration per outcome.
    pub async fn outcome_tallies(
        pool: &PgPool,
        scope: MetricsScope,
        window: MetricsWindow,
    ) -> Result<Vec<OutcomeTally>, sqlx::Error> {
        let query = format!(
            "SELECT outcome,
                    COUNT(*)::BIGINT AS calls,
                    COALESCE(SUM(duration_seconds), 0)::BIGINT AS duration_seconds
             FROM calls
             WHERE {SCOPED_CALLS}
             GROUP BY outcome"
        );
        let rows = sqlx::query_as::<_, OutcomeTallyRow>(&query)
            .bind(scope.campaign_id)
            .bind(scope.agent_id)
            .bind(window.from)
            .bind(window.to)
            .fetch_all(pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let outcome = OutcomeKind::from_str(&row.outcome)
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                Ok(OutcomeTally {
                    outcome,
                    calls: row.calls,
                    duration_seconds: row.duration_seconds,
                })
            })
            .collect()
    }

    /// Calls per UTC day, oldest first. Days without calls are omitted.
    pub async fn daily_calls(
        pool: &PgPool,
        scope: MetricsScope,
        window: MetricsWindow,
    ) -> Result<Vec<DailyCalls>, sqlx::Error> {
        let query = format!(
            "SELECT (started_at AT TIME ZONE 'UTC')::DATE AS day,
                    COUNT(*)::BIGINT AS total_calls,
                    COUNT(*) FILTER (WHERE outcome = ANY($5))::BIGINT AS effective_calls
             FROM calls
             WHERE {SCOPED_CALLS}
             GROUP BY day
             ORDER BY day"
        );
        sqlx::query_as::<_, DailyCalls>(&query)
            .bind(scope.campaign_id)
            .bind(scope.agent_id)
            .bind(window.from)
            .bind(window.to)
            .bind(effective_codes())
            .fetch_all(pool)
            .await
    }

    /// Queue entries of a campaign by status.
    pub async fn queue_counts(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<QueueCounts, sqlx::Error> {
        sqlx::query_as::<_, QueueCounts>(
            "SELECT
                COUNT(*) FILTER (WHERE queue_status = $2)::BIGINT AS pending,
                COUNT(*) FILTER (WHERE queue_status = $3)::BIGINT AS in_progress,
                COUNT(*) FILTER (WHERE queue_status = $4)::BIGINT AS completed
             FROM campaign_contacts
             WHERE campaign_id = $1",
        )
        .bind(campaign_id)
        .bind(QUEUE_PENDING)
        .bind(QUEUE_IN_PROGRESS)
        .bind(QUEUE_COMPLETED)
        .fetch_one(pool)
        .await
    }
}

fn effective_codes() -> Vec<String> {
    ALL_OUTCOMES
        .into_iter()
        .filter(|o| o.is_effective())
        .map(|o| o.as_str().to_string())
        .collect()
}
