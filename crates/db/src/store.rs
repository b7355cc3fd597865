//! Database-backed implementation of the call-flow collaborator traits.

use async_trait::async_trait;
use sqlx::PgPool;
use telesales_core::call_result::CallOutcome;
use telesales_core::collaborators::{
    Contact, ContactQueue, ContactSource, OutcomeRecorder, ScriptSource,
};
use telesales_core::error::SubmitError;
use telesales_core::script::Script;
use telesales_core::types::DbId;

use crate::repositories::{CallRepo, ContactRepo, ScriptRepo};

/// Connects the core call flow to PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgCallCenterStore {
    pool: PgPool,
}

impl PgCallCenterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn submit_failed(operation: &'static str, campaign_id: DbId, err: sqlx::Error) -> SubmitError {
    tracing::error!(operation, campaign_id, error = %err, "Store operation failed");
    SubmitError::SubmitFailed(format!("{operation}: {err}"))
}

#[async_trait]
impl ContactSource for PgCallCenterStore {
    async fn fetch_contacts_for_campaign(
        &self,
        campaign_id: DbId,
    ) -> Result<Vec<Contact>, SubmitError> {
        let rows = ContactRepo::list_by_campaign(&self.pool, campaign_id)
            .await
            .map_err(|e| submit_failed("fetch_contacts", campaign_id, e))?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }
}

#[async_trait]
impl ScriptSource for PgCallCenterStore {
    async fn fetch_script_for_campaign(
        &self,
        campaign_id: DbId,
    ) -> Result<Option<Script>, SubmitError> {
        let record = ScriptRepo::find_for_campaign(&self.pool, campaign_id)
            .await
            .map_err(|e| submit_failed("fetch_script", campaign_id, e))?;
        Ok(record.map(|r| r.script))
    }
}

#[async_trait]
impl OutcomeRecorder for PgCallCenterStore {
    async fn record_call_outcome(
        &self,
        campaign_id: DbId,
        agent_id: DbId,
        outcome: &CallOutcome,
    ) -> Result<(), SubmitError> {
        let record = CallRepo::record(&self.pool, campaign_id, agent_id, outcome)
            .await
            .map_err(|e| submit_failed("record_call_outcome", campaign_id, e))?;
        tracing::info!(
            call_id = record.id,
            campaign_id,
            agent_id,
            contact_id = outcome.contact_id(),
            outcome = outcome.outcome().as_str(),
            duration_seconds = outcome.duration_seconds(),
            "Call outcome recorded",
        );
        Ok(())
    }
}

#[async_trait]
impl ContactQueue for PgCallCenterStore {
    async fn fetch_next_queued_contact(
        &self,
        campaign_id: DbId,
        agent_id: DbId,
    ) -> Result<Option<Contact>, SubmitError> {
        let row = ContactRepo::claim_next(&self.pool, campaign_id, agent_id)
            .await
            .map_err(|e| submit_failed("fetch_next_contact", campaign_id, e))?;
        Ok(row.map(Contact::from))
    }
}
