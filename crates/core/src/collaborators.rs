//! Contracts the call flow needs from the outside world.
//!
//! The persistence crate implements these against the database; tests use
//! in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::call_result::CallOutcome;
use crate::error::SubmitError;
use crate::script::Script;
use crate::types::{DbId, Timestamp};

/// Campaign and agent a call flow runs for.
///
/// The agent id comes from the authentication layer and is passed through
/// explicitly; nothing in the core assumes a current agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignContext {
    pub campaign_id: DbId,
    pub agent_id: DbId,
}

/// A queue entry as the call screen sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    /// Queue entry id.
    pub id: DbId,
    pub campaign_id: DbId,
    pub lead_id: DbId,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub priority: String,
    pub queue_status: String,
    pub attempts: i32,
    pub last_call_at: Option<Timestamp>,
    pub last_outcome: Option<String>,
}

#[async_trait]
pub trait ContactSource: Send + Sync {
    async fn fetch_contacts_for_campaign(
        &self,
        campaign_id: DbId,
    ) -> Result<Vec<Contact>, SubmitError>;
}

#[async_trait]
pub trait ScriptSource: Send + Sync {
    async fn fetch_script_for_campaign(
        &self,
        campaign_id: DbId,
    ) -> Result<Option<Script>, SubmitError>;
}

#[async_trait]
pub trait OutcomeRecorder: Send + Sync {
    /// Persist a finished call. All-or-nothing.
    async fn record_call_outcome(
        &self,
        campaign_id: DbId,
        agent_id: DbId,
        outcome: &CallOutcome,
    ) -> Result<(), SubmitError>;
}

#[async_trait]
pub trait ContactQueue: Send + Sync {
    /// Claim the next contact for `agent_id`. `None` means the queue is
    /// exhausted.
    async fn fetch_next_queued_contact(
        &self,
        campaign_id: DbId,
        agent_id: DbId,
    ) -> Result<Option<Contact>, SubmitError>;
}
