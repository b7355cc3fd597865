//! In-memory registry of open call sessions.
//!
//! An agent works one call at a time, so sessions are keyed by agent id.
//! Each orchestrator sits behind its own async mutex: a slow `save_result`
//! for one agent never blocks another agent's display polling.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use telesales_core::call_result::CallTarget;
use telesales_core::call_session::{CallTiming, DISPLAY_TICK_SECS};
use telesales_core::collaborators::CampaignContext;
use telesales_core::error::CoreError;
use telesales_core::orchestrator::{FlowPhase, SessionOrchestrator};
use telesales_core::types::{DbId, Timestamp};
use tokio::sync::{Mutex, RwLock};

/// Shared handle to one agent's orchestrator.
pub type SessionHandle = Arc<Mutex<SessionOrchestrator>>;

/// Open call sessions keyed by agent id.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<DbId, OpenSession>>,
}

struct OpenSession {
    campaign_id: DbId,
    queue_contact_id: Option<DbId>,
    handle: SessionHandle,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a session for `ctx.agent_id`. Fails with `Conflict` if the agent
    /// already has one.
    pub async fn open(
        &self,
        ctx: CampaignContext,
        target: CallTarget,
    ) -> Result<SessionHandle, CoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&ctx.agent_id) {
            return Err(CoreError::Conflict(format!(
                "Agent {} already has an open call session",
                ctx.agent_id
            )));
        }
        let handle = Arc::new(Mutex::new(SessionOrchestrator::new(ctx, target)));
        sessions.insert(
            ctx.agent_id,
            OpenSession {
                campaign_id: ctx.campaign_id,
                queue_contact_id: target.queue_contact_id,
                handle: Arc::clone(&handle),
            },
        );
        Ok(handle)
    }

    /// The agent's session, if it belongs to `campaign_id`.
    pub async fn get(&self, agent_id: DbId, campaign_id: DbId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&agent_id)
            .filter(|open| open.campaign_id == campaign_id)
            .map(|open| Arc::clone(&open.handle))
    }

    /// Whether the agent's open session is working queue entry `contact_id`.
    pub async fn holds_contact(&self, agent_id: DbId, contact_id: DbId) -> bool {
        self.sessions
            .read()
            .await
            .get(&agent_id)
            .is_some_and(|open| open.queue_contact_id == Some(contact_id))
    }

    pub async fn is_open(&self, agent_id: DbId) -> bool {
        self.sessions.read().await.contains_key(&agent_id)
    }

    /// Drop the agent's session. Returns `true` if one was open.
    pub async fn close(&self, agent_id: DbId) -> bool {
        self.sessions.write().await.remove(&agent_id).is_some()
    }

    /// Number of open sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Snapshot of a session for the call screen.
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub campaign_id: DbId,
    pub agent_id: DbId,
    pub contact_id: DbId,
    pub lead_id: DbId,
    pub phase: FlowPhase,
    pub started_at: Option<Timestamp>,
    pub elapsed_seconds: i64,
    /// Frozen timing of an ended call waiting for its result.
    pub captured: Option<CallTiming>,
    /// How often the screen should refresh `elapsed_seconds`.
    pub poll_interval_secs: u64,
}

impl SessionStatus {
    pub fn of(orch: &SessionOrchestrator) -> Self {
        let ctx = orch.context();
        let target = orch.target();
        Self {
            campaign_id: ctx.campaign_id,
            agent_id: ctx.agent_id,
            contact_id: target.contact_id,
            lead_id: target.lead_id,
            phase: orch.phase(),
            started_at: orch.started_at(),
            elapsed_seconds: orch.elapsed(),
            captured: orch.captured_timing(),
            poll_interval_secs: DISPLAY_TICK_SECS,
        }
    }
}
