//! Handlers driving one agent's call: open a session on a contact, begin and
//! end the call, poll the timer, save the result, or discard the attempt.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use telesales_core::call_result::{CallTarget, ResultSelection};
use telesales_core::collaborators::{CampaignContext, Contact};
use telesales_core::error::CoreError;
use telesales_core::types::DbId;
use telesales_db::repositories::ContactRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::campaigns::find_campaign;
use crate::middleware::agent::AgentId;
use crate::response::DataResponse;
use crate::sessions::{SessionHandle, SessionStatus};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /campaigns/{id}/calls/session`.
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub contact_id: DbId,
}

/// Body of `POST /campaigns/{id}/calls/session/result`.
#[derive(Debug, Deserialize)]
pub struct SaveResultRequest {
    #[serde(flatten)]
    pub selection: ResultSelection,
    /// Go straight to the next queued contact after saving.
    #[serde(default)]
    pub continue_to_next: bool,
}

/// A freshly opened session with the contact it targets.
#[derive(Debug, Serialize)]
pub struct OpenedSession {
    pub contact: Contact,
    pub session: SessionStatus,
}

async fn session_for(
    state: &AppState,
    agent: AgentId,
    campaign_id: DbId,
) -> AppResult<SessionHandle> {
    state
        .sessions
        .get(agent.0, campaign_id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CallSession",
            id: agent.0,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /campaigns/{id}/calls/session
///
/// Claim the contact for the agent and open a call session on it.
pub async fn open_session(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Json(input): Json<OpenSessionRequest>,
) -> AppResult<impl IntoResponse> {
    if state.sessions.is_open(agent.0).await {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Agent {} already has an open call session",
            agent.0
        ))));
    }
    find_campaign(&state, campaign_id).await?;

    let row = ContactRepo::take(&state.pool, campaign_id, input.contact_id, agent.0)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Contact {} is not available in campaign {campaign_id}",
                input.contact_id
            )))
        })?;
    let contact = Contact::from(row);

    let ctx = CampaignContext {
        campaign_id,
        agent_id: agent.0,
    };
    let handle = match state.sessions.open(ctx, CallTarget::from(&contact)).await {
        Ok(handle) => handle,
        Err(err) => {
            // Another open for this agent won the race; hand our claim back
            // unless the winner is working the same entry.
            if !state.sessions.holds_contact(agent.0, contact.id).await {
                ContactRepo::release(&state.pool, campaign_id, contact.id, agent.0).await?;
            }
            return Err(err.into());
        }
    };
    let session = SessionStatus::of(&*handle.lock().await);

    tracing::info!(
        campaign_id,
        agent_id = agent.0,
        contact_id = contact.id,
        "Call session opened",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: OpenedSession { contact, session },
        }),
    ))
}

/// GET /campaigns/{id}/calls/session
///
/// Current phase and elapsed seconds, polled by the call screen.
pub async fn get_session(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let handle = session_for(&state, agent, campaign_id).await?;
    let status = SessionStatus::of(&*handle.lock().await);
    Ok(Json(DataResponse { data: status }))
}

/// POST /campaigns/{id}/calls/session/begin
pub async fn begin_call(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let handle = session_for(&state, agent, campaign_id).await?;
    let mut orch = handle.lock().await;
    let started_at = orch.begin_call()?;

    tracing::info!(
        campaign_id,
        agent_id = agent.0,
        contact_id = orch.target().contact_id,
        %started_at,
        "Call started",
    );
    Ok(Json(DataResponse {
        data: SessionStatus::of(&orch),
    }))
}

/// POST /campaigns/{id}/calls/session/end
///
/// End the call and freeze its timing for the result form.
pub async fn end_call(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let handle = session_for(&state, agent, campaign_id).await?;
    let mut orch = handle.lock().await;
    let timing = orch.end_call()?;

    tracing::info!(
        campaign_id,
        agent_id = agent.0,
        contact_id = orch.target().contact_id,
        duration_seconds = timing.duration_seconds,
        "Call ended",
    );
    Ok(Json(DataResponse {
        data: SessionStatus::of(&orch),
    }))
}

/// POST /campaigns/{id}/calls/session/result
///
/// Record the result of the ended call and return where the agent goes next.
/// On failure the session keeps its frozen timing so the save can be retried.
pub async fn save_result(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Json(input): Json<SaveResultRequest>,
) -> AppResult<impl IntoResponse> {
    let handle = session_for(&state, agent, campaign_id).await?;
    let next = {
        let mut orch = handle.lock().await;
        orch.save_result(
            input.selection,
            input.continue_to_next,
            &state.store,
            &state.store,
        )
        .await?
    };
    state.sessions.close(agent.0).await;

    tracing::info!(
        campaign_id,
        agent_id = agent.0,
        next = ?next,
        "Call result saved",
    );
    Ok(Json(DataResponse { data: next }))
}

/// DELETE /campaigns/{id}/calls/session
///
/// Abandon the attempt without recording anything and hand the contact back
/// to the queue.
pub async fn discard_session(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let handle = session_for(&state, agent, campaign_id).await?;
    let target = {
        let mut orch = handle.lock().await;
        orch.discard();
        orch.target()
    };
    state.sessions.close(agent.0).await;

    if let Some(queue_contact_id) = target.queue_contact_id {
        ContactRepo::release(&state.pool, campaign_id, queue_contact_id, agent.0).await?;
    }

    tracing::info!(
        campaign_id,
        agent_id = agent.0,
        contact_id = target.contact_id,
        "Call session discarded",
    );
    Ok(StatusCode::NO_CONTENT)
}
