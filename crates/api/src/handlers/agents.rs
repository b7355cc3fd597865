//! Handlers scoped to the calling agent.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use telesales_db::repositories::ContactRepo;

use crate::error::AppResult;
use crate::middleware::agent::AgentId;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /agents/me/scheduled-calls
///
/// Follow-ups the agent scheduled that are still pending, soonest first.
pub async fn scheduled_calls(
    agent: AgentId,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let calls = ContactRepo::scheduled_for_agent(&state.pool, agent.0).await?;
    Ok(Json(DataResponse { data: calls }))
}
