//! Agent identity extractor.
//!
//! Authentication happens in the gateway in front of this service, which
//! forwards the authenticated agent's id in the `X-Agent-Id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use telesales_core::error::CoreError;
use telesales_core::types::DbId;

use crate::error::AppError;

/// Header carrying the agent id.
pub const AGENT_ID_HEADER: &str = "x-agent-id";

/// The agent making the request.
///
/// ```ignore
/// async fn my_handler(agent: AgentId) -> AppResult<Json<()>> {
///     tracing::info!(agent_id = agent.0, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentId(pub DbId);

impl<S: Send + Sync> FromRequestParts<S> for AgentId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(AGENT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing X-Agent-Id header".into()))
            })?;

        let id: DbId = raw.trim().parse().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "X-Agent-Id must be a numeric agent id".into(),
            ))
        })?;
        if id <= 0 {
            return Err(AppError::Core(CoreError::Unauthorized(
                "X-Agent-Id must be a positive agent id".into(),
            )));
        }

        Ok(AgentId(id))
    }
}
