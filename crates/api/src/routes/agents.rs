//! Route definitions for the calling agent.
//!
//! Mounted at `/agents` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::agents;
use crate::state::AppState;

/// ```text
/// GET /me/scheduled-calls -> scheduled_calls
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/me/scheduled-calls", get(agents::scheduled_calls))
}
