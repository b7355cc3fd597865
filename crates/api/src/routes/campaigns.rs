//! Route definitions for campaign data, the call flow and metrics.
//!
//! Mounted at `/campaigns` by `api_routes()`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{call_sessions, campaigns, metrics};
use crate::state::AppState;

/// Campaign routes.
///
/// ```text
/// GET    /{id}/contacts                    -> list_contacts
/// GET    /{id}/script                      -> get_campaign_script
/// POST   /{id}/script-link                 -> link_script
/// POST   /{id}/script-files                -> upload_script_file (multipart)
/// GET    /{id}/script-files/latest         -> latest_script_file
/// GET    /{id}/script-files/latest/content -> download_latest_script_file
/// POST   /{id}/queue/next                  -> claim_next_contact
/// POST   /{id}/queue/{contact_id}/take     -> take_contact
/// POST   /{id}/queue/pause                 -> pause_queue
/// POST   /{id}/queue/resume                -> resume_queue
/// GET    /{id}/calls                       -> list_calls (?agent_id, limit, offset)
/// POST   /{id}/calls/session               -> open_session
/// GET    /{id}/calls/session               -> get_session
/// DELETE /{id}/calls/session               -> discard_session
/// POST   /{id}/calls/session/begin         -> begin_call
/// POST   /{id}/calls/session/end           -> end_call
/// POST   /{id}/calls/session/result        -> save_result
/// GET    /{id}/metrics                     -> campaign_metrics (?from, to)
/// GET    /{id}/metrics/agent               -> agent_metrics (?from, to)
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/{id}/contacts", get(campaigns::list_contacts))
        .route("/{id}/script", get(campaigns::get_campaign_script))
        .route("/{id}/script-link", post(campaigns::link_script))
        .route(
            "/{id}/script-files",
            // Headroom for multipart framing; the handler enforces the file limit.
            post(campaigns::upload_script_file)
                .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(64 * 1024))),
        )
        .route(
            "/{id}/script-files/latest",
            get(campaigns::latest_script_file),
        )
        .route(
            "/{id}/script-files/latest/content",
            get(campaigns::download_latest_script_file),
        )
        .route("/{id}/queue/next", post(campaigns::claim_next_contact))
        .route(
            "/{id}/queue/{contact_id}/take",
            post(campaigns::take_contact),
        )
        .route("/{id}/queue/pause", post(campaigns::pause_queue))
        .route("/{id}/queue/resume", post(campaigns::resume_queue))
        .route("/{id}/calls", get(campaigns::list_calls))
        .route(
            "/{id}/calls/session",
            get(call_sessions::get_session)
                .post(call_sessions::open_session)
                .delete(call_sessions::discard_session),
        )
        .route("/{id}/calls/session/begin", post(call_sessions::begin_call))
        .route("/{id}/calls/session/end", post(call_sessions::end_call))
        .route(
            "/{id}/calls/session/result",
            post(call_sessions::save_result),
        )
        .route("/{id}/metrics", get(metrics::campaign_metrics))
        .route("/{id}/metrics/agent", get(metrics::agent_metrics))
}
