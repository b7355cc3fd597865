pub mod agents;
pub mod campaigns;
pub mod health;
pub mod scripts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /scripts                                        list, create
/// /scripts/blank                                  blank authoring draft
/// /scripts/preview                                compile an unsaved draft
/// /scripts/{id}                                   get, update, delete
/// /scripts/{id}/edit                              draft re-hydrated for edit
/// /scripts/{id}/document                          compiled document
///
/// /campaigns/{id}/contacts                        queue entries
/// /campaigns/{id}/script                          campaign script, compiled
/// /campaigns/{id}/script-link                     link script (POST)
/// /campaigns/{id}/script-files                    upload document (POST, multipart)
/// /campaigns/{id}/script-files/latest             newest document metadata
/// /campaigns/{id}/script-files/latest/content     newest document bytes
/// /campaigns/{id}/queue/next                      claim next contact (POST)
/// /campaigns/{id}/queue/{contact_id}/take         claim a specific contact (POST)
/// /campaigns/{id}/queue/pause                     pause dispatch for the agent (POST)
/// /campaigns/{id}/queue/resume                    resume dispatch (POST)
/// /campaigns/{id}/calls                           call history
/// /campaigns/{id}/calls/session                   open, status, discard
/// /campaigns/{id}/calls/session/begin             begin call (POST)
/// /campaigns/{id}/calls/session/end               end call (POST)
/// /campaigns/{id}/calls/session/result            save result (POST)
/// /campaigns/{id}/metrics                         outcome stats and queue progress
/// /campaigns/{id}/metrics/agent                   outcome stats for the agent
///
/// /agents/me/scheduled-calls                      the agent's pending follow-ups
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/scripts", scripts::router())
        .nest("/campaigns", campaigns::router(max_upload_bytes))
        .nest("/agents", agents::router())
}
