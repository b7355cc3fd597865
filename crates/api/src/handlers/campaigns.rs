//! Handlers for campaign data: contacts, the campaign's script and stored
//! script documents, the call queue and its pause switch, and call history.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use telesales_core::collaborators::{Contact, ContactQueue, ContactSource, ScriptSource};
use telesales_core::error::CoreError;
use telesales_core::script_compiler;
use telesales_core::types::DbId;
use telesales_db::models::call::CallHistoryParams;
use telesales_db::models::campaign::Campaign;
use telesales_db::models::script_file::CreateCampaignScriptFile;
use telesales_db::repositories::{
    CallRepo, CampaignRepo, ContactRepo, ScriptFileRepo, ScriptRepo,
};

use crate::error::{AppError, AppResult};
use crate::handlers::scripts::CompiledScript;
use crate::middleware::agent::AgentId;
use crate::response::DataResponse;
use crate::state::AppState;

/// Content type of documents compiled from a linked script.
const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// Content type stored when an upload does not declare one.
const DEFAULT_UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /campaigns/{id}/script-link`.
#[derive(Debug, Deserialize)]
pub struct LinkScriptRequest {
    pub script_id: DbId,
}

pub(crate) async fn find_campaign(state: &AppState, id: DbId) -> AppResult<Campaign> {
    CampaignRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Contacts and script
// ---------------------------------------------------------------------------

/// GET /campaigns/{id}/contacts
pub async fn list_contacts(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_campaign(&state, campaign_id).await?;
    let contacts = state.store.fetch_contacts_for_campaign(campaign_id).await?;
    Ok(Json(DataResponse { data: contacts }))
}

/// GET /campaigns/{id}/script
///
/// The campaign's script compiled for the call screen.
pub async fn get_campaign_script(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_campaign(&state, campaign_id).await?;
    let script = state
        .store
        .fetch_script_for_campaign(campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CampaignScript",
            id: campaign_id,
        }))?;

    Ok(Json(DataResponse {
        data: CompiledScript::of(&script),
    }))
}

/// POST /campaigns/{id}/script-link
///
/// Link a script to the campaign and store its compiled markdown as the
/// campaign's script document. The link and the document are written together.
pub async fn link_script(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Json(input): Json<LinkScriptRequest>,
) -> AppResult<impl IntoResponse> {
    let record = ScriptRepo::find_by_id(&state.pool, input.script_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Script",
            id: input.script_id,
        }))?;

    let document = script_compiler::compile(&record.script);
    let file = ScriptFileRepo::link_and_store(
        &state.pool,
        &CreateCampaignScriptFile {
            campaign_id,
            script_id: Some(input.script_id),
            file_name: document.file_name(),
            content_type: MARKDOWN_CONTENT_TYPE.to_string(),
            description: Some(format!("Compiled from script '{}'", record.script.name)),
            content: document.to_markdown().into_bytes(),
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Campaign",
        id: campaign_id,
    }))?;

    tracing::info!(
        campaign_id,
        script_id = input.script_id,
        file_id = file.id,
        "Script linked to campaign",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: file })))
}

/// POST /campaigns/{id}/script-files
///
/// Store an externally authored script document as-is. Multipart form with a
/// required `file` field and an optional `description` field.
pub async fn upload_script_file(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    find_campaign(&state, campaign_id).await?;

    let mut file_data: Option<(String, String, Vec<u8>)> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("script").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_UPLOAD_CONTENT_TYPE)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file_data = Some((file_name, content_type, data.to_vec()));
            }
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                description = Some(text).filter(|d| !d.trim().is_empty());
            }
            _ => {}
        }
    }

    let (file_name, content_type, content) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if content.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if content.len() > state.config.max_upload_bytes {
        return Err(AppError::BadRequest(format!(
            "Uploaded file exceeds the {} byte limit",
            state.config.max_upload_bytes
        )));
    }

    let file = ScriptFileRepo::create(
        &state.pool,
        &CreateCampaignScriptFile {
            campaign_id,
            script_id: None,
            file_name,
            content_type,
            description,
            content,
        },
    )
    .await?;

    tracing::info!(
        campaign_id,
        file_id = file.id,
        size_bytes = file.size_bytes,
        "Script file uploaded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: file })))
}

/// GET /campaigns/{id}/script-files/latest
pub async fn latest_script_file(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let file = ScriptFileRepo::latest_for_campaign(&state.pool, campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CampaignScriptFile",
            id: campaign_id,
        }))?;
    Ok(Json(DataResponse { data: file }))
}

/// GET /campaigns/{id}/script-files/latest/content
///
/// Download the bytes of the newest document.
pub async fn download_latest_script_file(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let file = ScriptFileRepo::latest_content(&state.pool, campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CampaignScriptFile",
            id: campaign_id,
        }))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        file.file_name.replace(['"', '\\', '\r', '\n'], "_")
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    ))
}

// ---------------------------------------------------------------------------
// Queue and history
// ---------------------------------------------------------------------------

/// POST /campaigns/{id}/queue/next
///
/// Claim the next callable contact for the agent. `data` is `null` when the
/// queue is exhausted.
pub async fn claim_next_contact(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_campaign(&state, campaign_id).await?;
    let contact: Option<Contact> = state
        .store
        .fetch_next_queued_contact(campaign_id, agent.0)
        .await?;

    tracing::debug!(
        campaign_id,
        agent_id = agent.0,
        contact_id = contact.as_ref().map(|c| c.id),
        "Next contact requested",
    );
    Ok(Json(DataResponse { data: contact }))
}

/// POST /campaigns/{id}/queue/{contact_id}/take
///
/// Claim a specific pending contact for the agent.
pub async fn take_contact(
    agent: AgentId,
    State(state): State<AppState>,
    Path((campaign_id, contact_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let row = ContactRepo::take(&state.pool, campaign_id, contact_id, agent.0)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Contact {contact_id} is not available in campaign {campaign_id}"
            )))
        })?;

    tracing::info!(campaign_id, contact_id, agent_id = agent.0, "Contact taken");
    Ok(Json(DataResponse {
        data: Contact::from(row),
    }))
}

/// Whether the queue of a campaign is paused for an agent.
#[derive(Debug, Serialize)]
pub struct QueuePauseState {
    pub campaign_id: DbId,
    pub agent_id: DbId,
    pub paused: bool,
}

/// POST /campaigns/{id}/queue/pause
///
/// Stop handing out queued contacts of this campaign to the agent. Taking a
/// specific contact still works.
pub async fn pause_queue(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_campaign(&state, campaign_id).await?;
    ContactRepo::pause(&state.pool, campaign_id, agent.0).await?;

    tracing::info!(campaign_id, agent_id = agent.0, "Queue paused");
    Ok(Json(DataResponse {
        data: QueuePauseState {
            campaign_id,
            agent_id: agent.0,
            paused: true,
        },
    }))
}

/// POST /campaigns/{id}/queue/resume
pub async fn resume_queue(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_campaign(&state, campaign_id).await?;
    if ContactRepo::resume(&state.pool, campaign_id, agent.0).await? {
        tracing::info!(campaign_id, agent_id = agent.0, "Queue resumed");
    }
    Ok(Json(DataResponse {
        data: QueuePauseState {
            campaign_id,
            agent_id: agent.0,
            paused: false,
        },
    }))
}

/// GET /campaigns/{id}/calls?agent_id=&limit=&offset=
pub async fn list_calls(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Query(params): Query<CallHistoryParams>,
) -> AppResult<impl IntoResponse> {
    find_campaign(&state, campaign_id).await?;
    let calls = CallRepo::list_history(&state.pool, campaign_id, &params).await?;
    Ok(Json(DataResponse { data: calls }))
}
