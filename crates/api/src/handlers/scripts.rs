//! Handlers for script authoring: CRUD, blank drafts, re-hydration for edit,
//! and compiled previews.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use telesales_core::error::{CoreError, ValidationError};
use telesales_core::script::{self, CallType, Script, ScriptStatus, Section};
use telesales_core::script_compiler::{self, Document};
use telesales_core::types::DbId;
use telesales_db::models::script::ScriptRecord;
use telesales_db::repositories::ScriptRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Script as submitted by the authoring form.
///
/// Sections arrive as a list; a kind that appears twice is a validation
/// error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct ScriptInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub objective: String,
    pub call_type: Option<CallType>,
    pub internal_notes: Option<String>,
    #[serde(default)]
    pub status: ScriptStatus,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl ScriptInput {
    pub fn into_script(self) -> Result<Script, ValidationError> {
        let mut script = Script::blank().with_sections(self.sections)?;
        script.name = self.name;
        script.objective = self.objective;
        script.call_type = self.call_type;
        script.internal_notes = self.internal_notes;
        script.status = self.status;
        Ok(script)
    }
}

/// A compiled script together with its markdown rendering.
#[derive(Debug, Serialize)]
pub struct CompiledScript {
    pub document: Document,
    pub markdown: String,
    pub file_name: String,
}

impl CompiledScript {
    pub fn of(script: &Script) -> Self {
        let document = script_compiler::compile(script);
        Self {
            markdown: document.to_markdown(),
            file_name: document.file_name(),
            document,
        }
    }
}

async fn find_script(state: &AppState, id: DbId) -> AppResult<ScriptRecord> {
    ScriptRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Script",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /scripts
pub async fn list_scripts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let scripts = ScriptRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: scripts }))
}

/// GET /scripts/blank
///
/// Authoring starting point with all five sections present and empty.
pub async fn blank_script() -> Json<DataResponse<Script>> {
    Json(DataResponse {
        data: Script::blank(),
    })
}

/// POST /scripts/preview
///
/// Compile an unsaved draft. Missing metadata renders as placeholders.
pub async fn preview_script(Json(input): Json<ScriptInput>) -> AppResult<impl IntoResponse> {
    let script = input.into_script()?;
    Ok(Json(DataResponse {
        data: CompiledScript::of(&script),
    }))
}

/// POST /scripts
pub async fn create_script(
    State(state): State<AppState>,
    Json(input): Json<ScriptInput>,
) -> AppResult<impl IntoResponse> {
    let valid = script::validate(input.into_script()?)?;
    let record = ScriptRepo::create(&state.pool, &valid).await?;

    tracing::info!(
        script_id = record.script.id,
        call_type = valid.call_type().as_str(),
        sections = record.script.sections().count(),
        "Script created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /scripts/{id}
pub async fn get_script(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = find_script(&state, id).await?;
    Ok(Json(DataResponse { data: record }))
}

/// GET /scripts/{id}/edit
///
/// The stored script expanded back to all five sections for the editor.
pub async fn edit_script(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = find_script(&state, id).await?;
    Ok(Json(DataResponse {
        data: record.script.rehydrate(),
    }))
}

/// PUT /scripts/{id}
pub async fn update_script(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ScriptInput>,
) -> AppResult<impl IntoResponse> {
    let valid = script::validate(input.into_script()?)?;
    let record = ScriptRepo::update(&state.pool, id, &valid)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Script",
            id,
        }))?;

    tracing::info!(script_id = id, "Script updated");
    Ok(Json(DataResponse { data: record }))
}

/// DELETE /scripts/{id}
pub async fn delete_script(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ScriptRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Script",
            id,
        }));
    }
    tracing::info!(script_id = id, "Script deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /scripts/{id}/document
pub async fn get_script_document(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = find_script(&state, id).await?;
    Ok(Json(DataResponse {
        data: CompiledScript::of(&record.script),
    }))
}
