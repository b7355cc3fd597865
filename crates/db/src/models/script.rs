//! Script models: the `scripts` row, its `script_sections` rows, and the
//! assembled record returned to callers.

use serde::Serialize;
use sqlx::FromRow;
use telesales_core::error::CoreError;
use telesales_core::script::{CallType, Script, ScriptStatus, Section, SectionKind};
use telesales_core::types::{DbId, Timestamp};

/// A row from the `scripts` table.
#[derive(Debug, Clone, FromRow)]
pub struct ScriptRow {
    pub id: DbId,
    pub name: String,
    pub objective: String,
    pub call_type: String,
    pub internal_notes: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `script_sections` table.
#[derive(Debug, Clone, FromRow)]
pub struct ScriptSectionRow {
    pub script_id: DbId,
    pub kind: String,
    pub content: String,
    pub sort_order: i16,
}

/// A persisted script with its sections.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptRecord {
    #[serde(flatten)]
    pub script: Script,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ScriptRecord {
    /// Assemble a record from its rows. Stored codes that no longer parse
    /// are reported as errors rather than skipped.
    pub fn from_rows(row: ScriptRow, sections: Vec<ScriptSectionRow>) -> Result<Self, CoreError> {
        let sections = sections
            .into_iter()
            .map(|s| Ok(Section::new(SectionKind::from_str(&s.kind)?, s.content)))
            .collect::<Result<Vec<_>, CoreError>>()?;

        let mut script = Script::blank()
            .with_sections(sections)
            .map_err(|e| CoreError::Internal(format!("script {}: {e}", row.id)))?;
        script.id = Some(row.id);
        script.name = row.name;
        script.objective = row.objective;
        script.call_type = Some(CallType::from_str(&row.call_type)?);
        script.internal_notes = row.internal_notes;
        script.status = ScriptStatus::from_str(&row.status)?;

        Ok(Self {
            script,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
