//! Repository for the `scripts` and `script_sections` tables.
//!
//! A script and its sections are always written in one transaction.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use telesales_core::script::ValidScript;
use telesales_core::types::DbId;

use crate::models::script::{ScriptRecord, ScriptRow, ScriptSectionRow};

/// Column list for scripts queries.
const COLUMNS: &str =
    "id, name, objective, call_type, internal_notes, status, created_at, updated_at";

/// Column list for script_sections queries.
const SECTION_COLUMNS: &str = "script_id, kind, content, sort_order";

/// Provides CRUD operations for scripts.
pub struct ScriptRepo;

impl ScriptRepo {
    /// Insert a validated script and its sections, returning the stored record.
    pub async fn create(pool: &PgPool, input: &ValidScript) -> Result<ScriptRecord, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO scripts (name, objective, call_type, internal_notes, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ScriptRow>(&query)
            .bind(input.name.trim())
            .bind(input.objective.trim())
            .bind(input.call_type().as_str())
            .bind(input.internal_notes.as_deref())
            .bind(input.status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let sections = insert_sections(&mut tx, row.id, input).await?;
        tx.commit().await?;

        into_record(row, sections)
    }

    /// Replace a script's fields and sections. Returns `None` if the script
    /// does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ValidScript,
    ) -> Result<Option<ScriptRecord>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE scripts SET
                name = $2, objective = $3, call_type = $4, internal_notes = $5,
                status = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(row) = sqlx::query_as::<_, ScriptRow>(&query)
            .bind(id)
            .bind(input.name.trim())
            .bind(input.objective.trim())
            .bind(input.call_type().as_str())
            .bind(input.internal_notes.as_deref())
            .bind(input.status.as_str())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM script_sections WHERE script_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let sections = insert_sections(&mut tx, id, input).await?;
        tx.commit().await?;

        into_record(row, sections).map(Some)
    }

    /// Find a script by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ScriptRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, ScriptRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM script_sections
             WHERE script_id = $1
             ORDER BY sort_order"
        );
        let sections = sqlx::query_as::<_, ScriptSectionRow>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        into_record(row, sections).map(Some)
    }

    /// List all scripts, newest first, with their sections.
    pub async fn list(pool: &PgPool) -> Result<Vec<ScriptRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, ScriptRow>(&query)
            .fetch_all(pool)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM script_sections
             WHERE script_id = ANY($1)
             ORDER BY script_id, sort_order"
        );
        let mut by_script: HashMap<DbId, Vec<ScriptSectionRow>> = HashMap::new();
        for section in sqlx::query_as::<_, ScriptSectionRow>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?
        {
            by_script.entry(section.script_id).or_default().push(section);
        }

        rows.into_iter()
            .map(|row| {
                let sections = by_script.remove(&row.id).unwrap_or_default();
                into_record(row, sections)
            })
            .collect()
    }

    /// The script linked to a campaign, if any.
    pub async fn find_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Option<ScriptRecord>, sqlx::Error> {
        let script_id: Option<(Option<DbId>,)> =
            sqlx::query_as("SELECT script_id FROM campaigns WHERE id = $1")
                .bind(campaign_id)
                .fetch_optional(pool)
                .await?;

        match script_id {
            Some((Some(id),)) => Self::find_by_id(pool, id).await,
            _ => Ok(None),
        }
    }

    /// Delete a script. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scripts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_sections(
    tx: &mut Transaction<'_, Postgres>,
    script_id: DbId,
    input: &ValidScript,
) -> Result<Vec<ScriptSectionRow>, sqlx::Error> {
    let query = format!(
        "INSERT INTO script_sections (script_id, kind, content, sort_order)
         VALUES ($1, $2, $3, $4)
         RETURNING {SECTION_COLUMNS}"
    );
    let mut rows = Vec::new();
    for (kind, content) in input.sections() {
        let row = sqlx::query_as::<_, ScriptSectionRow>(&query)
            .bind(script_id)
            .bind(kind.as_str())
            .bind(content)
            .bind(i16::from(kind.rank()))
            .fetch_one(&mut **tx)
            .await?;
        rows.push(row);
    }
    Ok(rows)
}

fn into_record(
    row: ScriptRow,
    sections: Vec<ScriptSectionRow>,
) -> Result<ScriptRecord, sqlx::Error> {
    ScriptRecord::from_rows(row, sections).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
