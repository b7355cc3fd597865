//! Handlers for campaign and agent call metrics.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use telesales_core::metrics::{CallStats, QueueProgress, DEFAULT_WINDOW_DAYS};
use telesales_core::types::{DbId, Timestamp};
use telesales_db::models::metrics::{DailyCalls, MetricsScope, MetricsWindow};
use telesales_db::repositories::MetricsRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::campaigns::find_campaign;
use crate::middleware::agent::AgentId;
use crate::response::DataResponse;
use crate::state::AppState;

/// Date range query parameters.
#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    /// RFC 3339 start. Defaults to 30 days ago.
    pub from: Option<String>,
    /// RFC 3339 end. Defaults to now.
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CampaignMetrics {
    pub campaign_id: DbId,
    pub window: MetricsWindow,
    pub calls: CallStats,
    pub queue: QueueProgress,
    pub daily: Vec<DailyCalls>,
}

#[derive(Debug, Serialize)]
pub struct AgentMetrics {
    pub campaign_id: DbId,
    pub agent_id: DbId,
    pub window: MetricsWindow,
    pub calls: CallStats,
    pub daily: Vec<DailyCalls>,
}

fn parse_bound(value: Option<&str>, name: &str, default: Timestamp) -> AppResult<Timestamp> {
    match value {
        Some(v) => v
            .parse::<Timestamp>()
            .map_err(|_| AppError::BadRequest(format!("Invalid '{name}' date format"))),
        None => Ok(default),
    }
}

fn window(query: &MetricsQuery) -> AppResult<MetricsWindow> {
    let now = Utc::now();
    let from = parse_bound(
        query.from.as_deref(),
        "from",
        now - Duration::days(DEFAULT_WINDOW_DAYS),
    )?;
    let to = parse_bound(query.to.as_deref(), "to", now)?;
    if from >= to {
        return Err(AppError::BadRequest(
            "'from' must be earlier than 'to'".into(),
        ));
    }
    Ok(MetricsWindow { from, to })
}

async fn call_stats(
    state: &AppState,
    scope: MetricsScope,
    window: MetricsWindow,
) -> AppResult<(CallStats, Vec<DailyCalls>)> {
    let tallies = MetricsRepo::outcome_tallies(&state.pool, scope, window).await?;
    let daily = MetricsRepo::daily_calls(&state.pool, scope, window).await?;
    Ok((CallStats::from_tallies(&tallies), daily))
}

/// GET /campaigns/{id}/metrics?from=&to=
///
/// Outcome statistics for every agent of the campaign plus queue progress.
pub async fn campaign_metrics(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Query(query): Query<MetricsQuery>,
) -> AppResult<impl IntoResponse> {
    let window = window(&query)?;
    find_campaign(&state, campaign_id).await?;

    let scope = MetricsScope {
        campaign_id,
        agent_id: None,
    };
    let (calls, daily) = call_stats(&state, scope, window).await?;
    let counts = MetricsRepo::queue_counts(&state.pool, campaign_id).await?;

    Ok(Json(DataResponse {
        data: CampaignMetrics {
            campaign_id,
            window,
            calls,
            queue: QueueProgress::new(counts.pending, counts.in_progress, counts.completed),
            daily,
        },
    }))
}

/// GET /campaigns/{id}/metrics/agent?from=&to=
///
/// Outcome statistics for the calling agent only.
pub async fn agent_metrics(
    agent: AgentId,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Query(query): Query<MetricsQuery>,
) -> AppResult<impl IntoResponse> {
    let window = window(&query)?;
    find_campaign(&state, campaign_id).await?;

    let scope = MetricsScope {
        campaign_id,
        agent_id: Some(agent.0),
    };
    let (calls, daily) = call_stats(&state, scope, window).await?;

    Ok(Json(DataResponse {
        data: AgentMetrics {
            campaign_id,
            agent_id: agent.0,
            window,
            calls,
            daily,
        },
    }))
}
