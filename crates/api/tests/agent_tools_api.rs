//! Integration tests for the agent's queue pause switch, scheduled
//! follow-ups and campaign/agent metrics.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post, AGENT};
use sqlx::PgPool;

/// Insert a finished call that started `hours_ago` hours before now.
async fn insert_call(
    pool: &PgPool,
    campaign_id: i64,
    agent_id: i64,
    queue_contact_id: i64,
    outcome: &str,
    hours_ago: i32,
    duration_seconds: i64,
) {
    sqlx::query(
        "INSERT INTO calls
            (campaign_id, agent_id, contact_id, lead_id, queue_contact_id, outcome,
             duration_seconds, started_at, ended_at)
         VALUES ($1, $2, $3, $3, $3, $4, $5,
                 NOW() - make_interval(hours => $6),
                 NOW() - make_interval(hours => $6) + make_interval(secs => $5))",
    )
    .bind(campaign_id)
    .bind(agent_id)
    .bind(queue_contact_id)
    .bind(outcome)
    .bind(duration_seconds)
    .bind(hours_ago)
    .execute(pool)
    .await
    .unwrap();
}

/// Mark a queue entry as a follow-up set by `agent_id` for tomorrow.
async fn schedule_follow_up(pool: &PgPool, campaign_id: i64, agent_id: i64, contact_id: i64) {
    sqlx::query(
        "WITH c AS (
             INSERT INTO calls
                 (campaign_id, agent_id, contact_id, lead_id, queue_contact_id, outcome,
                  reschedule_at, duration_seconds, started_at, ended_at)
             VALUES ($1, $2, $3, $3, $3, 'BUZON',
                     date_trunc('second', NOW()) + INTERVAL '1 day', 30,
                     NOW() - INTERVAL '1 minute', NOW())
             RETURNING reschedule_at
         )
         UPDATE campaign_contacts SET scheduled_at = (SELECT reschedule_at FROM c),
                attempts = attempts + 1, last_outcome = 'BUZON'
         WHERE id = $3",
    )
    .bind(campaign_id)
    .bind(agent_id)
    .bind(contact_id)
    .execute(pool)
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Queue pause
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn paused_queue_returns_no_contact_until_resumed(pool: PgPool) {
    let campaign = common::create_campaign(&pool, "Renewals").await;
    let contact = common::create_contact(&pool, campaign, 1, "ALTA").await;
    let base = format!("/api/v1/campaigns/{campaign}/queue");

    let response = post(common::build_test_app(pool.clone()), &format!("{base}/pause")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["paused"], true);
    assert_eq!(json["data"]["agent_id"], AGENT);

    let json = body_json(post(common::build_test_app(pool.clone()), &format!("{base}/next")).await)
        .await;
    assert!(json["data"].is_null());

    let json =
        body_json(post(common::build_test_app(pool.clone()), &format!("{base}/resume")).await)
            .await;
    assert_eq!(json["data"]["paused"], false);

    let json = body_json(post(common::build_test_app(pool), &format!("{base}/next")).await).await;
    assert_eq!(json["data"]["id"], contact);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn pausing_unknown_campaign_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post(app, "/api/v1/campaigns/999999/queue/pause").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Scheduled follow-ups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn scheduled_calls_list_only_the_agents_follow_ups(pool: PgPool) {
    let campaign = common::create_campaign(&pool, "Renewals").await;
    let mine = common::create_contact(&pool, campaign, 1, "ALTA").await;
    let theirs = common::create_contact(&pool, campaign, 2, "ALTA").await;
    common::create_contact(&pool, campaign, 3, "ALTA").await;
    schedule_follow_up(&pool, campaign, AGENT, mine).await;
    schedule_follow_up(&pool, campaign, AGENT + 1, theirs).await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/agents/me/scheduled-calls").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let calls = json["data"].as_array().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["id"], mine);
    assert_eq!(calls[0]["campaign_name"], "Renewals");
    assert_eq!(calls[0]["last_outcome"], "BUZON");
    assert!(calls[0]["scheduled_at"].is_string());
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn campaign_metrics_summarise_recent_calls_and_queue(pool: PgPool) {
    let campaign = common::create_campaign(&pool, "Renewals").await;
    let a = common::create_contact(&pool, campaign, 1, "ALTA").await;
    let b = common::create_contact(&pool, campaign, 2, "ALTA").await;
    common::create_contact(&pool, campaign, 3, "ALTA").await;
    common::create_contact(&pool, campaign, 4, "ALTA").await;
    sqlx::query("UPDATE campaign_contacts SET queue_status = 'COMPLETADO' WHERE id IN ($1, $2)")
        .bind(a)
        .bind(b)
        .execute(&pool)
        .await
        .unwrap();
    insert_call(&pool, campaign, AGENT, a, "CONTACTADO", 2, 120).await;
    insert_call(&pool, campaign, AGENT + 1, b, "NO_CONTESTA", 1, 30).await;
    // Outside the default window.
    insert_call(&pool, campaign, AGENT, b, "VENTA", 24 * 40, 300).await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/campaigns/{campaign}/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["campaign_id"], campaign);
    assert_eq!(data["calls"]["total_calls"], 2);
    assert_eq!(data["calls"]["effective_calls"], 1);
    assert_eq!(data["calls"]["contact_rate"], 50.0);
    assert_eq!(data["calls"]["average_duration_seconds"], 75);
    assert_eq!(data["calls"]["outcomes"].as_array().unwrap().len(), 6);
    assert_eq!(data["queue"]["total"], 4);
    assert_eq!(data["queue"]["completed"], 2);
    assert_eq!(data["queue"]["progress_percent"], 50.0);
    assert!(data["window"]["from"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn agent_metrics_cover_only_the_calling_agent(pool: PgPool) {
    let campaign = common::create_campaign(&pool, "Renewals").await;
    let a = common::create_contact(&pool, campaign, 1, "ALTA").await;
    insert_call(&pool, campaign, AGENT, a, "INTERESADO", 3, 90).await;
    insert_call(&pool, campaign, AGENT, a, "BUZON", 2, 10).await;
    insert_call(&pool, campaign, AGENT + 1, a, "CONTACTADO", 1, 60).await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/campaigns/{campaign}/metrics/agent")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["agent_id"], AGENT);
    assert_eq!(data["calls"]["total_calls"], 2);
    assert_eq!(data["calls"]["effective_calls"], 1);
    assert_eq!(data["calls"]["average_duration_seconds"], 50);
    assert!(data.get("queue").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn metrics_reject_inverted_window(pool: PgPool) {
    let campaign = common::create_campaign(&pool, "Renewals").await;
    let app = common::build_test_app(pool);
    let uri = format!(
        "/api/v1/campaigns/{campaign}/metrics?from=2026-03-08T00:00:00Z&to=2026-03-01T00:00:00Z"
    );
    let response = get(app, &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn metrics_of_unknown_campaign_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/campaigns/999999/metrics").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
