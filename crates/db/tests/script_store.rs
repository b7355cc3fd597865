//! Integration tests for script persistence.
//!
//! - Create stores only non-empty sections, in rank order
//! - Update replaces the section set
//! - List and delete
//! - Campaign lookup through the linked script

use sqlx::PgPool;
use telesales_core::script::{self, CallType, Script, ScriptStatus, SectionKind};
use telesales_db::models::campaign::CreateCampaign;
use telesales_db::models::script_file::CreateCampaignScriptFile;
use telesales_db::repositories::{CampaignRepo, ScriptFileRepo, ScriptRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn renewal_script() -> Script {
    let mut s = Script::blank();
    s.name = "Renewal Q3".to_string();
    s.objective = "Retain customers".to_string();
    s.call_type = Some(CallType::Renewal);
    s.set_section(SectionKind::Close, "<p>Offer 10% off</p>");
    s.set_section(SectionKind::Intro, "<p>Hi, this is Ana</p>");
    s
}

fn new_campaign(name: &str) -> CreateCampaign {
    CreateCampaign {
        name: name.to_string(),
        status: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_keeps_only_sections_with_content(pool: PgPool) {
    let valid = script::validate(renewal_script()).unwrap();
    let record = ScriptRepo::create(&pool, &valid).await.unwrap();

    assert!(record.script.id.is_some());
    assert_eq!(record.script.name, "Renewal Q3");
    assert_eq!(record.script.status, ScriptStatus::Draft);

    let kinds: Vec<SectionKind> = record.script.sections().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec![SectionKind::Intro, SectionKind::Close]);

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM script_sections WHERE script_id = $1")
            .bind(record.script.id.unwrap())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn find_by_id_round_trips_content_verbatim(pool: PgPool) {
    let mut script = renewal_script();
    script.set_section(SectionKind::Objections, "  <ul><li>Too expensive</li></ul>\n");
    let valid = script::validate(script).unwrap();
    let id = ScriptRepo::create(&pool, &valid).await.unwrap().script.id.unwrap();

    let found = ScriptRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(
        found.script.section(SectionKind::Objections),
        Some("  <ul><li>Too expensive</li></ul>\n")
    );
    assert_eq!(found.script.call_type, Some(CallType::Renewal));
}

#[sqlx::test(migrations = "./migrations")]
async fn find_missing_script_is_none(pool: PgPool) {
    assert!(ScriptRepo::find_by_id(&pool, 999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn update_replaces_sections(pool: PgPool) {
    let valid = script::validate(renewal_script()).unwrap();
    let id = ScriptRepo::create(&pool, &valid).await.unwrap().script.id.unwrap();

    let mut edited = Script::blank();
    edited.name = "Renewal Q4".to_string();
    edited.objective = "Retain customers".to_string();
    edited.call_type = Some(CallType::Retention);
    edited.status = ScriptStatus::Active;
    edited.set_section(SectionKind::PostCall, "Log the callback");
    let valid = script::validate(edited).unwrap();

    let updated = ScriptRepo::update(&pool, id, &valid).await.unwrap().unwrap();
    assert_eq!(updated.script.name, "Renewal Q4");
    assert_eq!(updated.script.status, ScriptStatus::Active);
    let kinds: Vec<SectionKind> = updated.script.sections().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec![SectionKind::PostCall]);
    assert!(updated.updated_at >= updated.created_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_missing_script_is_none(pool: PgPool) {
    let valid = script::validate(renewal_script()).unwrap();
    assert!(ScriptRepo::update(&pool, 424_242, &valid).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn list_returns_scripts_with_sections(pool: PgPool) {
    let first = script::validate(renewal_script()).unwrap();
    ScriptRepo::create(&pool, &first).await.unwrap();

    let mut other = renewal_script();
    other.name = "Survey".to_string();
    other.call_type = Some(CallType::Survey);
    let other = script::validate(other).unwrap();
    ScriptRepo::create(&pool, &other).await.unwrap();

    let all = ScriptRepo::list(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|r| r.script.sections().count() == 2));
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_removes_script_and_sections(pool: PgPool) {
    let valid = script::validate(renewal_script()).unwrap();
    let id = ScriptRepo::create(&pool, &valid).await.unwrap().script.id.unwrap();

    assert!(ScriptRepo::delete(&pool, id).await.unwrap());
    assert!(!ScriptRepo::delete(&pool, id).await.unwrap());

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM script_sections WHERE script_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn campaign_script_follows_link(pool: PgPool) {
    let campaign = CampaignRepo::create(&pool, &new_campaign("Spring"))
        .await
        .unwrap();
    assert!(ScriptRepo::find_for_campaign(&pool, campaign.id)
        .await
        .unwrap()
        .is_none());

    let valid = script::validate(renewal_script()).unwrap();
    let id = ScriptRepo::create(&pool, &valid).await.unwrap().script.id.unwrap();
    let stored = ScriptFileRepo::link_and_store(
        &pool,
        &CreateCampaignScriptFile {
            campaign_id: campaign.id,
            script_id: Some(id),
            file_name: "Renewal_Q3.md".to_string(),
            content_type: "text/markdown; charset=utf-8".to_string(),
            description: None,
            content: b"# Renewal Q3".to_vec(),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(stored.script_id, Some(id));

    let linked = CampaignRepo::find_by_id(&pool, campaign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(linked.script_id, Some(id));

    let found = ScriptRepo::find_for_campaign(&pool, campaign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.script.id, Some(id));
}
