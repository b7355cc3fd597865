//! Integration tests for campaign script documents.

use sqlx::PgPool;
use telesales_core::script::{self, CallType, Script, SectionKind};
use telesales_db::models::campaign::{Campaign, CreateCampaign};
use telesales_db::models::script_file::CreateCampaignScriptFile;
use telesales_db::repositories::{CampaignRepo, ScriptFileRepo, ScriptRepo};

fn upload(campaign_id: i64, name: &str, content: &[u8]) -> CreateCampaignScriptFile {
    CreateCampaignScriptFile {
        campaign_id,
        script_id: None,
        file_name: name.to_string(),
        content_type: "text/plain".to_string(),
        description: None,
        content: content.to_vec(),
    }
}

async fn spring_campaign(pool: &PgPool) -> Campaign {
    CampaignRepo::create(
        pool,
        &CreateCampaign {
            name: "Spring".to_string(),
            status: None,
        },
    )
    .await
    .unwrap()
}

async fn stored_script(pool: &PgPool) -> i64 {
    let mut s = Script::blank();
    s.name = "Winback".to_string();
    s.objective = "Bring customers back".to_string();
    s.call_type = Some(CallType::Retention);
    s.set_section(SectionKind::Intro, "Hello");
    let valid = script::validate(s).unwrap();
    ScriptRepo::create(pool, &valid).await.unwrap().script.id.unwrap()
}

fn compiled(campaign_id: i64, script_id: i64) -> CreateCampaignScriptFile {
    CreateCampaignScriptFile {
        script_id: Some(script_id),
        ..upload(campaign_id, "Winback.md", b"# Winback")
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn latest_returns_newest_document(pool: PgPool) {
    let campaign = spring_campaign(&pool).await;

    assert!(ScriptFileRepo::latest_for_campaign(&pool, campaign.id)
        .await
        .unwrap()
        .is_none());

    let first = ScriptFileRepo::create(&pool, &upload(campaign.id, "v1.txt", b"one"))
        .await
        .unwrap();
    assert_eq!(first.size_bytes, 3);
    let second = ScriptFileRepo::create(&pool, &upload(campaign.id, "v2.txt", b"second"))
        .await
        .unwrap();

    let latest = ScriptFileRepo::latest_for_campaign(&pool, campaign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, second.id);

    let content = ScriptFileRepo::latest_content(&pool, campaign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(content.file_name, "v2.txt");
    assert_eq!(content.content, b"second");
}

#[sqlx::test(migrations = "./migrations")]
async fn link_and_store_sets_link_and_file_together(pool: PgPool) {
    let campaign = spring_campaign(&pool).await;
    let script_id = stored_script(&pool).await;

    let file = ScriptFileRepo::link_and_store(&pool, &compiled(campaign.id, script_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(file.script_id, Some(script_id));
    assert_eq!(file.size_bytes, 9);

    let campaign = CampaignRepo::find_by_id(&pool, campaign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(campaign.script_id, Some(script_id));
}

#[sqlx::test(migrations = "./migrations")]
async fn link_and_store_unknown_campaign_is_none(pool: PgPool) {
    let script_id = stored_script(&pool).await;
    let stored = ScriptFileRepo::link_and_store(&pool, &compiled(9999, script_id))
        .await
        .unwrap();
    assert!(stored.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_file_insert_keeps_campaign_unlinked(pool: PgPool) {
    let campaign = spring_campaign(&pool).await;
    let script_id = stored_script(&pool).await;
    sqlx::query(
        "ALTER TABLE campaign_script_files
         ADD CONSTRAINT ck_reject_every_file CHECK (false) NOT VALID",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = ScriptFileRepo::link_and_store(&pool, &compiled(campaign.id, script_id)).await;
    assert!(result.is_err());

    let campaign = CampaignRepo::find_by_id(&pool, campaign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(campaign.script_id, None);
    assert!(ScriptFileRepo::latest_for_campaign(&pool, campaign.id)
        .await
        .unwrap()
        .is_none());
}
