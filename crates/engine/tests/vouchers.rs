use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    BetKind, Engine, EngineError, MoneyCents, Rate, SettingsUpdate, SlipError, SlipFault,
    SubmitVoucherCmd, VoucherFilter,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn submit_stores_voucher_and_ordered_wagers() {
    let (engine, _db) = engine_with_db().await;

    let voucher = engine
        .submit_voucher(SubmitVoucherCmd::new("123=100*80\n456r50", now()).notes("table 4"))
        .await
        .unwrap();
    // 100 + 6 × 50: every rolled permutation carries its own stake.
    assert_eq!(voucher.total, MoneyCents::new(400_00));
    assert_eq!(voucher.wager_count, 7);
    assert!(voucher.is_pending());
    assert_eq!(voucher.notes.as_deref(), Some("table 4"));

    let stored = engine.voucher(voucher.id).await.unwrap();
    assert_eq!(stored, voucher);

    let wagers = engine.voucher_wagers(voucher.id).await.unwrap();
    let numbers: Vec<&str> = wagers.iter().map(|w| w.number.as_str()).collect();
    assert_eq!(numbers, ["123", "456", "465", "546", "564", "645", "654"]);
    assert_eq!(wagers[0].kind, BetKind::Direct);
    assert_eq!(wagers[0].potential_payout, MoneyCents::new(8_000_00));
    assert!(wagers[1..].iter().all(|w| w.kind == BetKind::Rolled));
    assert!(wagers.iter().all(|w| w.voucher_id == voucher.id));
}

#[tokio::test]
async fn invalid_slip_is_rejected_without_writes() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .submit_voucher(SubmitVoucherCmd::new("123=1*80\n123=100", now()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Slip(SlipError::Line {
            line: 2,
            fault: SlipFault::InvalidFormat("123=100".to_string()),
        })
    );
    assert!(engine.vouchers(VoucherFilter::All).await.unwrap().is_empty());
    assert_eq!(engine.raw_sales().await.unwrap(), MoneyCents::ZERO);
}

#[tokio::test]
async fn preview_follows_stored_multipliers() {
    let (engine, _db) = engine_with_db().await;

    let ok = engine.preview_slip("123=10*80").await.unwrap();
    assert!(ok.valid);
    assert_eq!(ok.total, MoneyCents::new(10_00));

    engine
        .update_settings(SettingsUpdate::new().direct_multiplier(Rate::whole(90)), now())
        .await
        .unwrap();
    let report = engine.preview_slip("123=10*80").await.unwrap();
    assert!(!report.valid);
    assert_eq!(
        report.error.as_deref(),
        Some("Line 1: direct multiplier must be 90, got 80")
    );
    assert!(engine.vouchers(VoucherFilter::All).await.unwrap().is_empty());
}

#[tokio::test]
async fn multiplier_change_keeps_existing_payouts() {
    let (engine, _db) = engine_with_db().await;

    let voucher = engine
        .submit_voucher(SubmitVoucherCmd::new("777r10", now()))
        .await
        .unwrap();
    engine
        .update_settings(SettingsUpdate::new().rolled_multiplier(Rate::whole(600)), now())
        .await
        .unwrap();

    let wagers = engine.voucher_wagers(voucher.id).await.unwrap();
    assert_eq!(wagers.len(), 1);
    assert_eq!(wagers[0].multiplier, Rate::whole(500));
    assert_eq!(wagers[0].potential_payout, MoneyCents::new(5_000_00));
}

#[tokio::test]
async fn delete_removes_voucher_and_wagers() {
    let (engine, _db) = engine_with_db().await;

    let voucher = engine
        .submit_voucher(SubmitVoucherCmd::new("123r5", now()))
        .await
        .unwrap();
    engine.delete_voucher(voucher.id).await.unwrap();

    assert_eq!(
        engine.voucher(voucher.id).await.unwrap_err(),
        EngineError::KeyNotFound(voucher.id.to_string())
    );
    assert!(matches!(
        engine.voucher_wagers(voucher.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(engine.potential_payout().await.unwrap(), MoneyCents::ZERO);
    assert!(matches!(
        engine.delete_voucher(voucher.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn vouchers_are_listed_newest_first_and_filtered() {
    let (engine, _db) = engine_with_db().await;

    let older = engine
        .submit_voucher(SubmitVoucherCmd::new("111=1*80", now() - Duration::hours(2)))
        .await
        .unwrap();
    let newer = engine
        .submit_voucher(SubmitVoucherCmd::new("222=2*80", now()))
        .await
        .unwrap();
    engine.forward_voucher(older.id, now()).await.unwrap();

    let all: Vec<Uuid> = engine
        .vouchers(VoucherFilter::All)
        .await
        .unwrap()
        .iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(all, [newer.id, older.id]);

    let pending = engine.vouchers(VoucherFilter::Pending).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, newer.id);

    let forwarded = engine.vouchers(VoucherFilter::Forwarded).await.unwrap();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].forwarded_at, Some(now()));

    assert_eq!(engine.pending_total().await.unwrap(), MoneyCents::new(2_00));
}

#[tokio::test]
async fn blank_notes_are_dropped() {
    let (engine, _db) = engine_with_db().await;

    let voucher = engine
        .submit_voucher(SubmitVoucherCmd::new("123=1*80", now()).notes("   "))
        .await
        .unwrap();
    assert_eq!(voucher.notes, None);
}

#[tokio::test]
async fn voucher_total_matches_its_wager_stakes() {
    let (engine, _db) = engine_with_db().await;

    let voucher = engine
        .submit_voucher(SubmitVoucherCmd::new("123r50\n112r10\n777=5*80", now()))
        .await
        .unwrap();
    let staked: MoneyCents = engine
        .voucher_wagers(voucher.id)
        .await
        .unwrap()
        .iter()
        .map(|w| w.stake)
        .sum();
    assert_eq!(staked, MoneyCents::new(335_00));
    assert_eq!(voucher.total, staked);
    assert_eq!(engine.pending_total().await.unwrap(), engine.raw_sales().await.unwrap());

    let entry = engine.forward_voucher(voucher.id, now()).await.unwrap();
    assert_eq!(entry.amount, staked);
}

#[tokio::test]
async fn preview_report_serializes_for_the_cli() {
    let (engine, _db) = engine_with_db().await;

    let report = engine.preview_slip("123r1").await.unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["total"], 1_00);
    assert_eq!(json["wagers"].as_array().unwrap().len(), 6);
    assert_eq!(json["wagers"][0]["kind"], "rolled");
    assert!(json["error"].is_null());

    let bad = serde_json::to_value(engine.preview_slip("oops").await.unwrap()).unwrap();
    assert_eq!(bad["valid"], false);
    assert_eq!(bad["error"], "Line 1: invalid bet format: oops");
}
