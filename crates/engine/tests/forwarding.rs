use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, EngineError, LedgerFilter, MoneyCents, PeriodKind, SubmitVoucherCmd};
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

async fn submit(engine: &Engine, text: &str) -> Uuid {
    engine
        .submit_voucher(SubmitVoucherCmd::new(text, now()))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn forwarding_appends_one_entry_with_voucher_total() {
    let (engine, _db) = engine_with_db().await;
    let voucher_id = submit(&engine, "123=100*80\n456r50").await;

    let entry = engine.forward_voucher(voucher_id, now()).await.unwrap();
    assert_eq!(entry.voucher_id, voucher_id);
    assert_eq!(entry.amount, MoneyCents::new(400_00));
    assert_eq!(entry.forwarded_at, now());
    assert!(entry.is_active());

    let voucher = engine.voucher(voucher_id).await.unwrap();
    assert!(voucher.forwarded);
    assert_eq!(voucher.forwarded_at, Some(now()));
    assert_eq!(
        engine.ledger_entry_for_voucher(voucher_id).await.unwrap(),
        Some(entry)
    );
}

#[tokio::test]
async fn forwarding_twice_is_a_no_op() {
    let (engine, _db) = engine_with_db().await;
    let voucher_id = submit(&engine, "123=10*80").await;

    let first = engine.forward_voucher(voucher_id, now()).await.unwrap();
    let second = engine
        .forward_voucher(voucher_id, now() + Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.ledger(LedgerFilter::All).await.unwrap().len(), 1);
    assert_eq!(
        engine.voucher(voucher_id).await.unwrap().forwarded_at,
        Some(now())
    );
}

#[tokio::test]
async fn forwarding_unknown_voucher_fails() {
    let (engine, _db) = engine_with_db().await;
    let missing = Uuid::new_v4();
    assert_eq!(
        engine.forward_voucher(missing, now()).await.unwrap_err(),
        EngineError::KeyNotFound(missing.to_string())
    );
    assert!(engine.ledger(LedgerFilter::All).await.unwrap().is_empty());
}

#[tokio::test]
async fn reversal_happens_once() {
    let (engine, _db) = engine_with_db().await;
    let voucher_id = submit(&engine, "123=10*80").await;
    let entry = engine.forward_voucher(voucher_id, now()).await.unwrap();

    let reversed_at = now() + Duration::hours(1);
    let reversed = engine
        .reverse_forwarding(entry.id, Some("  sent by mistake "), reversed_at)
        .await
        .unwrap();
    assert!(reversed.reversed);
    assert_eq!(reversed.reversed_at, Some(reversed_at));
    assert_eq!(reversed.reversal_reason.as_deref(), Some("sent by mistake"));

    let err = engine
        .reverse_forwarding(entry.id, Some("again"), reversed_at + Duration::hours(1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyReversed(entry.id.to_string()));

    let stored = engine.ledger(LedgerFilter::Reversed).await.unwrap();
    assert_eq!(stored, vec![reversed]);
}

#[tokio::test]
async fn reversal_keeps_voucher_forwarded_and_leaves_totals() {
    let (engine, _db) = engine_with_db().await;
    let first = submit(&engine, "123=10*80").await;
    let second = submit(&engine, "456=25*80").await;

    let entry = engine.forward_voucher(first, now()).await.unwrap();
    engine.forward_voucher(second, now()).await.unwrap();
    assert_eq!(engine.total_forwarded().await.unwrap(), MoneyCents::new(35_00));

    engine.reverse_forwarding(entry.id, None, now()).await.unwrap();
    assert_eq!(engine.total_forwarded().await.unwrap(), MoneyCents::new(25_00));
    assert!(engine.voucher(first).await.unwrap().forwarded);
    assert_eq!(engine.ledger(LedgerFilter::Active).await.unwrap().len(), 1);
    assert_eq!(engine.ledger(LedgerFilter::All).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reversing_unknown_entry_fails() {
    let (engine, _db) = engine_with_db().await;
    let missing = Uuid::new_v4();
    assert_eq!(
        engine
            .reverse_forwarding(missing, None, now())
            .await
            .unwrap_err(),
        EngineError::KeyNotFound(missing.to_string())
    );
}

#[tokio::test]
async fn ledger_survives_voucher_deletion() {
    let (engine, _db) = engine_with_db().await;
    let voucher_id = submit(&engine, "123=10*80").await;
    let entry = engine.forward_voucher(voucher_id, now()).await.unwrap();

    engine.delete_voucher(voucher_id).await.unwrap();
    assert_eq!(engine.ledger(LedgerFilter::All).await.unwrap(), vec![entry]);
}

#[tokio::test]
async fn forwarded_in_period_counts_only_that_period() {
    let (engine, _db) = engine_with_db().await;
    let yesterday = submit(&engine, "123=10*80").await;
    let today = submit(&engine, "456=20*80").await;

    engine
        .forward_voucher(yesterday, now() - Duration::days(1))
        .await
        .unwrap();
    engine.forward_voucher(today, now()).await.unwrap();

    assert_eq!(
        engine
            .forwarded_in_period(PeriodKind::Daily, now())
            .await
            .unwrap(),
        MoneyCents::new(20_00)
    );
    // 2026-10-18 is a Sunday, so both fall in the same month but different weeks.
    assert_eq!(
        engine
            .forwarded_in_period(PeriodKind::Weekly, now())
            .await
            .unwrap(),
        MoneyCents::new(20_00)
    );
    assert_eq!(
        engine
            .forwarded_in_period(PeriodKind::Monthly, now())
            .await
            .unwrap(),
        MoneyCents::new(30_00)
    );
}
