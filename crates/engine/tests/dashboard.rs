use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    BetKind, DashboardFigures, Engine, EngineError, ExposureFilter, MoneyCents, PeriodKind, Rate,
    Settings, SettingsUpdate, SubmitVoucherCmd,
};
use migration::MigratorTrait;

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

fn units(value: i64) -> MoneyCents {
    MoneyCents::new(value * 100)
}

async fn submit(engine: &Engine, text: &str) -> uuid::Uuid {
    engine
        .submit_voucher(SubmitVoucherCmd::new(text, now()))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn empty_book_reads_defaults_and_zero() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(engine.settings().await.unwrap(), Settings::default());
    assert_eq!(
        engine.dashboard(now()).await.unwrap(),
        DashboardFigures::default()
    );
}

#[tokio::test]
async fn figures_follow_pending_wagers() {
    let (engine, _db) = engine_with_db().await;
    submit(&engine, "123=100*80\n456r50").await;

    let figures = engine.dashboard(now()).await.unwrap();
    // Live sales count every stored wager: 100 + 6 × 50.
    assert_eq!(figures.raw_sales, units(400));
    assert_eq!(figures.total_sales, units(400));
    assert_eq!(figures.self_report, units(400));
    assert_eq!(figures.commission, units(20));
    assert_eq!(figures.potential_payout, units(158_000));
    // 400 - 20 - 1 580
    assert_eq!(figures.net_profit, units(-1_200));

    assert_eq!(engine.total_sales(now()).await.unwrap(), figures.total_sales);
    assert_eq!(engine.self_report(now()).await.unwrap(), figures.self_report);
    assert_eq!(engine.commission(now()).await.unwrap(), figures.commission);
    assert_eq!(engine.potential_payout().await.unwrap(), figures.potential_payout);
    assert_eq!(engine.net_profit(now()).await.unwrap(), figures.net_profit);
    assert_eq!(engine.dashboard(now()).await.unwrap(), figures);
}

#[tokio::test]
async fn forwarded_vouchers_leave_the_dashboard() {
    let (engine, _db) = engine_with_db().await;
    let forwarded = submit(&engine, "123=100*80").await;
    submit(&engine, "456=30*80").await;

    engine.forward_voucher(forwarded, now()).await.unwrap();
    let figures = engine.dashboard(now()).await.unwrap();
    assert_eq!(figures.raw_sales, units(30));
    assert_eq!(figures.potential_payout, units(2_400));
}

#[tokio::test]
async fn total_sales_is_capped_and_self_report_matches() {
    let (engine, _db) = engine_with_db().await;
    engine
        .update_settings(SettingsUpdate::new().daily_limit(units(300)), now())
        .await
        .unwrap();
    submit(&engine, "123=500*80").await;

    let figures = engine.dashboard(now()).await.unwrap();
    assert_eq!(figures.raw_sales, units(500));
    assert_eq!(figures.total_sales, units(300));
    assert_eq!(figures.self_report, figures.total_sales);
    assert_eq!(figures.commission, units(15));
}

#[tokio::test]
async fn clearing_offsets_today_and_replaces_previous_record() {
    let (engine, _db) = engine_with_db().await;
    submit(&engine, "123=400*80").await;

    let first = engine
        .clear_limit(PeriodKind::Daily, units(150), now())
        .await
        .unwrap();
    assert!(first.period.contains(now()));
    assert_eq!(engine.total_sales(now()).await.unwrap(), units(250));

    engine
        .clear_limit(PeriodKind::Daily, units(100), now() + Duration::hours(1))
        .await
        .unwrap();
    let records = engine.cleared_limits(PeriodKind::Daily).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].amount, units(100));
    assert_eq!(
        engine
            .cleared_in_period(PeriodKind::Daily, now())
            .await
            .unwrap(),
        units(100)
    );
    assert_eq!(engine.total_sales(now()).await.unwrap(), units(300));
}

#[tokio::test]
async fn clearing_never_drives_sales_negative() {
    let (engine, _db) = engine_with_db().await;
    submit(&engine, "123=50*80").await;
    engine
        .clear_limit(PeriodKind::Daily, units(80), now())
        .await
        .unwrap();

    let figures = engine.dashboard(now()).await.unwrap();
    assert_eq!(figures.daily_cleared, units(80));
    assert_eq!(figures.total_sales, MoneyCents::ZERO);
    assert_eq!(figures.commission, MoneyCents::ZERO);
}

#[tokio::test]
async fn other_days_and_kinds_do_not_offset_today() {
    let (engine, _db) = engine_with_db().await;
    submit(&engine, "123=400*80").await;

    engine
        .clear_limit(PeriodKind::Daily, units(100), now() - Duration::days(1))
        .await
        .unwrap();
    engine
        .clear_limit(PeriodKind::Weekly, units(100), now())
        .await
        .unwrap();

    assert_eq!(engine.total_sales(now()).await.unwrap(), units(400));
    assert_eq!(
        engine
            .cleared_in_period(PeriodKind::Weekly, now())
            .await
            .unwrap(),
        units(100)
    );
}

#[tokio::test]
async fn negative_clear_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine
            .clear_limit(PeriodKind::Monthly, MoneyCents::new(-1), now())
            .await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(
        engine
            .cleared_limits(PeriodKind::Monthly)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn invalid_settings_are_not_stored() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .update_settings(
            SettingsUpdate::new()
                .daily_limit(units(1))
                .commission_percent(Rate::whole(150)),
            now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidSettings(_)));
    assert_eq!(engine.settings().await.unwrap(), Settings::default());

    let saved = engine
        .update_settings(SettingsUpdate::new().commission_percent(Rate::whole(10)), now())
        .await
        .unwrap();
    assert_eq!(saved.updated_at, Some(now()));
    let again = engine
        .update_settings(SettingsUpdate::new().weekly_limit(units(1)), now())
        .await
        .unwrap();
    assert_eq!(again.commission_percent, Rate::whole(10));
    assert_eq!(engine.settings().await.unwrap(), again);
}

#[tokio::test]
async fn exposure_groups_pending_stake_by_number() {
    let (engine, _db) = engine_with_db().await;
    submit(&engine, "123=1500*80\n112r200").await;
    submit(&engine, "121=50*80").await;

    let all = engine.number_exposure(ExposureFilter::All).await.unwrap();
    let summary: Vec<(&str, MoneyCents)> =
        all.iter().map(|row| (row.number.as_str(), row.stake)).collect();
    assert_eq!(
        summary,
        [
            ("123", units(1_500)),
            ("121", units(250)),
            ("112", units(200)),
            ("211", units(200)),
        ]
    );
    assert_eq!(all[1].wager_count, 2);

    let top = engine.number_exposure(ExposureFilter::Top(2)).await.unwrap();
    assert_eq!(top.len(), 2);

    let risky = engine
        .number_exposure(ExposureFilter::high_risk())
        .await
        .unwrap();
    assert_eq!(risky.len(), 1);
    assert_eq!(risky[0].number, "123");

    let by_kind = engine.number_exposure_by_kind().await.unwrap();
    let on_121: Vec<BetKind> = by_kind
        .iter()
        .filter(|row| row.number == "121")
        .map(|row| row.kind)
        .collect();
    assert_eq!(on_121, [BetKind::Rolled, BetKind::Direct]);
}

#[tokio::test]
async fn slip_with_overflowing_payouts_is_refused() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .submit_voucher(SubmitVoucherCmd::new("123r150000000000000", now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Slip(_)));
    assert!(engine.vouchers(engine::VoucherFilter::All).await.unwrap().is_empty());
    assert_eq!(
        engine.dashboard(now()).await.unwrap(),
        DashboardFigures::default()
    );
}

#[tokio::test]
async fn dashboard_saturates_across_huge_vouchers() {
    let (engine, _db) = engine_with_db().await;
    // Each voucher fits on its own; together their payouts exceed i64 cents.
    for _ in 0..12 {
        submit(&engine, "123=100000000000000*80").await;
    }

    let figures = engine.dashboard(now()).await.unwrap();
    assert_eq!(figures.raw_sales, units(1_200_000_000_000_000));
    assert_eq!(figures.potential_payout, MoneyCents::new(i64::MAX));
    assert_eq!(figures.total_sales, Settings::default().daily_limit);

    let json = serde_json::to_value(figures).unwrap();
    assert_eq!(json["potential_payout"], i64::MAX);
    assert_eq!(json["total_sales"], figures.total_sales.cents());
}
