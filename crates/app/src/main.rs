use std::{error::Error, path::PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{
    Engine, EngineError, ExposureFilter, LedgerFilter, MoneyCents, PeriodKind, Rate,
    SettingsUpdate, SubmitVoucherCmd, VoucherFilter,
};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;
use uuid::Uuid;

mod settings;

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "tallybook")]
#[command(about = "Bet-slip ledger: vouchers, limits and forwarding")]
struct Cli {
    /// Settings file, without extension.
    #[arg(long, default_value = "settings")]
    config: String,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a slip without saving it.
    Parse(SlipArgs),
    /// Save a slip as a new voucher.
    Submit(SubmitArgs),
    Vouchers {
        #[arg(long, value_enum, default_value_t = VoucherView::All)]
        filter: VoucherView,
    },
    /// Show one voucher with its wagers.
    Voucher { id: Uuid },
    Delete { id: Uuid },
    /// Forward a voucher to the master book.
    Forward { id: Uuid },
    /// Reverse a ledger entry.
    Reverse {
        entry_id: Uuid,
        #[arg(long)]
        reason: Option<String>,
    },
    Ledger {
        #[arg(long, value_enum, default_value_t = LedgerView::All)]
        filter: LedgerView,
    },
    /// Record a cleared amount for the current period.
    ClearLimit {
        #[arg(value_enum)]
        kind: PeriodArg,
        #[arg(value_parser = parse_money)]
        amount: MoneyCents,
    },
    Cleared {
        #[arg(value_enum)]
        kind: PeriodArg,
    },
    Dashboard,
    /// Pending stake per number.
    Exposure(ExposureArgs),
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Args, Debug)]
struct SlipArgs {
    /// Slip file; reads stdin when omitted.
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    #[command(flatten)]
    slip: SlipArgs,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct ExposureArgs {
    /// Only the N heaviest numbers.
    #[arg(long, conflicts_with_all = ["above", "high_risk"])]
    top: Option<usize>,
    /// Only numbers with at least this much stake.
    #[arg(long, value_parser = parse_money, conflicts_with = "high_risk")]
    above: Option<MoneyCents>,
    /// Same as `--above 1000`.
    #[arg(long)]
    high_risk: bool,
    /// Split each number by bet kind.
    #[arg(long, conflicts_with_all = ["top", "above", "high_risk"])]
    by_kind: bool,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    Set(SettingsSetArgs),
}

#[derive(Args, Debug)]
struct SettingsSetArgs {
    #[arg(long, value_parser = parse_rate)]
    commission: Option<Rate>,
    #[arg(long, value_parser = parse_money)]
    daily_limit: Option<MoneyCents>,
    #[arg(long, value_parser = parse_money)]
    weekly_limit: Option<MoneyCents>,
    #[arg(long, value_parser = parse_money)]
    monthly_limit: Option<MoneyCents>,
    #[arg(long, value_parser = parse_rate)]
    direct: Option<Rate>,
    #[arg(long, value_parser = parse_rate)]
    rolled: Option<Rate>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VoucherView {
    All,
    Pending,
    Forwarded,
}

impl From<VoucherView> for VoucherFilter {
    fn from(view: VoucherView) -> Self {
        match view {
            VoucherView::All => Self::All,
            VoucherView::Pending => Self::Pending,
            VoucherView::Forwarded => Self::Forwarded,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LedgerView {
    All,
    Active,
    Reversed,
}

impl From<LedgerView> for LedgerFilter {
    fn from(view: LedgerView) -> Self {
        match view {
            LedgerView::All => Self::All,
            LedgerView::Active => Self::Active,
            LedgerView::Reversed => Self::Reversed,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PeriodArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<PeriodArg> for PeriodKind {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Daily => Self::Daily,
            PeriodArg::Weekly => Self::Weekly,
            PeriodArg::Monthly => Self::Monthly,
        }
    }
}

fn parse_money(raw: &str) -> Result<MoneyCents, String> {
    raw.parse().map_err(|err: EngineError| err.to_string())
}

fn parse_rate(raw: &str) -> Result<Rate, String> {
    raw.parse().map_err(|err: EngineError| err.to_string())
}

fn read_slip(args: &SlipArgs) -> AppResult<String> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    Ok(text)
}

/// Prints `value` as JSON, or as the given text when `--json` is off.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

async fn connect_db(url: &str) -> AppResult<sea_orm::DatabaseConnection> {
    let db = sea_orm::Database::connect(url).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tallybook={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let db = connect_db(&settings.database.url()).await?;
    let engine = Engine::builder()
        .database(db)
        .timezone(settings.clock.timezone)
        .week_start(settings.clock.week_start)
        .build()
        .await?;
    let calendar = engine.calendar();
    tracing::debug!(
        timezone = %calendar.timezone,
        week_start = %calendar.week_start,
        "engine ready"
    );

    match run(&engine, cli.command, cli.json).await {
        Err(err) if is_user_error(err.as_ref()) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
        other => other,
    }
}

fn is_user_error(err: &(dyn Error + Send + Sync + 'static)) -> bool {
    matches!(
        err.downcast_ref::<EngineError>(),
        Some(
            EngineError::Slip(_)
                | EngineError::KeyNotFound(_)
                | EngineError::AlreadyReversed(_)
                | EngineError::InvalidAmount(_)
                | EngineError::InvalidSettings(_)
        )
    )
}

async fn run(engine: &Engine, command: Command, json: bool) -> AppResult<()> {
    let now = Utc::now();
    match command {
        Command::Parse(args) => {
            let report = engine.preview_slip(&read_slip(&args)?).await?;
            emit(json, &report, || match &report.error {
                Some(error) => error.clone(),
                None => format!("{} wagers, total {}", report.wagers.len(), report.total),
            })?;
            if !report.valid {
                std::process::exit(1);
            }
        }
        Command::Submit(args) => {
            let mut cmd = SubmitVoucherCmd::new(read_slip(&args.slip)?, now);
            if let Some(notes) = args.notes {
                cmd = cmd.notes(notes);
            }
            let voucher = engine.submit_voucher(cmd).await?;
            emit(json, &voucher, || {
                format!(
                    "voucher {} saved: {} wagers, total {}",
                    voucher.id, voucher.wager_count, voucher.total
                )
            })?;
        }
        Command::Vouchers { filter } => {
            let vouchers = engine.vouchers(filter.into()).await?;
            emit(json, &vouchers, || {
                vouchers
                    .iter()
                    .map(|v| {
                        let state = if v.forwarded { "forwarded" } else { "pending" };
                        format!(
                            "{}  {}  {:>12}  {:>3} wagers  {state}",
                            v.id,
                            v.created_at.format("%Y-%m-%d %H:%M"),
                            v.total,
                            v.wager_count
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Voucher { id } => {
            let voucher = engine.voucher(id).await?;
            let wagers = engine.voucher_wagers(id).await?;
            let body = serde_json::json!({ "voucher": voucher, "wagers": wagers });
            emit(json, &body, || {
                let mut lines = vec![format!(
                    "voucher {} total {} ({} wagers)",
                    voucher.id, voucher.total, voucher.wager_count
                )];
                lines.extend(wagers.iter().map(|w| {
                    format!(
                        "  {} {:<6} stake {:>10} x{:<5} payout {:>12}",
                        w.number,
                        w.kind.as_str(),
                        w.stake,
                        w.multiplier,
                        w.potential_payout
                    )
                }));
                lines.join("\n")
            })?;
        }
        Command::Delete { id } => {
            engine.delete_voucher(id).await?;
            emit(json, &serde_json::json!({ "deleted": id }), || {
                format!("deleted voucher {id}")
            })?;
        }
        Command::Forward { id } => {
            let entry = engine.forward_voucher(id, now).await?;
            emit(json, &entry, || {
                format!("forwarded {} as ledger entry {}", entry.amount, entry.id)
            })?;
        }
        Command::Reverse { entry_id, reason } => {
            let entry = engine
                .reverse_forwarding(entry_id, reason.as_deref(), now)
                .await?;
            emit(json, &entry, || format!("reversed ledger entry {}", entry.id))?;
        }
        Command::Ledger { filter } => {
            let entries = engine.ledger(filter.into()).await?;
            emit(json, &entries, || {
                entries
                    .iter()
                    .map(|e| {
                        let state = if e.reversed { "reversed" } else { "active" };
                        format!(
                            "{}  voucher {}  {:>12}  {}  {state}",
                            e.id,
                            e.voucher_id,
                            e.amount,
                            e.forwarded_at.format("%Y-%m-%d %H:%M")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::ClearLimit { kind, amount } => {
            let record = engine.clear_limit(kind.into(), amount, now).await?;
            emit(json, &record, || {
                format!(
                    "cleared {} for {} {} .. {}",
                    record.amount,
                    record.period.kind.as_str(),
                    record.period.start,
                    record.period.end
                )
            })?;
        }
        Command::Cleared { kind } => {
            let records = engine.cleared_limits(kind.into()).await?;
            emit(json, &records, || {
                records
                    .iter()
                    .map(|r| format!("{} .. {}  {:>12}", r.period.start, r.period.end, r.amount))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Dashboard => {
            let figures = engine.dashboard(now).await?;
            emit(json, &figures, || {
                [
                    ("Raw sales", figures.raw_sales),
                    ("Cleared today", figures.daily_cleared),
                    ("Total sales", figures.total_sales),
                    ("Self report", figures.self_report),
                    ("Commission", figures.commission),
                    ("Potential payout", figures.potential_payout),
                    ("Net profit", figures.net_profit),
                ]
                .iter()
                .map(|(label, value)| format!("{label:<18}{value:>14}"))
                .collect::<Vec<_>>()
                .join("\n")
            })?;
        }
        Command::Exposure(args) if args.by_kind => {
            let rows = engine.number_exposure_by_kind().await?;
            emit(json, &rows, || {
                rows.iter()
                    .map(|r| {
                        format!(
                            "{} {:<6} {:>12}  payout {:>14}",
                            r.number,
                            r.kind.as_str(),
                            r.stake,
                            r.potential_payout
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Exposure(args) => {
            let filter = match (args.top, args.above, args.high_risk) {
                (Some(n), _, _) => ExposureFilter::Top(n),
                (None, Some(threshold), _) => ExposureFilter::AboveStake(threshold),
                (None, None, true) => ExposureFilter::high_risk(),
                (None, None, false) => ExposureFilter::All,
            };
            let rows = engine.number_exposure(filter).await?;
            emit(json, &rows, || {
                rows.iter()
                    .map(|r| {
                        format!(
                            "{} {:>12}  payout {:>14}  ({} wagers)",
                            r.number, r.stake, r.potential_payout, r.wager_count
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Settings {
            command: SettingsCommand::Show,
        } => {
            let current = engine.settings().await?;
            emit(json, &current, || settings_text(&current))?;
        }
        Command::Settings {
            command: SettingsCommand::Set(args),
        } => {
            let update = SettingsUpdate {
                commission_percent: args.commission,
                daily_limit: args.daily_limit,
                weekly_limit: args.weekly_limit,
                monthly_limit: args.monthly_limit,
                direct_multiplier: args.direct,
                rolled_multiplier: args.rolled,
            };
            if update.is_empty() {
                eprintln!("nothing to update");
                std::process::exit(2);
            }
            let saved = engine.update_settings(update, now).await?;
            emit(json, &saved, || settings_text(&saved))?;
        }
    }
    Ok(())
}

fn settings_text(settings: &engine::Settings) -> String {
    format!(
        "commission        {}%\n\
         daily limit       {}\n\
         weekly limit      {}\n\
         monthly limit     {}\n\
         direct multiplier x{}\n\
         rolled multiplier x{}",
        settings.commission_percent,
        settings.daily_limit,
        settings.weekly_limit,
        settings.monthly_limit,
        settings.direct_multiplier,
        settings.rolled_multiplier
    )
}
