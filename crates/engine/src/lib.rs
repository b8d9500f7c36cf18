//! Storage and arithmetic for a small bookmaking ledger.
//!
//! Bet slips are parsed by [`BetParser`] into [`Wager`]s and stored as
//! [`Voucher`]s through an [`Engine`]. The engine derives the dashboard
//! figures from pending vouchers and keeps the forwarding ledger.

pub use cleared_limits::ClearedLimit;
pub use commands::{SettingsUpdate, SubmitVoucherCmd};
pub use error::EngineError;
pub use figures::{DashboardFigures, PAYOUT_RISK_DISCOUNT};
pub use ledger::LedgerEntry;
pub use money::{MoneyCents, Rate};
pub use ops::{
    DEFAULT_HIGH_RISK_STAKE, Engine, EngineBuilder, ExposureFilter, KindExposure, LedgerFilter,
    NumberExposure, VoucherFilter,
};
pub use parser::{BetParser, ParsedSlip, SlipError, SlipFault, SlipReport};
pub use periods::{Calendar, Period, PeriodKind};
pub use settings::Settings;
pub use vouchers::Voucher;
pub use wagers::{BetKind, Wager};

mod cleared_limits;
mod commands;
mod error;
pub mod figures;
mod ledger;
mod money;
mod ops;
pub mod parser;
mod periods;
mod settings;
mod util;
mod vouchers;
mod wagers;

type ResultEngine<T> = Result<T, EngineError>;
