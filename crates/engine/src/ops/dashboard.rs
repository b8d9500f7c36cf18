use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;
use tracing::debug;

use crate::{DashboardFigures, MoneyCents, PeriodKind, ResultEngine};

use super::{Engine, limits::cleared_within, load_settings, pending_wagers, with_tx};

impl Engine {
    /// Every dashboard figure read from one snapshot.
    ///
    /// A missing settings row reads as the defaults and an empty book as zero.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> ResultEngine<DashboardFigures> {
        let today = self.calendar.period(PeriodKind::Daily, now)?;
        with_tx!(self, |db_tx| {
            let settings = load_settings(&db_tx).await?;
            let wagers = pending_wagers(&db_tx).await?;
            let raw_sales: MoneyCents =
                wagers.iter().map(|w| MoneyCents::new(w.stake_minor)).sum();
            let payout: MoneyCents = wagers
                .iter()
                .map(|w| MoneyCents::new(w.potential_payout_minor))
                .sum();
            let daily_cleared = cleared_within(&db_tx, &today).await?;

            let figures = DashboardFigures::compute(raw_sales, daily_cleared, payout, &settings);
            debug!(?figures, "dashboard computed");
            Ok(figures)
        })
    }

    /// Stake of all pending wagers before any offset or cap.
    pub async fn raw_sales(&self) -> ResultEngine<MoneyCents> {
        let wagers = pending_wagers(&self.database).await?;
        Ok(wagers.iter().map(|w| MoneyCents::new(w.stake_minor)).sum())
    }

    pub async fn total_sales(&self, now: DateTime<Utc>) -> ResultEngine<MoneyCents> {
        Ok(self.dashboard(now).await?.total_sales)
    }

    pub async fn self_report(&self, now: DateTime<Utc>) -> ResultEngine<MoneyCents> {
        Ok(self.dashboard(now).await?.self_report)
    }

    pub async fn commission(&self, now: DateTime<Utc>) -> ResultEngine<MoneyCents> {
        Ok(self.dashboard(now).await?.commission)
    }

    pub async fn potential_payout(&self) -> ResultEngine<MoneyCents> {
        let wagers = pending_wagers(&self.database).await?;
        Ok(wagers
            .iter()
            .map(|w| MoneyCents::new(w.potential_payout_minor))
            .sum())
    }

    pub async fn net_profit(&self, now: DateTime<Utc>) -> ResultEngine<MoneyCents> {
        Ok(self.dashboard(now).await?.net_profit)
    }
}
