//! Dashboard arithmetic.
//!
//! Pure functions over already-loaded sums; the storage reads live in
//! `ops::dashboard`.

use serde::Serialize;

use crate::{MoneyCents, Rate, Settings};

/// Share of the outstanding potential payout charged against net profit (1%).
pub const PAYOUT_RISK_DISCOUNT: Rate = Rate::from_hundredths(100);

/// Sales after the daily cleared offset, capped at the daily limit.
pub fn total_sales(
    raw_sales: MoneyCents,
    daily_cleared: MoneyCents,
    daily_limit: MoneyCents,
) -> MoneyCents {
    let remaining = raw_sales.checked_sub(daily_cleared).unwrap_or(MoneyCents::ZERO);
    remaining.clamp_to(MoneyCents::ZERO, daily_limit.max(MoneyCents::ZERO))
}

/// The amount reported to the master book.
///
/// Equal to [`total_sales`] whenever that is already capped; kept separate so
/// the reported figure has its own entry point.
pub fn self_report(total_sales: MoneyCents, daily_limit: MoneyCents) -> MoneyCents {
    total_sales.min(daily_limit)
}

pub fn commission(total_sales: MoneyCents, commission_percent: Rate) -> MoneyCents {
    total_sales.percent(commission_percent)
}

pub fn net_profit(
    total_sales: MoneyCents,
    commission: MoneyCents,
    potential_payout: MoneyCents,
) -> MoneyCents {
    total_sales - commission - potential_payout.percent(PAYOUT_RISK_DISCOUNT)
}

/// One consistent snapshot of every dashboard figure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DashboardFigures {
    pub raw_sales: MoneyCents,
    pub daily_cleared: MoneyCents,
    pub total_sales: MoneyCents,
    pub self_report: MoneyCents,
    pub commission: MoneyCents,
    pub potential_payout: MoneyCents,
    pub net_profit: MoneyCents,
}

impl DashboardFigures {
    pub fn compute(
        raw_sales: MoneyCents,
        daily_cleared: MoneyCents,
        potential_payout: MoneyCents,
        settings: &Settings,
    ) -> Self {
        let total_sales = total_sales(raw_sales, daily_cleared, settings.daily_limit);
        let commission = commission(total_sales, settings.commission_percent);
        Self {
            raw_sales,
            daily_cleared,
            total_sales,
            self_report: self_report(total_sales, settings.daily_limit),
            commission,
            potential_payout,
            net_profit: net_profit(total_sales, commission, potential_payout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(units: i64) -> MoneyCents {
        MoneyCents::new(units * 100)
    }

    #[test]
    fn total_sales_is_capped_by_daily_limit() {
        assert_eq!(total_sales(cents(12_000), cents(0), cents(10_000)), cents(10_000));
        assert_eq!(total_sales(cents(4_000), cents(0), cents(10_000)), cents(4_000));
    }

    #[test]
    fn cleared_amount_offsets_sales_but_never_below_zero() {
        assert_eq!(total_sales(cents(12_000), cents(5_000), cents(10_000)), cents(7_000));
        assert_eq!(total_sales(cents(1_000), cents(5_000), cents(10_000)), MoneyCents::ZERO);
    }

    #[test]
    fn self_report_matches_total_sales() {
        for raw in [0, 1, 9_999, 10_000, 10_001, 250_000] {
            let total = total_sales(cents(raw), cents(0), cents(10_000));
            assert_eq!(self_report(total, cents(10_000)), total);
        }
    }

    #[test]
    fn commission_is_a_percentage_of_total_sales() {
        assert_eq!(commission(cents(10_000), Rate::whole(5)), cents(500));
        assert_eq!(commission(cents(0), Rate::whole(5)), MoneyCents::ZERO);
        assert_eq!(commission(cents(200), Rate::from_hundredths(250)), cents(5));
    }

    #[test]
    fn net_profit_discounts_one_percent_of_payout() {
        // 10 000 sales, 500 commission, 400 000 payout exposure.
        assert_eq!(net_profit(cents(10_000), cents(500), cents(400_000)), cents(5_500));
    }

    #[test]
    fn snapshot_uses_settings() {
        let settings = Settings::default();
        let figures = DashboardFigures::compute(cents(350), cents(0), cents(33_000), &settings);
        assert_eq!(figures.total_sales, cents(350));
        assert_eq!(figures.self_report, cents(350));
        assert_eq!(figures.commission, MoneyCents::new(17_50));
        // 350 - 17.50 - 330
        assert_eq!(figures.net_profit, MoneyCents::new(2_50));
    }

    #[test]
    fn snapshot_is_idempotent() {
        let settings = Settings::default();
        let first = DashboardFigures::compute(cents(15_000), cents(2_000), cents(90_000), &settings);
        let second = DashboardFigures::compute(cents(15_000), cents(2_000), cents(90_000), &settings);
        assert_eq!(first, second);
        assert_eq!(first.total_sales, cents(10_000));
        assert_eq!(first.commission, cents(500));
        assert_eq!(first.net_profit, cents(8_600));
    }
}
