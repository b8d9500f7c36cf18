use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BetKind, MoneyCents, ResultEngine};

use super::{Engine, pending_wagers};

/// Stake below which a number is not listed as high risk.
pub const DEFAULT_HIGH_RISK_STAKE: MoneyCents = MoneyCents::new(1_000_00);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureFilter {
    #[default]
    All,
    /// The `n` numbers with the most stake.
    Top(usize),
    /// Numbers whose pending stake is at least the threshold.
    AboveStake(MoneyCents),
}

impl ExposureFilter {
    pub fn high_risk() -> Self {
        Self::AboveStake(DEFAULT_HIGH_RISK_STAKE)
    }
}

/// Pending stake and payout on one number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NumberExposure {
    pub number: String,
    pub stake: MoneyCents,
    pub potential_payout: MoneyCents,
    pub wager_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KindExposure {
    pub number: String,
    pub kind: BetKind,
    pub stake: MoneyCents,
    pub potential_payout: MoneyCents,
}

impl Engine {
    /// Pending stake grouped by number, heaviest first.
    pub async fn number_exposure(&self, filter: ExposureFilter) -> ResultEngine<Vec<NumberExposure>> {
        let mut by_number: HashMap<String, NumberExposure> = HashMap::new();
        for wager in pending_wagers(&self.database).await? {
            let row = by_number
                .entry(wager.number.clone())
                .or_insert_with(|| NumberExposure {
                    number: wager.number.clone(),
                    stake: MoneyCents::ZERO,
                    potential_payout: MoneyCents::ZERO,
                    wager_count: 0,
                });
            row.stake += MoneyCents::new(wager.stake_minor);
            row.potential_payout += MoneyCents::new(wager.potential_payout_minor);
            row.wager_count += 1;
        }

        let mut rows: Vec<NumberExposure> = by_number.into_values().collect();
        rows.sort_by(|a, b| b.stake.cmp(&a.stake).then_with(|| a.number.cmp(&b.number)));
        match filter {
            ExposureFilter::All => {}
            ExposureFilter::Top(n) => rows.truncate(n),
            ExposureFilter::AboveStake(threshold) => rows.retain(|row| row.stake >= threshold),
        }
        debug!(?filter, numbers = rows.len(), "number exposure");
        Ok(rows)
    }

    /// Pending stake grouped by number and bet kind, heaviest first.
    pub async fn number_exposure_by_kind(&self) -> ResultEngine<Vec<KindExposure>> {
        let mut grouped: HashMap<(String, BetKind), KindExposure> = HashMap::new();
        for wager in pending_wagers(&self.database).await? {
            let kind = BetKind::try_from(wager.kind.as_str())?;
            let row = grouped
                .entry((wager.number.clone(), kind))
                .or_insert_with(|| KindExposure {
                    number: wager.number.clone(),
                    kind,
                    stake: MoneyCents::ZERO,
                    potential_payout: MoneyCents::ZERO,
                });
            row.stake += MoneyCents::new(wager.stake_minor);
            row.potential_payout += MoneyCents::new(wager.potential_payout_minor);
        }

        let mut rows: Vec<KindExposure> = grouped.into_values().collect();
        rows.sort_by(|a, b| {
            b.stake
                .cmp(&a.stake)
                .then_with(|| a.number.cmp(&b.number))
                .then_with(|| a.kind.cmp(&b.kind))
        });
        Ok(rows)
    }
}
