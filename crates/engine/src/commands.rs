//! Command structs for engine write operations.
//!
//! These types group the parameters of a voucher submission or a settings
//! change, keeping call sites readable.

use chrono::{DateTime, Utc};

use crate::{
    EngineError, MoneyCents, Rate, ResultEngine, Settings,
    util::{ensure_non_negative, ensure_positive_rate},
};

/// Submit a bet slip as a new voucher.
#[derive(Clone, Debug)]
pub struct SubmitVoucherCmd {
    pub raw_text: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SubmitVoucherCmd {
    #[must_use]
    pub fn new(raw_text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            raw_text: raw_text.into(),
            notes: None,
            created_at,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial settings change. `None` fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub commission_percent: Option<Rate>,
    pub daily_limit: Option<MoneyCents>,
    pub weekly_limit: Option<MoneyCents>,
    pub monthly_limit: Option<MoneyCents>,
    pub direct_multiplier: Option<Rate>,
    pub rolled_multiplier: Option<Rate>,
}

impl SettingsUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commission_percent(mut self, value: Rate) -> Self {
        self.commission_percent = Some(value);
        self
    }

    #[must_use]
    pub fn daily_limit(mut self, value: MoneyCents) -> Self {
        self.daily_limit = Some(value);
        self
    }

    #[must_use]
    pub fn weekly_limit(mut self, value: MoneyCents) -> Self {
        self.weekly_limit = Some(value);
        self
    }

    #[must_use]
    pub fn monthly_limit(mut self, value: MoneyCents) -> Self {
        self.monthly_limit = Some(value);
        self
    }

    #[must_use]
    pub fn direct_multiplier(mut self, value: Rate) -> Self {
        self.direct_multiplier = Some(value);
        self
    }

    #[must_use]
    pub fn rolled_multiplier(mut self, value: Rate) -> Self {
        self.rolled_multiplier = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the changed fields on top of `current` and validates the result.
    pub fn apply(&self, current: &Settings) -> ResultEngine<Settings> {
        let next = Settings {
            commission_percent: self.commission_percent.unwrap_or(current.commission_percent),
            daily_limit: self.daily_limit.unwrap_or(current.daily_limit),
            weekly_limit: self.weekly_limit.unwrap_or(current.weekly_limit),
            monthly_limit: self.monthly_limit.unwrap_or(current.monthly_limit),
            direct_multiplier: self.direct_multiplier.unwrap_or(current.direct_multiplier),
            rolled_multiplier: self.rolled_multiplier.unwrap_or(current.rolled_multiplier),
            updated_at: current.updated_at,
        };

        let percent = next.commission_percent;
        if percent < Rate::ZERO || percent > Rate::whole(100) {
            return Err(EngineError::InvalidSettings(
                "commission percent must be between 0 and 100".to_string(),
            ));
        }
        ensure_non_negative(next.daily_limit, "daily limit")?;
        ensure_non_negative(next.weekly_limit, "weekly limit")?;
        ensure_non_negative(next.monthly_limit, "monthly limit")?;
        ensure_positive_rate(next.direct_multiplier, "direct multiplier")?;
        ensure_positive_rate(next.rolled_multiplier, "rolled multiplier")?;
        Ok(next)
    }
}
