//! The single-row configuration record: commission, limits and multipliers.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{MoneyCents, Rate};

/// Primary key of the only settings row.
pub(crate) const SETTINGS_ROW_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Percentage of total sales kept as commission (`5` = 5%).
    pub commission_percent: Rate,
    pub daily_limit: MoneyCents,
    pub weekly_limit: MoneyCents,
    pub monthly_limit: MoneyCents,
    pub direct_multiplier: Rate,
    pub rolled_multiplier: Rate,
    /// `None` until the row has been written once.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            commission_percent: Rate::whole(5),
            daily_limit: MoneyCents::new(10_000_00),
            weekly_limit: MoneyCents::new(50_000_00),
            monthly_limit: MoneyCents::new(200_000_00),
            direct_multiplier: Rate::whole(80),
            rolled_multiplier: Rate::whole(500),
            updated_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub commission_hundredths: i64,
    pub daily_limit_minor: i64,
    pub weekly_limit_minor: i64,
    pub monthly_limit_minor: i64,
    pub direct_multiplier_hundredths: i64,
    pub rolled_multiplier_hundredths: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Settings {
    fn from(model: Model) -> Self {
        Self {
            commission_percent: Rate::from_hundredths(model.commission_hundredths),
            daily_limit: MoneyCents::new(model.daily_limit_minor),
            weekly_limit: MoneyCents::new(model.weekly_limit_minor),
            monthly_limit: MoneyCents::new(model.monthly_limit_minor),
            direct_multiplier: Rate::from_hundredths(model.direct_multiplier_hundredths),
            rolled_multiplier: Rate::from_hundredths(model.rolled_multiplier_hundredths),
            updated_at: Some(model.updated_at),
        }
    }
}

impl ActiveModel {
    pub(crate) fn from_settings(settings: &Settings, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::Set(SETTINGS_ROW_ID),
            commission_hundredths: ActiveValue::Set(settings.commission_percent.hundredths()),
            daily_limit_minor: ActiveValue::Set(settings.daily_limit.cents()),
            weekly_limit_minor: ActiveValue::Set(settings.weekly_limit.cents()),
            monthly_limit_minor: ActiveValue::Set(settings.monthly_limit.cents()),
            direct_multiplier_hundredths: ActiveValue::Set(
                settings.direct_multiplier.hundredths(),
            ),
            rolled_multiplier_hundredths: ActiveValue::Set(
                settings.rolled_multiplier.hundredths(),
            ),
            updated_at: ActiveValue::Set(updated_at),
        }
    }
}
