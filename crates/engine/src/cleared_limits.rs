//! Operator acknowledgments that a period's sales no longer count against
//! its limit.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, Period, PeriodKind, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedLimit {
    pub id: Uuid,
    pub period: Period,
    pub amount: MoneyCents,
    pub cleared_at: DateTime<Utc>,
}

impl ClearedLimit {
    pub fn new(period: Period, amount: MoneyCents, cleared_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            period,
            amount,
            cleared_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cleared_limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub period_kind: String,
    pub period_start: DateTimeUtc,
    pub period_end: DateTimeUtc,
    pub cleared_minor: i64,
    pub cleared_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ClearedLimit> for ActiveModel {
    fn from(limit: &ClearedLimit) -> Self {
        Self {
            id: ActiveValue::Set(limit.id.to_string()),
            period_kind: ActiveValue::Set(limit.period.kind.as_str().to_string()),
            period_start: ActiveValue::Set(limit.period.start),
            period_end: ActiveValue::Set(limit.period.end),
            cleared_minor: ActiveValue::Set(limit.amount.cents()),
            cleared_at: ActiveValue::Set(limit.cleared_at),
        }
    }
}

impl TryFrom<Model> for ClearedLimit {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "cleared limit")?,
            period: Period {
                kind: PeriodKind::try_from(model.period_kind.as_str())?,
                start: model.period_start,
                end: model.period_end,
            },
            amount: MoneyCents::new(model.cleared_minor),
            cleared_at: model.cleared_at,
        })
    }
}
