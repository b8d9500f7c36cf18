//! The module contains `Voucher`, a submitted bet slip.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

/// A bet slip as typed by the operator.
///
/// `total` is the sum of the stakes of every wager the slip expanded into, so
/// a rolled line counts once per permutation. The wagers are stored
/// separately and cascade with the voucher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: Uuid,
    pub raw_text: String,
    pub total: MoneyCents,
    pub wager_count: u32,
    pub created_at: DateTime<Utc>,
    pub forwarded: bool,
    pub forwarded_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Voucher {
    /// Whether the voucher still counts toward the live figures.
    pub fn is_pending(&self) -> bool {
        !self.forwarded
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub raw_text: String,
    pub total_minor: i64,
    pub wager_count: i32,
    pub created_at: DateTimeUtc,
    pub is_forwarded: bool,
    pub forwarded_at: Option<DateTimeUtc>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wagers::Entity")]
    Wagers,
}

impl Related<super::wagers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wagers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Voucher> for ActiveModel {
    type Error = EngineError;

    fn try_from(voucher: &Voucher) -> ResultEngine<Self> {
        let wager_count = i32::try_from(voucher.wager_count)
            .map_err(|_| EngineError::InvalidData("too many wagers".to_string()))?;
        Ok(Self {
            id: ActiveValue::Set(voucher.id.to_string()),
            raw_text: ActiveValue::Set(voucher.raw_text.clone()),
            total_minor: ActiveValue::Set(voucher.total.cents()),
            wager_count: ActiveValue::Set(wager_count),
            created_at: ActiveValue::Set(voucher.created_at),
            is_forwarded: ActiveValue::Set(voucher.forwarded),
            forwarded_at: ActiveValue::Set(voucher.forwarded_at),
            notes: ActiveValue::Set(voucher.notes.clone()),
        })
    }
}

impl TryFrom<Model> for Voucher {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let wager_count = u32::try_from(model.wager_count).map_err(|_| {
            EngineError::InvalidData(format!("negative wager count on voucher {}", model.id))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "voucher")?,
            raw_text: model.raw_text,
            total: MoneyCents::new(model.total_minor),
            wager_count,
            created_at: model.created_at,
            forwarded: model.is_forwarded,
            forwarded_at: model.forwarded_at,
            notes: model.notes,
        })
    }
}
