//! Forwarding ledger.
//!
//! One entry is appended each time a voucher is forwarded to the master book.
//! Entries are never deleted: a reversal only sets `reversed_at` and the
//! reason, and it can happen once.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub amount: MoneyCents,
    pub forwarded_at: DateTime<Utc>,
    pub reversed: bool,
    pub reversed_at: Option<DateTime<Utc>>,
    pub reversal_reason: Option<String>,
}

impl LedgerEntry {
    pub fn new(voucher_id: Uuid, amount: MoneyCents, forwarded_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            voucher_id,
            amount,
            forwarded_at,
            reversed: false,
            reversed_at: None,
            reversal_reason: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.reversed
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "forwarding_ledger")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub voucher_id: String,
    pub amount_minor: i64,
    pub forwarded_at: DateTimeUtc,
    pub is_reversed: bool,
    pub reversed_at: Option<DateTimeUtc>,
    pub reversal_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            voucher_id: ActiveValue::Set(entry.voucher_id.to_string()),
            amount_minor: ActiveValue::Set(entry.amount.cents()),
            forwarded_at: ActiveValue::Set(entry.forwarded_at),
            is_reversed: ActiveValue::Set(entry.reversed),
            reversed_at: ActiveValue::Set(entry.reversed_at),
            reversal_reason: ActiveValue::Set(entry.reversal_reason.clone()),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "ledger entry")?,
            voucher_id: parse_uuid(&model.voucher_id, "voucher")?,
            amount: MoneyCents::new(model.amount_minor),
            forwarded_at: model.forwarded_at,
            reversed: model.is_reversed,
            reversed_at: model.reversed_at,
            reversal_reason: model.reversal_reason,
        })
    }
}
