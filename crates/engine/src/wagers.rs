//! Wager primitives.
//!
//! A `Wager` is one bet on one 3-digit number. A voucher owns one or more
//! wagers; a rolled line produces one wager per digit permutation.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, Rate, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    /// `123=100*80`: one exact number.
    Direct,
    /// `123r50`: every permutation of the digits.
    Rolled,
}

impl BetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Rolled => "rolled",
        }
    }
}

impl TryFrom<&str> for BetKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "direct" => Ok(Self::Direct),
            "rolled" => Ok(Self::Rolled),
            other => Err(EngineError::InvalidData(format!(
                "invalid bet kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub number: String,
    pub kind: BetKind,
    pub stake: MoneyCents,
    pub multiplier: Rate,
    /// `stake × multiplier`, frozen at creation.
    pub potential_payout: MoneyCents,
}

impl Wager {
    /// Builds a wager and computes its potential payout.
    ///
    /// Returns `None` when the payout overflows.
    pub fn new(
        voucher_id: Uuid,
        number: String,
        kind: BetKind,
        stake: MoneyCents,
        multiplier: Rate,
    ) -> Option<Self> {
        let potential_payout = stake.checked_mul_rate(multiplier)?;
        Some(Self {
            id: Uuid::new_v4(),
            voucher_id,
            number,
            kind,
            stake,
            multiplier,
            potential_payout,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wagers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub voucher_id: String,
    /// Insertion order inside the voucher.
    pub position: i32,
    pub number: String,
    pub kind: String,
    pub stake_minor: i64,
    pub multiplier_hundredths: i64,
    pub potential_payout_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vouchers::Entity",
        from = "Column::VoucherId",
        to = "super::vouchers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Vouchers,
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<(&Wager, i32)> for ActiveModel {
    fn from((wager, position): (&Wager, i32)) -> Self {
        Self {
            id: ActiveValue::Set(wager.id.to_string()),
            voucher_id: ActiveValue::Set(wager.voucher_id.to_string()),
            position: ActiveValue::Set(position),
            number: ActiveValue::Set(wager.number.clone()),
            kind: ActiveValue::Set(wager.kind.as_str().to_string()),
            stake_minor: ActiveValue::Set(wager.stake.cents()),
            multiplier_hundredths: ActiveValue::Set(wager.multiplier.hundredths()),
            potential_payout_minor: ActiveValue::Set(wager.potential_payout.cents()),
        }
    }
}

impl TryFrom<Model> for Wager {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "wager")?,
            voucher_id: parse_uuid(&model.voucher_id, "voucher")?,
            number: model.number,
            kind: BetKind::try_from(model.kind.as_str())?,
            stake: MoneyCents::new(model.stake_minor),
            multiplier: Rate::from_hundredths(model.multiplier_hundredths),
            potential_payout: MoneyCents::new(model.potential_payout_minor),
        })
    }
}
