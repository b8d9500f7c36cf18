use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    EngineError, LedgerEntry, MoneyCents, PeriodKind, ResultEngine, Voucher, ledger,
    util::normalize_optional_text, vouchers,
};

use super::{Engine, with_tx};

/// Which ledger entries [`Engine::ledger`] returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerFilter {
    #[default]
    All,
    Active,
    Reversed,
}

impl Engine {
    /// Marks a voucher as forwarded and appends a ledger entry with its total.
    ///
    /// Forwarding the same voucher again changes nothing and returns the entry
    /// recorded the first time.
    pub async fn forward_voucher(
        &self,
        voucher_id: Uuid,
        forwarded_at: DateTime<Utc>,
    ) -> ResultEngine<LedgerEntry> {
        let id = voucher_id.to_string();
        with_tx!(self, |db_tx| {
            let model = vouchers::Entity::find_by_id(id.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(id.clone()))?;
            let voucher = Voucher::try_from(model)?;

            let flipped = vouchers::Entity::update_many()
                .col_expr(vouchers::Column::IsForwarded, Expr::value(true))
                .col_expr(vouchers::Column::ForwardedAt, Expr::value(forwarded_at))
                .filter(vouchers::Column::Id.eq(id.clone()))
                .filter(vouchers::Column::IsForwarded.eq(false))
                .exec(&db_tx)
                .await?;

            if flipped.rows_affected == 0 {
                debug!(voucher_id = %voucher_id, "voucher already forwarded");
                let existing = ledger::Entity::find()
                    .filter(ledger::Column::VoucherId.eq(id.clone()))
                    .order_by_asc(ledger::Column::ForwardedAt)
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound(format!("ledger entry for {id}")))?;
                LedgerEntry::try_from(existing)
            } else {
                let entry = LedgerEntry::new(voucher_id, voucher.total, forwarded_at);
                ledger::ActiveModel::from(&entry).insert(&db_tx).await?;
                info!(
                    voucher_id = %voucher_id,
                    entry_id = %entry.id,
                    amount = %entry.amount,
                    "voucher forwarded"
                );
                Ok(entry)
            }
        })
    }

    /// Reverses a ledger entry once.
    ///
    /// The voucher stays forwarded. A second reversal fails with
    /// [`EngineError::AlreadyReversed`] and leaves the first one intact.
    pub async fn reverse_forwarding(
        &self,
        entry_id: Uuid,
        reason: Option<&str>,
        reversed_at: DateTime<Utc>,
    ) -> ResultEngine<LedgerEntry> {
        let id = entry_id.to_string();
        let reason = normalize_optional_text(reason);
        with_tx!(self, |db_tx| {
            let updated = ledger::Entity::update_many()
                .col_expr(ledger::Column::IsReversed, Expr::value(true))
                .col_expr(ledger::Column::ReversedAt, Expr::value(reversed_at))
                .col_expr(ledger::Column::ReversalReason, Expr::value(reason.clone()))
                .filter(ledger::Column::Id.eq(id.clone()))
                .filter(ledger::Column::IsReversed.eq(false))
                .exec(&db_tx)
                .await?;

            let model = ledger::Entity::find_by_id(id.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(id.clone()))?;
            if updated.rows_affected == 0 {
                warn!(entry_id = %entry_id, "ledger entry already reversed");
                return Err(EngineError::AlreadyReversed(id));
            }

            info!(entry_id = %entry_id, "forwarding reversed");
            LedgerEntry::try_from(model)
        })
    }

    /// Ledger entries, most recently forwarded first.
    pub async fn ledger(&self, filter: LedgerFilter) -> ResultEngine<Vec<LedgerEntry>> {
        let mut query = ledger::Entity::find();
        match filter {
            LedgerFilter::All => {}
            LedgerFilter::Active => query = query.filter(ledger::Column::IsReversed.eq(false)),
            LedgerFilter::Reversed => query = query.filter(ledger::Column::IsReversed.eq(true)),
        }
        query
            .order_by_desc(ledger::Column::ForwardedAt)
            .order_by_asc(ledger::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect()
    }

    pub async fn ledger_entry_for_voucher(
        &self,
        voucher_id: Uuid,
    ) -> ResultEngine<Option<LedgerEntry>> {
        ledger::Entity::find()
            .filter(ledger::Column::VoucherId.eq(voucher_id.to_string()))
            .order_by_asc(ledger::Column::ForwardedAt)
            .one(&self.database)
            .await?
            .map(LedgerEntry::try_from)
            .transpose()
    }

    /// Sum of every forwarded amount that has not been reversed.
    pub async fn total_forwarded(&self) -> ResultEngine<MoneyCents> {
        let entries = self.ledger(LedgerFilter::Active).await?;
        Ok(entries.iter().map(|entry| entry.amount).sum())
    }

    /// Like [`Engine::total_forwarded`], restricted to the period containing `now`.
    pub async fn forwarded_in_period(
        &self,
        kind: PeriodKind,
        now: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let period = self.calendar.period(kind, now)?;
        let models = ledger::Entity::find()
            .filter(ledger::Column::IsReversed.eq(false))
            .filter(ledger::Column::ForwardedAt.gte(period.start))
            .filter(ledger::Column::ForwardedAt.lte(period.end))
            .all(&self.database)
            .await?;
        Ok(models
            .iter()
            .map(|model| MoneyCents::new(model.amount_minor))
            .sum())
    }
}
