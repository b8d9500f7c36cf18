use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;

use crate::{
    ClearedLimit, EngineError, MoneyCents, Period, PeriodKind, ResultEngine, cleared_limits,
};

use super::{Engine, with_tx};

impl Engine {
    /// Records `amount` as cleared for the period of `kind` containing `now`.
    ///
    /// Replaces any earlier record for the same period.
    pub async fn clear_limit(
        &self,
        kind: PeriodKind,
        amount: MoneyCents,
        now: DateTime<Utc>,
    ) -> ResultEngine<ClearedLimit> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "cleared amount must be >= 0".to_string(),
            ));
        }
        let period = self.calendar.period(kind, now)?;

        with_tx!(self, |db_tx| {
            let replaced = cleared_limits::Entity::delete_many()
                .filter(cleared_limits::Column::PeriodKind.eq(kind.as_str()))
                .filter(cleared_limits::Column::PeriodStart.eq(period.start))
                .filter(cleared_limits::Column::PeriodEnd.eq(period.end))
                .exec(&db_tx)
                .await?;

            let record = ClearedLimit::new(period, amount, now);
            cleared_limits::ActiveModel::from(&record)
                .insert(&db_tx)
                .await?;
            info!(
                kind = kind.as_str(),
                amount = %amount,
                replaced = replaced.rows_affected,
                "limit cleared"
            );
            Ok(record)
        })
    }

    /// Cleared records of one kind, newest period first.
    pub async fn cleared_limits(&self, kind: PeriodKind) -> ResultEngine<Vec<ClearedLimit>> {
        cleared_limits::Entity::find()
            .filter(cleared_limits::Column::PeriodKind.eq(kind.as_str()))
            .order_by_desc(cleared_limits::Column::PeriodStart)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ClearedLimit::try_from)
            .collect()
    }

    /// Sum cleared for the period of `kind` containing `now`.
    pub async fn cleared_in_period(
        &self,
        kind: PeriodKind,
        now: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let period = self.calendar.period(kind, now)?;
        cleared_within(&self.database, &period).await
    }
}

/// Sum of the records of `period.kind` whose range lies inside `period`.
pub(super) async fn cleared_within<C: ConnectionTrait>(
    db: &C,
    period: &Period,
) -> ResultEngine<MoneyCents> {
    let models = cleared_limits::Entity::find()
        .filter(cleared_limits::Column::PeriodKind.eq(period.kind.as_str()))
        .filter(cleared_limits::Column::PeriodStart.gte(period.start))
        .filter(cleared_limits::Column::PeriodEnd.lte(period.end))
        .all(db)
        .await?;
    Ok(models
        .iter()
        .map(|model| MoneyCents::new(model.cleared_minor))
        .sum())
}
