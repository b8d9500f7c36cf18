use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    BetParser, EngineError, MoneyCents, ResultEngine, SlipReport, SubmitVoucherCmd, Voucher,
    Wager, util::normalize_optional_text, vouchers, wagers,
};

use super::{Engine, load_settings, with_tx};

/// Which vouchers [`Engine::vouchers`] returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherFilter {
    #[default]
    All,
    /// Not forwarded yet; these feed the dashboard.
    Pending,
    Forwarded,
}

impl Engine {
    /// Parser configured with the current multipliers.
    pub async fn parser(&self) -> ResultEngine<BetParser> {
        let settings = load_settings(&self.database).await?;
        Ok(BetParser::from(&settings))
    }

    /// Parses `text` without storing anything.
    pub async fn preview_slip(&self, text: &str) -> ResultEngine<SlipReport> {
        let parser = self.parser().await?;
        Ok(SlipReport::from(parser.parse(text, Uuid::nil())))
    }

    /// Parses the slip and stores it as a new pending voucher with its wagers.
    ///
    /// Nothing is written when the slip does not parse.
    pub async fn submit_voucher(&self, cmd: SubmitVoucherCmd) -> ResultEngine<Voucher> {
        let notes = normalize_optional_text(cmd.notes.as_deref());
        with_tx!(self, |db_tx| {
            let settings = load_settings(&db_tx).await?;
            let voucher_id = Uuid::new_v4();
            let slip = BetParser::from(&settings).parse(&cmd.raw_text, voucher_id)?;

            let wager_count = u32::try_from(slip.wagers.len())
                .map_err(|_| EngineError::InvalidData("too many wagers".to_string()))?;
            let total = slip
                .staked()
                .ok_or_else(|| EngineError::InvalidAmount("slip total too large".to_string()))?;
            let voucher = Voucher {
                id: voucher_id,
                raw_text: cmd.raw_text.clone(),
                total,
                wager_count,
                created_at: cmd.created_at,
                forwarded: false,
                forwarded_at: None,
                notes,
            };
            vouchers::ActiveModel::try_from(&voucher)?.insert(&db_tx).await?;

            let rows = slip
                .wagers
                .iter()
                .zip(0..)
                .map(|(wager, position)| wagers::ActiveModel::from((wager, position)));
            wagers::Entity::insert_many(rows).exec(&db_tx).await?;

            info!(
                voucher_id = %voucher.id,
                wagers = voucher.wager_count,
                total = %voucher.total,
                "voucher submitted"
            );
            Ok(voucher)
        })
    }

    pub async fn voucher(&self, voucher_id: Uuid) -> ResultEngine<Voucher> {
        let model = vouchers::Entity::find_by_id(voucher_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(voucher_id.to_string()))?;
        Voucher::try_from(model)
    }

    /// Wagers of one voucher in the order the slip produced them.
    pub async fn voucher_wagers(&self, voucher_id: Uuid) -> ResultEngine<Vec<Wager>> {
        with_tx!(self, |db_tx| {
            let id = voucher_id.to_string();
            vouchers::Entity::find_by_id(id.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(id.clone()))?;

            wagers::Entity::find()
                .filter(wagers::Column::VoucherId.eq(id))
                .order_by_asc(wagers::Column::Position)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Wager::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Vouchers newest first.
    pub async fn vouchers(&self, filter: VoucherFilter) -> ResultEngine<Vec<Voucher>> {
        let mut query = vouchers::Entity::find();
        match filter {
            VoucherFilter::All => {}
            VoucherFilter::Pending => {
                query = query.filter(vouchers::Column::IsForwarded.eq(false));
            }
            VoucherFilter::Forwarded => {
                query = query.filter(vouchers::Column::IsForwarded.eq(true));
            }
        }

        let models = query
            .order_by_desc(vouchers::Column::CreatedAt)
            .order_by_asc(vouchers::Column::Id)
            .all(&self.database)
            .await?;
        debug!(?filter, count = models.len(), "listed vouchers");
        models.into_iter().map(Voucher::try_from).collect()
    }

    /// Removes a voucher and its wagers. Ledger entries that mention it stay.
    pub async fn delete_voucher(&self, voucher_id: Uuid) -> ResultEngine<()> {
        let id = voucher_id.to_string();
        with_tx!(self, |db_tx| {
            wagers::Entity::delete_many()
                .filter(wagers::Column::VoucherId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            let deleted = vouchers::Entity::delete_by_id(id.clone())
                .exec(&db_tx)
                .await?;
            if deleted.rows_affected == 0 {
                return Err(EngineError::KeyNotFound(id));
            }
            info!(voucher_id = %voucher_id, "voucher deleted");
            Ok(())
        })
    }

    /// Sum of the totals of vouchers not yet forwarded. Matches
    /// [`Engine::raw_sales`], since a voucher total is the sum of its stakes.
    pub async fn pending_total(&self) -> ResultEngine<MoneyCents> {
        let pending = self.vouchers(VoucherFilter::Pending).await?;
        Ok(pending.iter().map(|v| v.total).sum())
    }
}
