use chrono::{DateTime, Utc};
use sea_orm::{TransactionTrait, prelude::*};
use tracing::info;

use crate::{ResultEngine, Settings, SettingsUpdate, settings};

use super::{Engine, load_settings, with_tx};

impl Engine {
    /// Current settings; defaults when none were saved.
    pub async fn settings(&self) -> ResultEngine<Settings> {
        load_settings(&self.database).await
    }

    /// Applies a partial update and stores the single settings row.
    ///
    /// Existing wagers keep the multiplier they were created with.
    pub async fn update_settings(
        &self,
        update: SettingsUpdate,
        updated_at: DateTime<Utc>,
    ) -> ResultEngine<Settings> {
        with_tx!(self, |db_tx| {
            let current = load_settings(&db_tx).await?;
            let mut next = update.apply(&current)?;
            next.updated_at = Some(updated_at);

            let row = settings::ActiveModel::from_settings(&next, updated_at);
            if current.updated_at.is_some() {
                row.update(&db_tx).await?;
            } else {
                row.insert(&db_tx).await?;
            }
            info!(
                commission = %next.commission_percent,
                daily_limit = %next.daily_limit,
                direct = %next.direct_multiplier,
                rolled = %next.rolled_multiplier,
                "settings updated"
            );
            Ok(next)
        })
    }
}
