use chrono::Weekday;
use chrono_tz::Tz;
use sea_orm::{ConnectionTrait, DatabaseConnection, JoinType, QueryFilter, QuerySelect, prelude::*};

use crate::{Calendar, ResultEngine, Settings};

mod dashboard;
mod forwarding;
mod limits;
mod reports;
mod settings;
mod vouchers;

pub use forwarding::LedgerFilter;
pub use reports::{DEFAULT_HIGH_RISK_STAKE, ExposureFilter, KindExposure, NumberExposure};
pub use vouchers::VoucherFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    calendar: Calendar,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Local calendar used for period boundaries.
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }
}

/// Stored settings, or the defaults when the row was never written.
async fn load_settings<C: ConnectionTrait>(db: &C) -> ResultEngine<Settings> {
    let model = crate::settings::Entity::find_by_id(crate::settings::SETTINGS_ROW_ID)
        .one(db)
        .await?;
    Ok(model.map(Settings::from).unwrap_or_default())
}

/// Wagers of vouchers that have not been forwarded yet.
async fn pending_wagers<C: ConnectionTrait>(db: &C) -> ResultEngine<Vec<crate::wagers::Model>> {
    let models = crate::wagers::Entity::find()
        .join(JoinType::InnerJoin, crate::wagers::Relation::Vouchers.def())
        .filter(crate::vouchers::Column::IsForwarded.eq(false))
        .all(db)
        .await?;
    Ok(models)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    calendar: Calendar,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    pub fn calendar(mut self, calendar: Calendar) -> EngineBuilder {
        self.calendar = calendar;
        self
    }

    /// Time zone for day, week and month boundaries. Defaults to UTC.
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.calendar.timezone = timezone;
        self
    }

    /// First day of the week. Defaults to Monday.
    pub fn week_start(mut self, week_start: Weekday) -> EngineBuilder {
        self.calendar.week_start = week_start;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            calendar: self.calendar,
        })
    }
}
