//! Calendar periods used by limit clearing.
//!
//! A period is a closed interval `[start, end]` where `end` is one
//! millisecond before the next period starts. Boundaries are computed in the
//! operator's local time zone and then stored in UTC.

use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, Months, NaiveDate, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Daily,
    Weekly,
    Monthly,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 3] = [PeriodKind::Daily, PeriodKind::Weekly, PeriodKind::Monthly];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl TryFrom<&str> for PeriodKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(EngineError::InvalidData(format!(
                "invalid period kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub kind: PeriodKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Local calendar rules: time zone plus the first day of the week.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calendar {
    pub timezone: Tz,
    pub week_start: Weekday,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            week_start: Weekday::Mon,
        }
    }
}

impl Calendar {
    pub fn new(timezone: Tz, week_start: Weekday) -> Self {
        Self {
            timezone,
            week_start,
        }
    }

    /// The period of `kind` containing `now`.
    pub fn period(&self, kind: PeriodKind, now: DateTime<Utc>) -> ResultEngine<Period> {
        let today = now.with_timezone(&self.timezone).date_naive();
        let (first, next) = match kind {
            PeriodKind::Daily => (today, today.checked_add_days(Days::new(1))),
            PeriodKind::Weekly => {
                let back = (7 + today.weekday().num_days_from_monday()
                    - self.week_start.num_days_from_monday())
                    % 7;
                let first = today
                    .checked_sub_days(Days::new(u64::from(back)))
                    .ok_or_else(out_of_range)?;
                (first, first.checked_add_days(Days::new(7)))
            }
            PeriodKind::Monthly => {
                let first = today.with_day(1).ok_or_else(out_of_range)?;
                (first, first.checked_add_months(Months::new(1)))
            }
        };
        let next = next.ok_or_else(out_of_range)?;

        let start = self.local_midnight(first)?;
        let end = self.local_midnight(next)? - Duration::milliseconds(1);
        Ok(Period { kind, start, end })
    }

    /// First instant of `date` in the calendar's zone, in UTC.
    ///
    /// Where a DST jump skips midnight the day starts at the first valid
    /// local time after it.
    fn local_midnight(&self, date: NaiveDate) -> ResultEngine<DateTime<Utc>> {
        let mut naive = date.and_hms_opt(0, 0, 0).ok_or_else(out_of_range)?;
        for _ in 0..4 {
            match self.timezone.from_local_datetime(&naive) {
                LocalResult::Single(at) => return Ok(at.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => return Ok(earliest.with_timezone(&Utc)),
                LocalResult::None => naive += Duration::minutes(30),
            }
        }
        Err(out_of_range())
    }
}

fn out_of_range() -> EngineError {
    EngineError::InvalidData("date out of range".to_string())
}
