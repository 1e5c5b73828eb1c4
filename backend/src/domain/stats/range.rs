//! Time-range options for survey statistics.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, TimeDelta, TimeZone, Utc};

/// Range picker values accepted by the statistics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOption {
    /// Rolling 24 hours ending now (`1D`).
    Last24Hours,
    /// One calendar day chosen by the caller (`DAY`).
    Day,
    /// Trailing 7 days (`1W`).
    Week,
    /// Trailing 30 days (`1M`).
    Month,
    /// Trailing 90 days (`3M`).
    Quarter,
    /// Trailing 180 days (`6M`).
    HalfYear,
    /// Trailing 365 days (`1Y`).
    Year,
    /// Every response ever recorded (`ALL`).
    All,
}

impl RangeOption {
    /// Wire name of the option.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Last24Hours => "1D",
            Self::Day => "DAY",
            Self::Week => "1W",
            Self::Month => "1M",
            Self::Quarter => "3M",
            Self::HalfYear => "6M",
            Self::Year => "1Y",
            Self::All => "ALL",
        }
    }

    const fn trailing_days(self) -> Option<u32> {
        match self {
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Quarter => Some(90),
            Self::HalfYear => Some(180),
            Self::Year => Some(365),
            Self::Last24Hours | Self::Day | Self::All => None,
        }
    }
}

impl fmt::Display for RangeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while resolving a range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// The option text is not recognised.
    #[error("unknown range option: {value}")]
    UnknownOption { value: String },
    /// `DAY` was requested without a date.
    #[error("range DAY requires a selected date")]
    MissingDate,
}

impl FromStr for RangeOption {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1D" => Ok(Self::Last24Hours),
            "DAY" => Ok(Self::Day),
            "1W" => Ok(Self::Week),
            "1M" => Ok(Self::Month),
            "3M" => Ok(Self::Quarter),
            "6M" => Ok(Self::HalfYear),
            "1Y" => Ok(Self::Year),
            "ALL" => Ok(Self::All),
            other => Err(RangeError::UnknownOption {
                value: other.to_owned(),
            }),
        }
    }
}

/// A range option resolved against its parameters.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use orbsurvey::domain::stats::{RangeOption, RangeSelection};
///
/// let day = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
/// let selection = RangeSelection::new(RangeOption::Day, Some(day)).expect("resolved");
/// assert_eq!(selection, RangeSelection::Day(day));
/// assert!(RangeSelection::new(RangeOption::Day, None).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelection {
    Last24Hours,
    Day(NaiveDate),
    Trailing { days: u32 },
    All,
}

impl RangeSelection {
    /// Resolve `option`; `selected_date` is only consulted for `DAY`.
    pub fn new(option: RangeOption, selected_date: Option<NaiveDate>) -> Result<Self, RangeError> {
        if let Some(days) = option.trailing_days() {
            return Ok(Self::Trailing { days });
        }
        match option {
            RangeOption::Last24Hours => Ok(Self::Last24Hours),
            RangeOption::Day => selected_date.map(Self::Day).ok_or(RangeError::MissingDate),
            _ => Ok(Self::All),
        }
    }

    /// Inclusive lower and exclusive upper bound of the window, or `None` for
    /// an unbounded range.
    ///
    /// Rolling windows end one nanosecond after `now` so a response stamped
    /// exactly at `now` is counted.
    #[must_use]
    pub fn window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let now_utc = now.with_timezone(&Utc);
        let end = now_utc + TimeDelta::nanoseconds(1);
        match *self {
            Self::Last24Hours => Some((now_utc - TimeDelta::hours(24), end)),
            Self::Trailing { days } => Some((now_utc - TimeDelta::days(i64::from(days)), end)),
            Self::Day(date) => {
                let tz = now.timezone();
                let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
                Some((local_midnight(&tz, date), local_midnight(&tz, next)))
            }
            Self::All => None,
        }
    }

    /// Whether `timestamp` falls inside the window anchored at `now`.
    #[must_use]
    pub fn contains<Tz: TimeZone>(&self, timestamp: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        self.window(now)
            .is_none_or(|(start, end)| timestamp >= start && timestamp < end)
    }
}

/// First instant of `date` in `tz`, skipping forward over a DST gap.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    (0..3)
        .find_map(|hour| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(hour)))
                .earliest()
        })
        .map_or_else(
            || Utc.from_utc_datetime(&midnight),
            |local| local.with_timezone(&Utc),
        )
}
