//! Time-series bucketing of survey responses.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use serde::Serialize;

use super::range::RangeSelection;
use crate::domain::SurveyResponse;

/// Number of hourly slots in the `1D` and `DAY` views.
pub const HOURLY_SLOTS: usize = 24;

/// One point on the response timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    /// `HH:00` for hourly views, `YYYY-MM-DD` for daily views.
    pub label: String,
    pub count: u32,
}

/// Bucket `responses` for `selection`, using `now`'s time zone for labels and
/// calendar days.
///
/// Hourly views always yield [`HOURLY_SLOTS`] entries. Daily views list only
/// days that have responses, in ascending order.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use orbsurvey::domain::stats::{RangeSelection, bucket};
///
/// let buckets = bucket(&[], &RangeSelection::Last24Hours, &Utc::now());
/// assert_eq!(buckets.len(), 24);
/// assert!(bucket(&[], &RangeSelection::All, &Utc::now()).is_empty());
/// ```
#[must_use]
pub fn bucket<Tz>(
    responses: &[SurveyResponse],
    selection: &RangeSelection,
    now: &DateTime<Tz>,
) -> Vec<TimeBucket>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match selection {
        RangeSelection::Last24Hours => rolling_hours(responses, now),
        RangeSelection::Day(date) => day_hours(responses, *date, now),
        RangeSelection::Trailing { .. } | RangeSelection::All => {
            daily(responses, selection, now)
        }
    }
}

fn rolling_hours<Tz>(responses: &[SurveyResponse], now: &DateTime<Tz>) -> Vec<TimeBucket>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let end = now.with_timezone(&Utc);
    let start = end - TimeDelta::hours(24);
    let mut counts = [0_u32; HOURLY_SLOTS];
    for response in responses {
        let ts = response.timestamp;
        if ts < start || ts > end {
            continue;
        }
        let index = usize::try_from((ts - start).num_hours())
            .unwrap_or(0)
            .min(HOURLY_SLOTS - 1);
        if let Some(slot) = counts.get_mut(index) {
            *slot += 1;
        }
    }
    labelled_hours(&counts, start, &tz)
}

fn day_hours<Tz>(
    responses: &[SurveyResponse],
    date: NaiveDate,
    now: &DateTime<Tz>,
) -> Vec<TimeBucket>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let selection = RangeSelection::Day(date);
    let Some((start, _)) = selection.window(now) else {
        return Vec::new();
    };
    let mut counts = [0_u32; HOURLY_SLOTS];
    for response in responses {
        if !selection.contains(response.timestamp, now) {
            continue;
        }
        // Elapsed hours, not the wall clock, so a repeated hour on a
        // fall-back day lands in its own slot and the 25th hour folds into
        // the last one.
        let index = usize::try_from((response.timestamp - start).num_hours())
            .unwrap_or(0)
            .min(HOURLY_SLOTS - 1);
        if let Some(slot) = counts.get_mut(index) {
            *slot += 1;
        }
    }
    labelled_hours(&counts, start, &now.timezone())
}

/// Label each hourly slot with the local hour it starts at.
fn labelled_hours<Tz>(counts: &[u32], start: DateTime<Utc>, tz: &Tz) -> Vec<TimeBucket>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    counts
        .iter()
        .zip(0_i64..)
        .map(|(count, hour)| TimeBucket {
            label: (start + TimeDelta::hours(hour))
                .with_timezone(tz)
                .format("%H:00")
                .to_string(),
            count: *count,
        })
        .collect()
}

fn daily<Tz>(
    responses: &[SurveyResponse],
    selection: &RangeSelection,
    now: &DateTime<Tz>,
) -> Vec<TimeBucket>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for response in responses {
        if !selection.contains(response.timestamp, now) {
            continue;
        }
        let day = response.timestamp.with_timezone(&tz).date_naive();
        *per_day.entry(day).or_default() += 1;
    }
    per_day
        .into_iter()
        .map(|(day, count)| TimeBucket {
            label: day.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
#[path = "timeline_tests.rs"]
mod tests;
