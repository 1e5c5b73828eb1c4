//! Survey aggregation: time-series buckets and categorical breakdowns.
//!
//! Everything here is a pure function of the responses, the selected range
//! and the caller-supplied `now`; services own the clock.

mod categorical;
mod range;
mod timeline;

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

pub use categorical::{CategoryStat, StatField, categorical_stats};
pub use range::{RangeError, RangeOption, RangeSelection};
pub use timeline::{HOURLY_SLOTS, TimeBucket, bucket};

use super::{HOW_DID_YOU_HEAR_OPTIONS, INTERESTED_CRYPTO_OPTIONS, OrbPoint, SurveyResponse};

/// Aggregated statistics for one OrbPoint over one range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbPointStats {
    pub orb_point: OrbPoint,
    /// Responses inside the range.
    pub total_responses: u32,
    pub timeline: Vec<TimeBucket>,
    pub how_did_you_hear_about: Vec<CategoryStat>,
    pub visiting_from: Vec<CategoryStat>,
    pub interested_crypto: Vec<CategoryStat>,
}

/// Build the full statistics view for `orb_point`.
///
/// Categorical breakdowns see the same responses as the timeline, so `ALL`
/// is unfiltered in both.
#[must_use]
pub fn summarise<Tz>(
    orb_point: OrbPoint,
    responses: &[SurveyResponse],
    selection: &RangeSelection,
    now: &DateTime<Tz>,
) -> OrbPointStats
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let in_range: Vec<SurveyResponse> = responses
        .iter()
        .filter(|response| selection.contains(response.timestamp, now))
        .cloned()
        .collect();
    OrbPointStats {
        orb_point,
        total_responses: u32::try_from(in_range.len()).unwrap_or(u32::MAX),
        timeline: bucket(&in_range, selection, now),
        how_did_you_hear_about: categorical_stats(
            &in_range,
            StatField::HowDidYouHearAbout,
            Some(HOW_DID_YOU_HEAR_OPTIONS),
        ),
        visiting_from: categorical_stats(&in_range, StatField::VisitingFrom, None),
        interested_crypto: categorical_stats(
            &in_range,
            StatField::InterestedCrypto,
            Some(INTERESTED_CRYPTO_OPTIONS),
        ),
    }
}
