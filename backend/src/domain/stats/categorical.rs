//! Categorical breakdowns of survey answers.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::domain::{SurveyOption, SurveyResponse};

/// Survey field a breakdown is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    HowDidYouHearAbout,
    VisitingFrom,
    /// Multi-select: each distinct selected option counts once per response.
    InterestedCrypto,
}

impl StatField {
    /// Distinct non-empty values this field holds in `response`.
    #[must_use]
    pub fn values(self, response: &SurveyResponse) -> BTreeSet<&str> {
        let raw: Vec<&str> = match self {
            Self::HowDidYouHearAbout => vec![response.how_did_you_hear_about.as_str()],
            Self::VisitingFrom => vec![response.visiting_from.as_str()],
            Self::InterestedCrypto => response
                .interested_crypto
                .iter()
                .map(String::as_str)
                .collect(),
        };
        raw.into_iter().filter(|value| !value.is_empty()).collect()
    }
}

/// One row of a categorical breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    pub text: String,
    pub count: u32,
    /// Share of all responses, `0..=100`. Multi-select rows may sum past 100.
    pub percentage: f64,
}

/// Count answers to `field` across `responses`.
///
/// With `options`, one row per option in catalogue order, keyed by option id
/// and labelled with its text. Without, one row per observed value ordered by
/// count descending then text ascending. Percentages are relative to the
/// number of responses and are `0` when there are none.
///
/// # Examples
/// ```
/// use orbsurvey::domain::HOW_DID_YOU_HEAR_OPTIONS;
/// use orbsurvey::domain::stats::{StatField, categorical_stats};
///
/// let rows = categorical_stats(&[], StatField::HowDidYouHearAbout, Some(HOW_DID_YOU_HEAR_OPTIONS));
/// assert_eq!(rows.len(), HOW_DID_YOU_HEAR_OPTIONS.len());
/// assert!(rows.iter().all(|row| row.count == 0 && row.percentage == 0.0));
/// ```
#[must_use]
pub fn categorical_stats(
    responses: &[SurveyResponse],
    field: StatField,
    options: Option<&[SurveyOption]>,
) -> Vec<CategoryStat> {
    let total = u32::try_from(responses.len()).unwrap_or(u32::MAX);
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for response in responses {
        for value in field.values(response) {
            *counts.entry(value).or_default() += 1;
        }
    }

    if let Some(options) = options {
        return options
            .iter()
            .map(|option| {
                let count = counts.get(option.id).copied().unwrap_or(0);
                CategoryStat {
                    text: option.text.to_owned(),
                    count,
                    percentage: percentage(count, total),
                }
            })
            .collect();
    }

    let mut rows: Vec<CategoryStat> = counts
        .into_iter()
        .map(|(text, count)| CategoryStat {
            text: text.to_owned(),
            count,
            percentage: percentage(count, total),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
    rows
}

fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(count) * 100.0 / f64::from(total)
}
