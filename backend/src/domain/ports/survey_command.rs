//! Driving port for the survey form used by operators and promoters.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, OrbPoint, SurveyAnswers, SurveyOption, SurveyResponse, UserId};

/// Everything the survey form needs to render for one operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyForm {
    /// OrbPoint the caller is bound to; its sectors feed "visiting from".
    pub orb_point: OrbPoint,
    pub how_did_you_hear_options: Vec<SurveyOption>,
    pub interested_crypto_options: Vec<SurveyOption>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SurveyCommand: Send + Sync {
    /// Form for the OrbPoint `user_id` is bound to.
    async fn survey_form(&self, user_id: &UserId) -> Result<SurveyForm, Error>;

    /// Validate and record a response at the caller's OrbPoint.
    async fn submit(&self, user_id: &UserId, answers: SurveyAnswers)
    -> Result<SurveyResponse, Error>;
}
