//! Survey submission and per-OrbPoint statistics.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::port_errors::{map_directory_error, map_survey_response_error};
use crate::domain::ports::{
    DirectoryRepository, SurveyCommand, SurveyForm, SurveyResponseRepository, SurveyStatsQuery,
};
use crate::domain::stats::{self, OrbPointStats, RangeSelection};
use crate::domain::{
    Error, HOW_DID_YOU_HEAR_OPTIONS, INTERESTED_CRYPTO_OPTIONS, Operator, OrbPoint, OrbPointId,
    SurveyAnswers, SurveyResponse, SurveyResponseId, UserId,
};

/// Service implementing [`SurveyCommand`] and [`SurveyStatsQuery`].
#[derive(Clone)]
pub struct SurveyService<D, S> {
    directory: Arc<D>,
    responses: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<D, S> SurveyService<D, S> {
    pub fn new(directory: Arc<D>, responses: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            responses,
            clock,
        }
    }
}

impl<D, S> SurveyService<D, S>
where
    D: DirectoryRepository,
    S: SurveyResponseRepository,
{
    /// Operator record and OrbPoint the user currently collects at.
    async fn station(&self, user_id: &UserId) -> Result<(Operator, OrbPoint), Error> {
        let operator = self
            .directory
            .find_operator_by_user(user_id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| Error::invalid_request("no operator record for this account"))?;
        let orb_point_id = operator
            .orb_point_id
            .ok_or_else(|| Error::invalid_request("operator is not assigned to an OrbPoint"))?;
        let orb_point = self
            .directory
            .find_orb_point(orb_point_id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| {
                Error::invalid_request(format!("assigned OrbPoint {orb_point_id} no longer exists"))
            })?;
        Ok((operator, orb_point))
    }
}

/// Drop repeated selections, keeping first-seen order.
fn distinct(values: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[async_trait]
impl<D, S> SurveyCommand for SurveyService<D, S>
where
    D: DirectoryRepository,
    S: SurveyResponseRepository,
{
    async fn survey_form(&self, user_id: &UserId) -> Result<SurveyForm, Error> {
        let (_, orb_point) = self.station(user_id).await?;
        Ok(SurveyForm {
            orb_point,
            how_did_you_hear_options: HOW_DID_YOU_HEAR_OPTIONS.to_vec(),
            interested_crypto_options: INTERESTED_CRYPTO_OPTIONS.to_vec(),
        })
    }

    async fn submit(
        &self,
        user_id: &UserId,
        answers: SurveyAnswers,
    ) -> Result<SurveyResponse, Error> {
        let (operator, orb_point) = self.station(user_id).await?;
        answers
            .validate(|sector| orb_point.has_sector(sector))
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let response = SurveyResponse {
            id: SurveyResponseId::random(),
            how_did_you_hear_about: answers.how_did_you_hear_about,
            visiting_from: answers.visiting_from,
            interested_crypto: distinct(answers.interested_crypto),
            contact_number: answers.contact_number.trim().to_owned(),
            operator_id: operator.id,
            orb_point_id: orb_point.id,
            timestamp: self.clock.utc(),
        };
        self.responses
            .insert(&response)
            .await
            .map_err(map_survey_response_error)?;
        info!(
            response_id = %response.id,
            orb_point_id = %response.orb_point_id,
            operator_id = %response.operator_id,
            "survey response recorded"
        );
        Ok(response)
    }
}

#[async_trait]
impl<D, S> SurveyStatsQuery for SurveyService<D, S>
where
    D: DirectoryRepository,
    S: SurveyResponseRepository,
{
    async fn orb_point_stats(
        &self,
        orb_point_id: OrbPointId,
        selection: RangeSelection,
    ) -> Result<OrbPointStats, Error> {
        let orb_point = self
            .directory
            .find_orb_point(orb_point_id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| Error::not_found(format!("OrbPoint {orb_point_id} not found")))?;
        let responses = self
            .responses
            .list_for_orb_point(orb_point_id)
            .await
            .map_err(map_survey_response_error)?;
        Ok(stats::summarise(
            orb_point,
            &responses,
            &selection,
            &self.clock.local(),
        ))
    }
}

#[cfg(test)]
#[path = "survey_service_tests.rs"]
mod tests;
