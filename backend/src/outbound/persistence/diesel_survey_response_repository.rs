//! PostgreSQL-backed `SurveyResponseRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SurveyResponseRepository, SurveyResponseRepositoryError};
use crate::domain::{OperatorId, OrbPointId, SurveyResponse, SurveyResponseId};

use super::error_mapping::{DieselFailure, classify_diesel_error, pool_message};
use super::models::SurveyResponseRow;
use super::pool::{DbPool, PoolError};
use super::schema::survey_responses;

/// Diesel-backed implementation of the `SurveyResponseRepository` port.
#[derive(Clone)]
pub struct DieselSurveyResponseRepository {
    pool: DbPool,
}

impl DieselSurveyResponseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SurveyResponseRepositoryError {
    SurveyResponseRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: DieselError) -> SurveyResponseRepositoryError {
    match classify_diesel_error(&error) {
        DieselFailure::Connection => {
            SurveyResponseRepositoryError::connection("database connection error")
        }
        DieselFailure::UniqueViolation => {
            SurveyResponseRepositoryError::query("survey response already recorded")
        }
        DieselFailure::Query(message) => SurveyResponseRepositoryError::query(message),
    }
}

fn row_to_response(row: SurveyResponseRow) -> SurveyResponse {
    SurveyResponse {
        id: SurveyResponseId::from_uuid(row.id),
        how_did_you_hear_about: row.how_did_you_hear_about,
        visiting_from: row.visiting_from,
        interested_crypto: row.interested_crypto,
        contact_number: row.contact_number,
        operator_id: OperatorId::from_uuid(row.operator_id),
        orb_point_id: OrbPointId::from_uuid(row.orb_point_id),
        timestamp: row.submitted_at,
    }
}

fn response_to_row(response: &SurveyResponse) -> SurveyResponseRow {
    SurveyResponseRow {
        id: *response.id.as_uuid(),
        how_did_you_hear_about: response.how_did_you_hear_about.clone(),
        visiting_from: response.visiting_from.clone(),
        interested_crypto: response.interested_crypto.clone(),
        contact_number: response.contact_number.clone(),
        operator_id: *response.operator_id.as_uuid(),
        orb_point_id: *response.orb_point_id.as_uuid(),
        submitted_at: response.timestamp,
    }
}

#[async_trait]
impl SurveyResponseRepository for DieselSurveyResponseRepository {
    async fn insert(&self, response: &SurveyResponse) -> Result<(), SurveyResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(survey_responses::table)
            .values(&response_to_row(response))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: SurveyResponseId,
    ) -> Result<Option<SurveyResponse>, SurveyResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SurveyResponseRow> = survey_responses::table
            .filter(survey_responses::id.eq(id.as_uuid()))
            .select(SurveyResponseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_response))
    }

    async fn list_for_orb_point(
        &self,
        orb_point_id: OrbPointId,
    ) -> Result<Vec<SurveyResponse>, SurveyResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SurveyResponseRow> = survey_responses::table
            .filter(survey_responses::orb_point_id.eq(orb_point_id.as_uuid()))
            .order(survey_responses::submitted_at.asc())
            .select(SurveyResponseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_response).collect())
    }
}
