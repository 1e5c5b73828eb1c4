//! Port for survey response persistence.

use async_trait::async_trait;

use crate::domain::{OrbPointId, SurveyResponse, SurveyResponseId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by survey response repository adapters.
    pub enum SurveyResponseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "survey response repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "survey response repository query failed: {message}",
    }
}

/// Append-only store of survey responses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SurveyResponseRepository: Send + Sync {
    async fn insert(&self, response: &SurveyResponse) -> Result<(), SurveyResponseRepositoryError>;

    async fn find_by_id(
        &self,
        id: SurveyResponseId,
    ) -> Result<Option<SurveyResponse>, SurveyResponseRepositoryError>;

    /// Every response recorded at `orb_point_id`, oldest first.
    async fn list_for_orb_point(
        &self,
        orb_point_id: OrbPointId,
    ) -> Result<Vec<SurveyResponse>, SurveyResponseRepositoryError>;
}
