//! Driving port for directory reads.
//!
//! Lookups return `Ok(None)` for absent records so callers can tell a missing
//! record apart from a failed fetch.

use async_trait::async_trait;

use crate::domain::{
    Error, OperatorId, OperatorProfile, OrbPoint, OrbPointId, Role, SurveyResponse,
    SurveyResponseId, User, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryQuery: Send + Sync {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, Error>;

    async fn get_operator(&self, id: OperatorId) -> Result<Option<OperatorProfile>, Error>;

    /// Operator profile owned by the user `user_id`.
    async fn find_operator_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<OperatorProfile>, Error>;

    /// Operator profiles, optionally restricted to one role.
    async fn list_operators(&self, role: Option<Role>) -> Result<Vec<OperatorProfile>, Error>;

    async fn get_orb_point(&self, id: OrbPointId) -> Result<Option<OrbPoint>, Error>;

    async fn list_orb_points(&self) -> Result<Vec<OrbPoint>, Error>;

    /// Promoters on `orb_point_id`'s team; `NotFound` when the OrbPoint is
    /// missing.
    async fn list_orb_point_promoters(
        &self,
        orb_point_id: OrbPointId,
    ) -> Result<Vec<OperatorProfile>, Error>;

    async fn get_survey_response(
        &self,
        id: SurveyResponseId,
    ) -> Result<Option<SurveyResponse>, Error>;

    async fn list_survey_responses(
        &self,
        orb_point_id: OrbPointId,
    ) -> Result<Vec<SurveyResponse>, Error>;
}
