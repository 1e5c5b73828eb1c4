//! Driving port for operator/OrbPoint bindings.
//!
//! An OrbPoint has at most one supervising operator, whose link is written
//! on both sides together, and any number of promoters, whose link lives on
//! the promoter alone. Every operator belongs to at most one OrbPoint.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, OperatorId, OperatorProfile, OrbPointId};

/// Result of a successful [`AssignmentCommand::assign`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub operator_id: OperatorId,
    pub orb_point_id: OrbPointId,
    /// Operator that previously held the OrbPoint and is now unbound.
    pub displaced_operator: Option<OperatorId>,
    /// OrbPoint the operator previously held and has now released.
    pub released_orb_point: Option<OrbPointId>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentCommand: Send + Sync {
    /// Bind `operator_id` to `orb_point_id`, releasing any previous links.
    ///
    /// Promoters join the OrbPoint's team; anyone else takes its supervisor
    /// slot and displaces the previous holder.
    ///
    /// Fails with `AlreadyAssigned` without writing anything when the pair is
    /// already bound, and with `NotFound` when either record is missing.
    async fn assign(
        &self,
        operator_id: OperatorId,
        orb_point_id: OrbPointId,
    ) -> Result<AssignmentOutcome, Error>;

    /// Add several promoters to `orb_point_id`'s team in one batch.
    ///
    /// Duplicate ids are ignored. Nothing is written when any id is missing,
    /// is not a promoter (`InvalidRequest`) or is already on the team
    /// (`AlreadyAssigned`).
    async fn assign_promoters(
        &self,
        orb_point_id: OrbPointId,
        operator_ids: Vec<OperatorId>,
    ) -> Result<Vec<AssignmentOutcome>, Error>;

    /// Clear the operator's OrbPoint link.
    async fn unassign(&self, operator_id: OperatorId) -> Result<(), Error>;

    /// Remove the operator, its profile and its login.
    async fn delete_operator(&self, operator_id: OperatorId) -> Result<(), Error>;

    /// Promoters that are not bound to any OrbPoint.
    async fn list_promoters_without_orb_point(&self) -> Result<Vec<OperatorProfile>, Error>;
}
