//! Operator/OrbPoint binding service.
//!
//! Supervisors (every role but promoter) hold an OrbPoint's single
//! `operator_id` slot and both sides of that link move together. Promoters
//! only set their own `orb_point_id`, so any number of them form the
//! OrbPoint's team.
//!
//! Every use-case reads the records it touches, builds one
//! [`DirectoryBatch`] whose link writes carry the values it observed, and
//! commits it. A rejected batch means another writer got there first; the
//! whole step is re-read and retried up to
//! [`AssignmentSettings::max_attempts`] times.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::port_errors::{map_directory_error, map_identity_error};
use crate::domain::ports::{
    AssignmentCommand, AssignmentOutcome, DirectoryRepository, DirectoryRepositoryError,
    IdentityProvider, IdentityProviderError,
};
use crate::domain::{
    DirectoryBatch, DirectoryWrite, Error, Operator, OperatorId, OperatorProfile, OrbPoint,
    OrbPointId, Role, join_profiles,
};

/// Behavioural switches for [`AssignmentService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentSettings {
    /// Clear the OrbPoint side when an operator is unassigned.
    pub clear_reverse_link: bool,
    /// Commit attempts per call before giving up with `Conflict`.
    pub max_attempts: u8,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            clear_reverse_link: true,
            max_attempts: 3,
        }
    }
}

/// One pass of a read-then-commit step.
enum Attempt<T> {
    Committed(T),
    Conflicted(String),
}

/// Service implementing [`AssignmentCommand`].
#[derive(Clone)]
pub struct AssignmentService<D, I> {
    directory: Arc<D>,
    identity: Arc<I>,
    settings: AssignmentSettings,
}

impl<D, I> AssignmentService<D, I> {
    pub fn new(directory: Arc<D>, identity: Arc<I>, settings: AssignmentSettings) -> Self {
        Self {
            directory,
            identity,
            settings,
        }
    }
}

impl<D, I> AssignmentService<D, I>
where
    D: DirectoryRepository,
    I: IdentityProvider,
{
    async fn with_retries<T, F, Fut>(&self, operation: &'static str, mut step: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>, Error>>,
    {
        let attempts = self.settings.max_attempts.max(1);
        let mut last = String::new();
        for attempt in 1..=attempts {
            match step().await? {
                Attempt::Committed(value) => return Ok(value),
                Attempt::Conflicted(message) => {
                    warn!(operation, attempt, %message, "directory batch conflicted; retrying");
                    last = message;
                }
            }
        }
        Err(Error::conflict(format!(
            "{operation} gave up after {attempts} attempts: {last}"
        )))
    }

    async fn commit(&self, batch: &DirectoryBatch) -> Result<Attempt<()>, Error> {
        match self.directory.commit(batch).await {
            Ok(()) => Ok(Attempt::Committed(())),
            Err(DirectoryRepositoryError::Conflict { message }) => Ok(Attempt::Conflicted(message)),
            Err(other) => Err(map_directory_error(other)),
        }
    }

    async fn load_operator(&self, id: OperatorId) -> Result<Operator, Error> {
        self.directory
            .find_operator(id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| Error::not_found(format!("operator {id} not found")))
    }

    async fn load_orb_point(&self, id: OrbPointId) -> Result<OrbPoint, Error> {
        self.directory
            .find_orb_point(id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| Error::not_found(format!("OrbPoint {id} not found")))
    }

    async fn load_role(&self, operator: &Operator) -> Result<Role, Error> {
        self.directory
            .find_user(&operator.user_data_id)
            .await
            .map_err(map_directory_error)?
            .map(|user| user.role)
            .ok_or_else(|| {
                Error::not_found(format!("operator {} has no user profile", operator.id))
            })
    }

    /// OrbPoint whose supervisor slot still names `operator_id`. The
    /// operator's own link may already be clear.
    async fn held_orb_point(&self, operator_id: OperatorId) -> Result<Option<OrbPoint>, Error> {
        self.directory
            .find_orb_point_by_operator(operator_id)
            .await
            .map_err(map_directory_error)
    }

    /// Queue clearing `operator_id`'s OrbPoint link if it still names
    /// `orb_point_id`.
    async fn release_operator(
        &self,
        batch: &mut DirectoryBatch,
        operator_id: OperatorId,
        orb_point_id: OrbPointId,
    ) -> Result<bool, Error> {
        let operator = self
            .directory
            .find_operator(operator_id)
            .await
            .map_err(map_directory_error)?;
        let bound = operator.is_some_and(|operator| operator.is_bound_to(orb_point_id));
        if bound {
            batch.link_operator(operator_id, Some(orb_point_id), None);
        }
        Ok(bound)
    }

    /// Queue moving a promoter onto `orb_point_id`'s team. Returns the team
    /// it left, if any.
    async fn join_team(
        &self,
        batch: &mut DirectoryBatch,
        operator: &Operator,
        orb_point_id: OrbPointId,
    ) -> Result<Option<OrbPointId>, Error> {
        let mut released = operator.orb_point_id;
        if let Some(held) = self.held_orb_point(operator.id).await? {
            batch.link_orb_point(held.id, Some(operator.id), None);
            released = released.or(Some(held.id));
        }
        batch.link_operator(operator.id, operator.orb_point_id, Some(orb_point_id));
        Ok(released)
    }

    /// Queue making `operator` the supervisor of `orb_point`.
    async fn take_slot(
        &self,
        batch: &mut DirectoryBatch,
        operator: &Operator,
        orb_point: &OrbPoint,
    ) -> Result<(Option<OperatorId>, Option<OrbPointId>), Error> {
        let mut displaced = None;
        if let Some(previous) = orb_point.operator_id.filter(|id| *id != operator.id) {
            if self.release_operator(batch, previous, orb_point.id).await? {
                displaced = Some(previous);
            }
        }
        let mut released = None;
        let held = self.held_orb_point(operator.id).await?;
        if let Some(held) = held.filter(|held| held.id != orb_point.id) {
            batch.link_orb_point(held.id, Some(operator.id), None);
            released = Some(held.id);
        }
        batch.link_operator(operator.id, operator.orb_point_id, Some(orb_point.id));
        batch.link_orb_point(orb_point.id, orb_point.operator_id, Some(operator.id));
        Ok((displaced, released))
    }

    async fn try_assign(
        &self,
        operator_id: OperatorId,
        orb_point_id: OrbPointId,
    ) -> Result<Attempt<AssignmentOutcome>, Error> {
        let operator = self.load_operator(operator_id).await?;
        let orb_point = self.load_orb_point(orb_point_id).await?;
        let role = self.load_role(&operator).await?;
        if operator.is_bound_to(orb_point_id) {
            return Err(Error::already_assigned(format!(
                "operator {operator_id} is already assigned to OrbPoint {orb_point_id}"
            )));
        }

        let mut batch = DirectoryBatch::default();
        let (displaced_operator, released_orb_point) = if role == Role::Promoter {
            (None, self.join_team(&mut batch, &operator, orb_point_id).await?)
        } else {
            self.take_slot(&mut batch, &operator, &orb_point).await?
        };

        Ok(match self.commit(&batch).await? {
            Attempt::Committed(()) => Attempt::Committed(AssignmentOutcome {
                operator_id,
                orb_point_id,
                displaced_operator,
                released_orb_point,
            }),
            Attempt::Conflicted(message) => Attempt::Conflicted(message),
        })
    }

    async fn try_assign_promoters(
        &self,
        orb_point_id: OrbPointId,
        operator_ids: &[OperatorId],
    ) -> Result<Attempt<Vec<AssignmentOutcome>>, Error> {
        self.load_orb_point(orb_point_id).await?;
        let mut batch = DirectoryBatch::default();
        let mut outcomes = Vec::with_capacity(operator_ids.len());
        for &operator_id in operator_ids {
            let operator = self.load_operator(operator_id).await?;
            if self.load_role(&operator).await? != Role::Promoter {
                return Err(Error::invalid_request(format!(
                    "operator {operator_id} is not a promoter"
                ))
                .with_details(json!({ "operatorId": operator_id })));
            }
            if operator.is_bound_to(orb_point_id) {
                return Err(Error::already_assigned(format!(
                    "promoter {operator_id} is already on OrbPoint {orb_point_id}"
                ))
                .with_details(json!({ "operatorId": operator_id })));
            }
            let released_orb_point = self.join_team(&mut batch, &operator, orb_point_id).await?;
            outcomes.push(AssignmentOutcome {
                operator_id,
                orb_point_id,
                displaced_operator: None,
                released_orb_point,
            });
        }
        Ok(match self.commit(&batch).await? {
            Attempt::Committed(()) => Attempt::Committed(outcomes),
            Attempt::Conflicted(message) => Attempt::Conflicted(message),
        })
    }

    async fn try_unassign(&self, operator_id: OperatorId) -> Result<Attempt<()>, Error> {
        let operator = self.load_operator(operator_id).await?;
        let mut batch = DirectoryBatch::default();
        if let Some(orb_point_id) = operator.orb_point_id {
            batch.link_operator(operator_id, Some(orb_point_id), None);
        }
        if self.settings.clear_reverse_link {
            if let Some(held) = self.held_orb_point(operator_id).await? {
                batch.link_orb_point(held.id, Some(operator_id), None);
            }
        }
        if batch.is_empty() {
            return Ok(Attempt::Committed(()));
        }
        self.commit(&batch).await
    }

    async fn try_delete(&self, operator_id: OperatorId) -> Result<Attempt<Operator>, Error> {
        let operator = self.load_operator(operator_id).await?;
        let mut batch = DirectoryBatch::default();
        if let Some(held) = self.held_orb_point(operator_id).await? {
            batch.link_orb_point(held.id, Some(operator_id), None);
        }
        batch.push(DirectoryWrite::DeleteOperator(operator_id));
        let profile = self
            .directory
            .find_user(&operator.user_data_id)
            .await
            .map_err(map_directory_error)?;
        if profile.is_some() {
            batch.push(DirectoryWrite::DeleteUser(operator.user_data_id.clone()));
        }
        Ok(match self.commit(&batch).await? {
            Attempt::Committed(()) => Attempt::Committed(operator),
            Attempt::Conflicted(message) => Attempt::Conflicted(message),
        })
    }
}

#[async_trait]
impl<D, I> AssignmentCommand for AssignmentService<D, I>
where
    D: DirectoryRepository,
    I: IdentityProvider,
{
    async fn assign(
        &self,
        operator_id: OperatorId,
        orb_point_id: OrbPointId,
    ) -> Result<AssignmentOutcome, Error> {
        let outcome = self
            .with_retries("assign", || self.try_assign(operator_id, orb_point_id))
            .await?;
        info!(
            %operator_id,
            %orb_point_id,
            displaced = ?outcome.displaced_operator,
            released = ?outcome.released_orb_point,
            "operator assigned"
        );
        Ok(outcome)
    }

    async fn assign_promoters(
        &self,
        orb_point_id: OrbPointId,
        operator_ids: Vec<OperatorId>,
    ) -> Result<Vec<AssignmentOutcome>, Error> {
        let mut unique = Vec::with_capacity(operator_ids.len());
        for id in operator_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            return Err(Error::invalid_request("at least one operator id is required"));
        }
        let outcomes = self
            .with_retries("assign promoters", || {
                self.try_assign_promoters(orb_point_id, &unique)
            })
            .await?;
        info!(%orb_point_id, promoters = outcomes.len(), "promoters assigned");
        Ok(outcomes)
    }

    async fn unassign(&self, operator_id: OperatorId) -> Result<(), Error> {
        self.with_retries("unassign", || self.try_unassign(operator_id))
            .await?;
        info!(%operator_id, "operator unassigned");
        Ok(())
    }

    async fn delete_operator(&self, operator_id: OperatorId) -> Result<(), Error> {
        let operator = self
            .with_retries("delete operator", || self.try_delete(operator_id))
            .await?;
        match self.identity.delete_account(&operator.user_data_id).await {
            Ok(()) => {}
            Err(IdentityProviderError::AccountNotFound { id }) => {
                warn!(%operator_id, account = %id, "operator had no login to delete");
            }
            Err(other) => return Err(map_identity_error(other)),
        }
        info!(%operator_id, user_id = %operator.user_data_id, "operator deleted");
        Ok(())
    }

    async fn list_promoters_without_orb_point(&self) -> Result<Vec<OperatorProfile>, Error> {
        let promoters = self
            .directory
            .list_users(Some(Role::Promoter))
            .await
            .map_err(map_directory_error)?;
        let unbound: Vec<Operator> = self
            .directory
            .list_operators()
            .await
            .map_err(map_directory_error)?
            .into_iter()
            .filter(|operator| operator.orb_point_id.is_none())
            .collect();
        let (profiles, _) = join_profiles(unbound, promoters);
        Ok(profiles)
    }
}

#[cfg(test)]
#[path = "assignment_service_tests.rs"]
mod tests;
