//! Directory reads and account/OrbPoint lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::port_errors::{
    map_directory_error, map_identity_error, map_survey_response_error,
};
use crate::domain::ports::{
    DirectoryCommand, DirectoryQuery, DirectoryRepository, IdentityProvider,
    IdentityProviderError, NewAccount, SurveyResponseRepository,
};
use crate::domain::{
    Credentials, DirectoryBatch, DirectoryWrite, Error, Operator, OperatorId, OperatorProfile,
    OrbPoint, OrbPointDraft, OrbPointId, Role, SurveyResponse, SurveyResponseId, User, UserId,
    UserProfile, join_profiles,
};

/// Service implementing [`DirectoryQuery`] and [`DirectoryCommand`].
#[derive(Clone)]
pub struct DirectoryService<D, S, I> {
    directory: Arc<D>,
    responses: Arc<S>,
    identity: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<D, S, I> DirectoryService<D, S, I> {
    pub fn new(
        directory: Arc<D>,
        responses: Arc<S>,
        identity: Arc<I>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            responses,
            identity,
            clock,
        }
    }
}

impl<D, S, I> DirectoryService<D, S, I>
where
    D: DirectoryRepository,
    S: SurveyResponseRepository,
    I: IdentityProvider,
{
    async fn profile_for(&self, operator: Operator) -> Result<Option<OperatorProfile>, Error> {
        let user = self
            .directory
            .find_user(&operator.user_data_id)
            .await
            .map_err(map_directory_error)?;
        let Some(user_data) = user else {
            warn!(
                operator_id = %operator.id,
                user_id = %operator.user_data_id,
                "operator has no user profile"
            );
            return Ok(None);
        };
        Ok(Some(OperatorProfile {
            operator,
            user_data,
        }))
    }

    /// Make sure an admin profile exists for `credentials`.
    ///
    /// Returns `false` when an admin with that email is already on file. A
    /// login that already exists without a profile is reused.
    pub async fn bootstrap_admin(
        &self,
        profile: UserProfile,
        credentials: &Credentials,
    ) -> Result<bool, Error> {
        if profile.email != credentials.email() {
            return Err(Error::invalid_request(
                "profile email must match the login email",
            ));
        }
        let admins = self
            .directory
            .list_users(Some(Role::Admin))
            .await
            .map_err(map_directory_error)?;
        if admins.iter().any(|admin| admin.profile.email == profile.email) {
            return Ok(false);
        }

        let user_id = match self.identity.create_account(credentials).await {
            Ok(id) => id,
            Err(IdentityProviderError::EmailTaken { .. }) => self
                .identity
                .authenticate(credentials)
                .await
                .map_err(map_identity_error)?,
            Err(error) => return Err(map_identity_error(error)),
        };
        let admin = User::new(user_id.clone(), profile, Role::Admin, self.clock.utc());
        let mut batch = DirectoryBatch::default();
        batch.push(DirectoryWrite::InsertUser(admin));
        self.directory
            .commit(&batch)
            .await
            .map_err(map_directory_error)?;
        info!(%user_id, "admin account bootstrapped");
        Ok(true)
    }

    /// Undo an issued login after the directory write failed.
    async fn revoke_login(&self, user_id: &UserId) {
        if let Err(error) = self.identity.delete_account(user_id).await {
            warn!(%user_id, %error, "failed to revoke login after directory write failed");
        }
    }
}

#[async_trait]
impl<D, S, I> DirectoryQuery for DirectoryService<D, S, I>
where
    D: DirectoryRepository,
    S: SurveyResponseRepository,
    I: IdentityProvider,
{
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.directory
            .find_user(id)
            .await
            .map_err(map_directory_error)
    }

    async fn get_operator(&self, id: OperatorId) -> Result<Option<OperatorProfile>, Error> {
        let operator = self
            .directory
            .find_operator(id)
            .await
            .map_err(map_directory_error)?;
        match operator {
            Some(operator) => self.profile_for(operator).await,
            None => Ok(None),
        }
    }

    async fn find_operator_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<OperatorProfile>, Error> {
        let operator = self
            .directory
            .find_operator_by_user(user_id)
            .await
            .map_err(map_directory_error)?;
        match operator {
            Some(operator) => self.profile_for(operator).await,
            None => Ok(None),
        }
    }

    async fn list_operators(&self, role: Option<Role>) -> Result<Vec<OperatorProfile>, Error> {
        let users = self
            .directory
            .list_users(role)
            .await
            .map_err(map_directory_error)?;
        let operators = self
            .directory
            .list_operators()
            .await
            .map_err(map_directory_error)?;
        let (profiles, orphans) = join_profiles(operators, users);
        if role.is_none() {
            for orphan in &orphans {
                warn!(operator_id = %orphan.id, "skipping operator without user profile");
            }
        }
        Ok(profiles)
    }

    async fn get_orb_point(&self, id: OrbPointId) -> Result<Option<OrbPoint>, Error> {
        self.directory
            .find_orb_point(id)
            .await
            .map_err(map_directory_error)
    }

    async fn list_orb_points(&self) -> Result<Vec<OrbPoint>, Error> {
        self.directory
            .list_orb_points()
            .await
            .map_err(map_directory_error)
    }

    async fn list_orb_point_promoters(
        &self,
        orb_point_id: OrbPointId,
    ) -> Result<Vec<OperatorProfile>, Error> {
        if self
            .directory
            .find_orb_point(orb_point_id)
            .await
            .map_err(map_directory_error)?
            .is_none()
        {
            return Err(Error::not_found(format!("OrbPoint {orb_point_id} not found")));
        }
        let promoters = self
            .directory
            .list_users(Some(Role::Promoter))
            .await
            .map_err(map_directory_error)?;
        let team: Vec<Operator> = self
            .directory
            .list_operators()
            .await
            .map_err(map_directory_error)?
            .into_iter()
            .filter(|operator| operator.is_bound_to(orb_point_id))
            .collect();
        let (profiles, _) = join_profiles(team, promoters);
        Ok(profiles)
    }

    async fn get_survey_response(
        &self,
        id: SurveyResponseId,
    ) -> Result<Option<SurveyResponse>, Error> {
        self.responses
            .find_by_id(id)
            .await
            .map_err(map_survey_response_error)
    }

    async fn list_survey_responses(
        &self,
        orb_point_id: OrbPointId,
    ) -> Result<Vec<SurveyResponse>, Error> {
        self.responses
            .list_for_orb_point(orb_point_id)
            .await
            .map_err(map_survey_response_error)
    }
}

#[async_trait]
impl<D, S, I> DirectoryCommand for DirectoryService<D, S, I>
where
    D: DirectoryRepository,
    S: SurveyResponseRepository,
    I: IdentityProvider,
{
    async fn create_account(&self, account: NewAccount) -> Result<OperatorProfile, Error> {
        let NewAccount {
            profile,
            credentials,
            role,
        } = account;
        if role == Role::Admin {
            return Err(Error::invalid_request(
                "admin accounts cannot be created through the directory",
            ));
        }
        if profile.email != credentials.email() {
            return Err(Error::invalid_request(
                "profile email must match the login email",
            ));
        }

        let user_id = self
            .identity
            .create_account(&credentials)
            .await
            .map_err(map_identity_error)?;
        let user = User::new(user_id.clone(), profile, role, self.clock.utc());
        let operator = Operator::unbound(user_id.clone());
        let batch: DirectoryBatch = [
            DirectoryWrite::InsertUser(user.clone()),
            DirectoryWrite::InsertOperator(operator.clone()),
        ]
        .into_iter()
        .collect();

        if let Err(error) = self.directory.commit(&batch).await {
            self.revoke_login(&user_id).await;
            return Err(map_directory_error(error));
        }
        info!(%user_id, operator_id = %operator.id, %role, "staff account created");
        Ok(OperatorProfile {
            operator,
            user_data: user,
        })
    }

    async fn create_orb_point(&self, draft: OrbPointDraft) -> Result<OrbPoint, Error> {
        let orb_point = draft.into_orb_point(OrbPointId::random(), self.clock.utc());
        let mut batch = DirectoryBatch::default();
        batch.push(DirectoryWrite::InsertOrbPoint(orb_point.clone()));
        self.directory
            .commit(&batch)
            .await
            .map_err(map_directory_error)?;
        info!(orb_point_id = %orb_point.id, name = %orb_point.name, "OrbPoint created");
        Ok(orb_point)
    }

    async fn delete_orb_point(&self, id: OrbPointId) -> Result<(), Error> {
        self.directory
            .find_orb_point(id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| Error::not_found(format!("OrbPoint {id} not found")))?;
        // Supervisor and promoters alike point back at the OrbPoint.
        let mut batch = DirectoryBatch::default();
        let members = self
            .directory
            .list_operators()
            .await
            .map_err(map_directory_error)?;
        for member in members.iter().filter(|member| member.is_bound_to(id)) {
            batch.link_operator(member.id, Some(id), None);
        }
        batch.push(DirectoryWrite::DeleteOrbPoint(id));
        self.directory
            .commit(&batch)
            .await
            .map_err(map_directory_error)?;
        info!(orb_point_id = %id, "OrbPoint deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "directory_service_tests.rs"]
mod tests;
