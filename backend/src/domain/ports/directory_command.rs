//! Driving port for directory mutations outside the assignment flow.

use async_trait::async_trait;

use crate::domain::{
    Credentials, Error, OperatorProfile, OrbPoint, OrbPointDraft, OrbPointId, Role, UserProfile,
};

/// Staff account to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub profile: UserProfile,
    pub credentials: Credentials,
    /// `Operator` or `Promoter`; admin accounts are provisioned out of band.
    pub role: Role,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryCommand: Send + Sync {
    /// Issue a login and store the matching user and unbound operator.
    async fn create_account(&self, account: NewAccount) -> Result<OperatorProfile, Error>;

    async fn create_orb_point(&self, draft: OrbPointDraft) -> Result<OrbPoint, Error>;

    /// Delete an OrbPoint, releasing its operator.
    async fn delete_orb_point(&self, id: OrbPointId) -> Result<(), Error>;
}
