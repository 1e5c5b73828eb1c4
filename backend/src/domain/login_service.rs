//! Staff login backed by the identity provider and the directory.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::port_errors::{map_directory_error, map_identity_error};
use crate::domain::ports::{DirectoryRepository, IdentityProvider, LoginService};
use crate::domain::{Credentials, Error, User};

/// [`LoginService`] that verifies passwords with the identity provider and
/// loads the stored profile for the returned account.
#[derive(Clone)]
pub struct IdentityLoginService<I, D> {
    identity: Arc<I>,
    directory: Arc<D>,
}

impl<I, D> IdentityLoginService<I, D> {
    pub fn new(identity: Arc<I>, directory: Arc<D>) -> Self {
        Self {
            identity,
            directory,
        }
    }
}

#[async_trait]
impl<I, D> LoginService for IdentityLoginService<I, D>
where
    I: IdentityProvider,
    D: DirectoryRepository,
{
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, Error> {
        let user_id = self
            .identity
            .authenticate(credentials)
            .await
            .map_err(map_identity_error)?;
        let user = self
            .directory
            .find_user(&user_id)
            .await
            .map_err(map_directory_error)?;
        user.ok_or_else(|| {
            warn!(%user_id, "login succeeded but no user profile exists");
            Error::unauthorized("invalid credentials")
        })
    }
}
