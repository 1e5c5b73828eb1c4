//! Driving port for staff login.
//!
//! Inbound adapters call it to turn submitted credentials into the stored
//! [`User`] without knowing which identity provider backs it.

use async_trait::async_trait;

use crate::domain::{Credentials, Error, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and return the matching user profile.
    ///
    /// Unknown credentials and accounts without a profile both yield
    /// `Unauthorized`.
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, Error>;
}
