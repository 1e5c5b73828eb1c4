//! Port for the external identity provider holding staff credentials.
//!
//! The provider owns passwords; the directory only stores the account id it
//! hands back, which doubles as the [`UserId`].

use async_trait::async_trait;

use crate::domain::{Credentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider could not be reached.
        Connection { message: String } =>
            "identity provider unreachable: {message}",
        /// The provider answered with an unexpected failure.
        Rejected { message: String } =>
            "identity provider rejected the request: {message}",
        /// Email and password do not match an account.
        InvalidCredentials => "invalid email or password",
        /// An account already exists for the email.
        EmailTaken { email: String } =>
            "an account already exists for {email}",
        /// No account exists for the id.
        AccountNotFound { id: String } =>
            "no identity account for {id}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account and return its id.
    async fn create_account(&self, credentials: &Credentials)
    -> Result<UserId, IdentityProviderError>;

    /// Verify a password and return the matching account id.
    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId, IdentityProviderError>;

    async fn delete_account(&self, id: &UserId) -> Result<(), IdentityProviderError>;
}
