//! In-memory `IdentityProvider` with salted SHA-256 password digests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Credentials, UserId};

const ACCOUNT_ID_LEN: usize = 28;

#[derive(Debug, Clone)]
struct Account {
    id: UserId,
    salt: [u8; 16],
    digest: String,
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn fresh_account_id() -> Result<UserId, IdentityProviderError> {
    let raw: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ACCOUNT_ID_LEN)
        .map(char::from)
        .collect();
    UserId::new(raw).map_err(|err| IdentityProviderError::rejected(err.to_string()))
}

/// Accounts keyed by normalised email, held in process memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Account>>, IdentityProviderError> {
        self.accounts
            .lock()
            .map_err(|_| IdentityProviderError::rejected("account store lock poisoned"))
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(
        &self,
        credentials: &Credentials,
    ) -> Result<UserId, IdentityProviderError> {
        let mut accounts = self.lock()?;
        if accounts.contains_key(credentials.email()) {
            return Err(IdentityProviderError::email_taken(credentials.email()));
        }
        let salt: [u8; 16] = rand::random();
        let account = Account {
            id: fresh_account_id()?,
            salt,
            digest: digest(&salt, credentials.password()),
        };
        let id = account.id.clone();
        accounts.insert(credentials.email().to_owned(), account);
        Ok(id)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId, IdentityProviderError> {
        let accounts = self.lock()?;
        accounts
            .get(credentials.email())
            .filter(|account| account.digest == digest(&account.salt, credentials.password()))
            .map(|account| account.id.clone())
            .ok_or(IdentityProviderError::InvalidCredentials)
    }

    async fn delete_account(&self, id: &UserId) -> Result<(), IdentityProviderError> {
        let mut accounts = self.lock()?;
        let before = accounts.len();
        accounts.retain(|_, account| &account.id != id);
        if accounts.len() == before {
            return Err(IdentityProviderError::account_not_found(id.as_ref()));
        }
        Ok(())
    }
}
