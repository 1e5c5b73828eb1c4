//! Server settings loaded via OrthoConfig from CLI flags, `ORBSURVEY_*`
//! environment variables and configuration files.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use orbsurvey::domain::{AssignmentSettings, Credentials, UserProfile};
use orbsurvey::outbound::identity::HttpIdentitySettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 10;

/// Errors raised while turning raw settings into typed configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid identity provider URL '{value}': {source}")]
    IdentityUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("identity provider URL is set but no API key was given")]
    MissingApiKey,
    #[error("assignment attempts must be at least 1")]
    ZeroAttempts,
    #[error("admin bootstrap needs both an email and a password")]
    IncompleteAdmin,
    #[error("invalid admin bootstrap account: {message}")]
    InvalidAdmin { message: String },
}

/// Raw server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ORBSURVEY")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory adapters are used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: Option<u32>,
    /// Identity provider base URL; accounts stay in memory when absent.
    pub identity_url: Option<String>,
    pub identity_api_key: Option<String>,
    /// Bearer token for account deletion.
    pub identity_service_token: Option<String>,
    /// Clear the OrbPoint side when an operator is unassigned.
    #[ortho_config(default = true)]
    pub clear_reverse_link: bool,
    /// Commit attempts per assignment before reporting a conflict.
    pub assignment_attempts: Option<u8>,
    /// Admin account ensured at startup.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Admin account created at startup when missing.
pub struct AdminBootstrap {
    pub profile: UserProfile,
    pub credentials: Credentials,
}

impl ServerSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn assignment(&self) -> Result<AssignmentSettings, SettingsError> {
        let defaults = AssignmentSettings::default();
        let max_attempts = self.assignment_attempts.unwrap_or(defaults.max_attempts);
        if max_attempts == 0 {
            return Err(SettingsError::ZeroAttempts);
        }
        Ok(AssignmentSettings {
            clear_reverse_link: self.clear_reverse_link,
            max_attempts,
        })
    }

    /// HTTP identity provider settings, or `None` for the in-memory provider.
    pub fn identity(&self) -> Result<Option<HttpIdentitySettings>, SettingsError> {
        let Some(raw) = self.identity_url.as_deref() else {
            return Ok(None);
        };
        let base_url = Url::parse(raw).map_err(|source| SettingsError::IdentityUrl {
            value: raw.to_owned(),
            source,
        })?;
        let api_key = self
            .identity_api_key
            .clone()
            .ok_or(SettingsError::MissingApiKey)?;
        Ok(Some(HttpIdentitySettings {
            base_url,
            api_key,
            service_token: self.identity_service_token.clone(),
            timeout: Duration::from_secs(DEFAULT_IDENTITY_TIMEOUT_SECS),
        }))
    }

    pub fn admin(&self) -> Result<Option<AdminBootstrap>, SettingsError> {
        let (email, password) = match (&self.admin_email, &self.admin_password) {
            (None, None) => return Ok(None),
            (Some(email), Some(password)) => (email, password),
            _ => return Err(SettingsError::IncompleteAdmin),
        };
        let invalid = |message: String| SettingsError::InvalidAdmin { message };
        let profile = UserProfile::try_from_parts("0", "OrbPoint", "Admin", email)
            .map_err(|err| invalid(err.to_string()))?;
        let credentials =
            Credentials::try_from_parts(email, password).map_err(|err| invalid(err.to_string()))?;
        Ok(Some(AdminBootstrap {
            profile,
            credentials,
        }))
    }
}
