//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use orbsurvey::domain::AssignmentSettings;
use orbsurvey::outbound::identity::HttpIdentitySettings;
use orbsurvey::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use super::settings::AdminBootstrap;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) identity: Option<HttpIdentitySettings>,
    pub(crate) assignment: AssignmentSettings,
    pub(crate) admin: Option<AdminBootstrap>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory adapters.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            identity: None,
            assignment: AssignmentSettings::default(),
            admin: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database pool; the Diesel repositories replace the
    /// in-memory ones.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Use the HTTP identity provider instead of in-memory accounts.
    #[must_use]
    pub fn with_identity(mut self, identity: Option<HttpIdentitySettings>) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn with_assignment(mut self, assignment: AssignmentSettings) -> Self {
        self.assignment = assignment;
        self
    }

    /// Ensure this admin account exists before serving.
    #[must_use]
    pub fn with_admin(mut self, admin: Option<AdminBootstrap>) -> Self {
        self.admin = admin;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
