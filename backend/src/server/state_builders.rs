//! Adapter selection and service wiring for the HTTP state.
//!
//! A database pool selects the Diesel repositories, otherwise the in-memory
//! ones; configured identity settings select the HTTP provider, otherwise
//! in-memory accounts.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use orbsurvey::domain::ports::{DirectoryRepository, IdentityProvider, SurveyResponseRepository};
use orbsurvey::domain::{
    AssignmentService, AssignmentSettings, DirectoryService, IdentityLoginService, SurveyService,
};
use orbsurvey::inbound::http::state::HttpState;
use orbsurvey::outbound::identity::HttpIdentityProvider;
use orbsurvey::outbound::memory::{
    MemoryDirectoryRepository, MemoryIdentityProvider, MemorySurveyResponseRepository,
};
use orbsurvey::outbound::persistence::{DieselDirectoryRepository, DieselSurveyResponseRepository};

use super::ServerConfig;
use super::settings::AdminBootstrap;

/// Build the handler state for `config`, creating the bootstrap admin if one
/// is configured.
///
/// # Errors
///
/// Fails when the identity client cannot be built or the admin account
/// cannot be ensured.
pub(crate) async fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    match &config.identity {
        Some(settings) => {
            let provider = HttpIdentityProvider::new(settings.clone())
                .map_err(|err| std::io::Error::other(format!("identity client: {err}")))?;
            info!(base_url = %settings.base_url, "using HTTP identity provider");
            with_identity(config, Arc::new(provider)).await
        }
        None => {
            warn!("no identity provider configured; accounts are kept in memory");
            with_identity(config, Arc::new(MemoryIdentityProvider::new())).await
        }
    }
}

async fn with_identity<I>(
    config: &ServerConfig,
    identity: Arc<I>,
) -> std::io::Result<web::Data<HttpState>>
where
    I: IdentityProvider + 'static,
{
    match &config.db_pool {
        Some(pool) => {
            wire(
                Arc::new(DieselDirectoryRepository::new(pool.clone())),
                Arc::new(DieselSurveyResponseRepository::new(pool.clone())),
                identity,
                config.assignment,
                config.admin.as_ref(),
            )
            .await
        }
        None => {
            warn!("no database configured; directory data is kept in memory");
            wire(
                Arc::new(MemoryDirectoryRepository::new()),
                Arc::new(MemorySurveyResponseRepository::new()),
                identity,
                config.assignment,
                config.admin.as_ref(),
            )
            .await
        }
    }
}

async fn wire<D, S, I>(
    directory: Arc<D>,
    responses: Arc<S>,
    identity: Arc<I>,
    assignment: AssignmentSettings,
    admin: Option<&AdminBootstrap>,
) -> std::io::Result<web::Data<HttpState>>
where
    D: DirectoryRepository + 'static,
    S: SurveyResponseRepository + 'static,
    I: IdentityProvider + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let directory_service = Arc::new(DirectoryService::new(
        directory.clone(),
        responses.clone(),
        identity.clone(),
        clock.clone(),
    ));
    if let Some(admin) = admin {
        let created = directory_service
            .bootstrap_admin(admin.profile.clone(), &admin.credentials)
            .await
            .map_err(|err| std::io::Error::other(format!("admin bootstrap: {}", err.message())))?;
        info!(email = %admin.profile.email, created, "admin account ensured");
    }
    let survey_service = Arc::new(SurveyService::new(directory.clone(), responses, clock));

    Ok(web::Data::new(HttpState {
        login: Arc::new(IdentityLoginService::new(identity.clone(), directory.clone())),
        directory: directory_service.clone(),
        directory_command: directory_service,
        assignments: Arc::new(AssignmentService::new(directory, identity, assignment)),
        surveys: survey_service.clone(),
        stats: survey_service,
    }))
}
