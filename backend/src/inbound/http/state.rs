//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AssignmentCommand, DirectoryCommand, DirectoryQuery, LoginService, SurveyCommand,
    SurveyStatsQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub directory: Arc<dyn DirectoryQuery>,
    pub directory_command: Arc<dyn DirectoryCommand>,
    pub assignments: Arc<dyn AssignmentCommand>,
    pub surveys: Arc<dyn SurveyCommand>,
    pub stats: Arc<dyn SurveyStatsQuery>,
}
