//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`IdentityProvider`]) are implemented by
//! outbound adapters and return typed port errors. Driving ports are
//! implemented by domain services and return the domain [`Error`].
//!
//! [`Error`]: crate::domain::Error

mod macros;
pub(crate) use macros::define_port_error;

mod assignment_command;
mod directory_command;
mod directory_query;
mod directory_repository;
mod identity_provider;
mod login_service;
mod survey_command;
mod survey_response_repository;
mod survey_stats_query;

#[cfg(test)]
pub use assignment_command::MockAssignmentCommand;
pub use assignment_command::{AssignmentCommand, AssignmentOutcome};
#[cfg(test)]
pub use directory_command::MockDirectoryCommand;
pub use directory_command::{DirectoryCommand, NewAccount};
pub use directory_query::DirectoryQuery;
#[cfg(test)]
pub use directory_query::MockDirectoryQuery;
#[cfg(test)]
pub use directory_repository::MockDirectoryRepository;
pub use directory_repository::{DirectoryRepository, DirectoryRepositoryError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use survey_command::MockSurveyCommand;
pub use survey_command::{SurveyCommand, SurveyForm};
#[cfg(test)]
pub use survey_response_repository::MockSurveyResponseRepository;
pub use survey_response_repository::{SurveyResponseRepository, SurveyResponseRepositoryError};
#[cfg(test)]
pub use survey_stats_query::MockSurveyStatsQuery;
pub use survey_stats_query::SurveyStatsQuery;
