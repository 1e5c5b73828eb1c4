//! Translation of driven-port errors into the domain [`Error`].

use super::Error;
use super::ports::{DirectoryRepositoryError, IdentityProviderError, SurveyResponseRepositoryError};

pub(crate) fn map_directory_error(error: DirectoryRepositoryError) -> Error {
    match error {
        DirectoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("directory store unavailable: {message}"))
        }
        DirectoryRepositoryError::Query { message } => {
            Error::internal(format!("directory store error: {message}"))
        }
        DirectoryRepositoryError::Conflict { message } => {
            Error::conflict(format!("concurrent directory update: {message}"))
        }
        DirectoryRepositoryError::InvalidRole { value } => {
            Error::invalid_role(format!("stored role is not recognised: {value}"))
        }
    }
}

pub(crate) fn map_survey_response_error(error: SurveyResponseRepositoryError) -> Error {
    match error {
        SurveyResponseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("survey store unavailable: {message}"))
        }
        SurveyResponseRepositoryError::Query { message } => {
            Error::internal(format!("survey store error: {message}"))
        }
    }
}

pub(crate) fn map_identity_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::Connection { message } => {
            Error::service_unavailable(format!("identity provider unavailable: {message}"))
        }
        IdentityProviderError::Rejected { message } => {
            Error::internal(format!("identity provider error: {message}"))
        }
        IdentityProviderError::InvalidCredentials => Error::unauthorized("invalid credentials"),
        IdentityProviderError::EmailTaken { email } => {
            Error::conflict(format!("an account already exists for {email}"))
        }
        IdentityProviderError::AccountNotFound { id } => {
            Error::not_found(format!("no login exists for {id}"))
        }
    }
}
