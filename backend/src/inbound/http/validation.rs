//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns an `invalid_request` [`Error`] whose `details`
//! carry the offending `field` and a stable `code`.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::stats::{RangeError, RangeOption, RangeSelection};
use crate::domain::{
    CredentialsValidationError, Error, OrbPointValidationError, Role, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidId,
    InvalidDate,
    InvalidRole,
    InvalidRange,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidRole => "invalid_role",
            ErrorCode::InvalidRange => "invalid_range",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

fn value_error(field: &str, code: ErrorCode, value: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: &str) -> Error {
    field_error(field, ErrorCode::MissingField, format!("missing required field: {field}"))
}

/// Unwrap an optional body field or report it as missing.
pub(crate) fn require<T>(value: Option<T>, field: &str) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse a UUID-backed identifier from a path segment.
pub(crate) fn parse_id<T: FromStr>(raw: &str, field: &str) -> Result<T, Error> {
    raw.parse()
        .map_err(|_| value_error(field, ErrorCode::InvalidId, raw, format!("{field} must be a UUID")))
}

pub(crate) fn parse_role(raw: &str, field: &str) -> Result<Role, Error> {
    Role::from_str(raw).map_err(|_| {
        value_error(
            field,
            ErrorCode::InvalidRole,
            raw,
            "role must be one of admin, operator, promoter",
        )
    })
}

/// Resolve the `range` and `date` query parameters of the statistics
/// endpoint. A missing range means `ALL`.
pub(crate) fn parse_range(
    range: Option<&str>,
    date: Option<&str>,
) -> Result<RangeSelection, Error> {
    let option = match range {
        Some(raw) => RangeOption::from_str(raw)
            .map_err(|err| value_error("range", ErrorCode::InvalidRange, raw, err.to_string()))?,
        None => RangeOption::All,
    };
    let selected_date = date
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                value_error("date", ErrorCode::InvalidDate, raw, "date must be YYYY-MM-DD")
            })
        })
        .transpose()?;
    RangeSelection::new(option, selected_date).map_err(|err| match err {
        RangeError::MissingDate => missing_field_error("date"),
        other => field_error("range", ErrorCode::InvalidRange, other.to_string()),
    })
}

pub(crate) fn map_credentials_error(err: CredentialsValidationError) -> Error {
    let field = match err {
        CredentialsValidationError::InvalidEmail => "email",
        CredentialsValidationError::PasswordMismatch => "passwordConfirmation",
        CredentialsValidationError::EmptyPassword
        | CredentialsValidationError::PasswordTooShort { .. } => "password",
    };
    field_error(field, ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn map_profile_error(err: UserValidationError) -> Error {
    let field = match &err {
        UserValidationError::EmptyField { field } => field,
        UserValidationError::InvalidEmail => "email",
        UserValidationError::EmptyId
        | UserValidationError::InvalidId
        | UserValidationError::IdTooLong { .. } => "id",
    };
    field_error(field, ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn map_orb_point_error(err: OrbPointValidationError) -> Error {
    let field = match &err {
        OrbPointValidationError::EmptyName => "name".to_owned(),
        OrbPointValidationError::EmptySectorName { index } => format!("sectors[{index}]"),
        OrbPointValidationError::DuplicateSector { .. } => "sectors".to_owned(),
    };
    field_error(&field, ErrorCode::InvalidValue, err.to_string())
}
