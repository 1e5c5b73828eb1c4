//! User profiles and roles.
//!
//! A [`User`] is the profile record stored alongside the identity-provider
//! account. Its id is the account id issued by that provider, so it is an
//! opaque string rather than a UUID.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted length for an identity-provider account id.
pub const USER_ID_MAX: usize = 128;

/// Validation errors returned by user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    IdTooLong { max: usize },
    EmptyField { field: &'static str },
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not contain whitespace"),
            Self::IdTooLong { max } => write!(f, "user id must be at most {max} characters"),
            Self::EmptyField { field } => write!(f, "{field} must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like local@domain"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Identity-provider account id shared by the user profile and its account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use orbsurvey::domain::UserId;
    ///
    /// let id = UserId::new("kX9fQ2").expect("valid id");
    /// assert_eq!(id.as_ref(), "kX9fQ2");
    /// assert!(UserId::new("has space").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidId);
        }
        if id.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role carried by every user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages OrbPoints, staff and statistics.
    Admin,
    /// Supervisor bound to an OrbPoint who submits surveys.
    Operator,
    /// Field promoter who submits surveys.
    Promoter,
}

impl Role {
    /// Stable lowercase name used in storage and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Promoter => "promoter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {value}")]
pub struct ParseRoleError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "operator" => Ok(Self::Operator),
            "promoter" => Ok(Self::Promoter),
            other => Err(ParseRoleError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Personal details captured when an account is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// National document number.
    pub n_doc: String,
    pub firstname: String,
    pub lastname: String,
    /// Lower-cased email address.
    pub email: String,
}

impl UserProfile {
    /// Validate raw form input into a profile.
    ///
    /// Fields are trimmed; the email is lower-cased.
    ///
    /// # Examples
    /// ```
    /// use orbsurvey::domain::UserProfile;
    ///
    /// let profile = UserProfile::try_from_parts("123", "Ana", "Ruiz", " Ana@Example.com ")
    ///     .expect("valid profile");
    /// assert_eq!(profile.email, "ana@example.com");
    /// ```
    pub fn try_from_parts(
        n_doc: &str,
        firstname: &str,
        lastname: &str,
        email: &str,
    ) -> Result<Self, UserValidationError> {
        let n_doc = required(n_doc, "nDoc")?;
        let firstname = required(firstname, "firstname")?;
        let lastname = required(lastname, "lastname")?;
        let email = normalise_email(email)?;
        Ok(Self {
            n_doc,
            firstname,
            lastname,
            email,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, UserValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

/// Trim and lower-case an email, checking for a `local@domain.tld` shape.
pub fn normalise_email(raw: &str) -> Result<String, UserValidationError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(UserValidationError::EmptyField { field: "email" });
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(UserValidationError::InvalidEmail);
    };
    let domain_ok = domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(UserValidationError::InvalidEmail);
    }
    Ok(email)
}

/// Stored user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from an issued account id and a validated profile.
    #[must_use]
    pub fn new(id: UserId, profile: UserProfile, role: Role, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            profile,
            role,
            created_at,
        }
    }

    /// Full display name, `firstname lastname`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.profile.firstname, self.profile.lastname)
    }
}
