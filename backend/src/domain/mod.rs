//! Domain primitives, aggregates and services.
//!
//! Purpose: define the directory (users, operators, OrbPoints), survey
//! responses and the services that keep operator/OrbPoint bindings
//! consistent. Nothing here knows about HTTP or SQL; adapters talk to the
//! domain through [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - Directory records: [`User`], [`Operator`], [`OrbPoint`],
//!   [`SurveyResponse`] and their identifiers.
//! - [`DirectoryBatch`]: atomic multi-record writes.
//! - [`authorize`]: the role policy.
//! - Services: [`AssignmentService`], [`DirectoryService`],
//!   [`SurveyService`], [`IdentityLoginService`].
//! - [`stats`]: pure aggregation over survey responses.

mod assignment_service;
pub mod auth;
mod directory_batch;
mod directory_service;
pub mod error;
mod ids;
mod login_service;
mod operator;
mod orb_point;
mod policy;
mod port_errors;
pub mod ports;
pub mod stats;
mod survey;
mod survey_service;
mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::assignment_service::{AssignmentService, AssignmentSettings};
pub use self::auth::{Credentials, CredentialsValidationError, PASSWORD_MIN_LEN};
pub use self::directory_batch::{DirectoryBatch, DirectoryWrite};
pub use self::directory_service::DirectoryService;
pub use self::error::{Error, ErrorCode};
pub use self::ids::{OperatorId, OrbPointId, SurveyResponseId};
pub use self::login_service::IdentityLoginService;
pub use self::operator::{Operator, OperatorProfile, join_profiles};
pub use self::orb_point::{OrbPoint, OrbPointDraft, OrbPointValidationError, Sector};
pub use self::policy::{Action, Decision, authorize, landing_path};
pub use self::survey::{
    HOW_DID_YOU_HEAR_OPTIONS, INTERESTED_CRYPTO_OPTIONS, SurveyAnswers, SurveyOption,
    SurveyResponse, SurveyValidationError, is_known_option, survey_timestamp,
};
pub use self::survey_service::SurveyService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    ParseRoleError, Role, USER_ID_MAX, User, UserId, UserProfile, UserValidationError,
    normalise_email,
};
