//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of `utoipa`; the wrappers here mirror their JSON
//! shape and register under the domain type's name.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The operator is already bound to the requested OrbPoint.
    #[schema(rename = "already_assigned")]
    AlreadyAssigned,
    /// A stored user carries an unknown role.
    #[schema(rename = "invalid_role")]
    InvalidRole,
    /// A concurrent change invalidated the request.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "Something went wrong")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "6f1c2d8e-3b4a-4c5d-9e8f-0a1b2c3d4e5f")]
    trace_id: Option<String>,
    /// Field-level detail such as `{"field": "email", "code": "invalid_value"}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role, rename_all = "lowercase")]
pub enum RoleSchema {
    Admin,
    Operator,
    Promoter,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserSchema {
    /// Identity-provider account id.
    #[schema(example = "kX9fQ2aBcD4eF6gH8iJ0kL2mN4oP")]
    id: String,
    /// National document number.
    n_doc: String,
    #[schema(example = "Ana")]
    firstname: String,
    #[schema(example = "Ruiz")]
    lastname: String,
    #[schema(example = "ana@example.com")]
    email: String,
    role: RoleSchema,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::OperatorProfile`]: the operator
/// record with its user profile.
#[derive(ToSchema)]
#[schema(as = crate::domain::OperatorProfile, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct OperatorProfileSchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(format = Uuid)]
    orb_point_id: Option<String>,
    user_data_id: String,
    user_data: UserSchema,
}

/// OpenAPI schema for [`crate::domain::Sector`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Sector, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct SectorSchema {
    #[schema(example = "Food court")]
    sector_name: String,
    #[schema(example = "zone")]
    sector_type: String,
}

/// OpenAPI schema for [`crate::domain::OrbPoint`].
#[derive(ToSchema)]
#[schema(as = crate::domain::OrbPoint, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct OrbPointSchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(example = "Plaza Norte")]
    name: String,
    area_type: String,
    direction: String,
    region: String,
    sectors: Vec<SectorSchema>,
    /// Bound operator, if any.
    #[schema(format = Uuid)]
    operator_id: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::SurveyOption`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SurveyOption)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct SurveyOptionSchema {
    #[schema(example = "1")]
    id: String,
    #[schema(example = "Redes sociales")]
    text: String,
}

/// OpenAPI schema for [`crate::domain::ports::SurveyForm`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::SurveyForm, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct SurveyFormSchema {
    orb_point: OrbPointSchema,
    how_did_you_hear_options: Vec<SurveyOptionSchema>,
    interested_crypto_options: Vec<SurveyOptionSchema>,
}

/// OpenAPI schema for [`crate::domain::SurveyResponse`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SurveyResponse, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct SurveyResponseSchema {
    #[schema(format = Uuid)]
    id: String,
    how_did_you_hear_about: String,
    visiting_from: String,
    interested_crypto: Vec<String>,
    contact_number: String,
    #[schema(format = Uuid)]
    operator_id: String,
    #[schema(format = Uuid)]
    orb_point_id: String,
    #[schema(value_type = String, format = DateTime)]
    timestamp: String,
}

/// OpenAPI schema for [`crate::domain::ports::AssignmentOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::AssignmentOutcome, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct AssignmentOutcomeSchema {
    #[schema(format = Uuid)]
    operator_id: String,
    #[schema(format = Uuid)]
    orb_point_id: String,
    /// Operator that lost the OrbPoint.
    #[schema(format = Uuid)]
    displaced_operator: Option<String>,
    /// OrbPoint the operator left.
    #[schema(format = Uuid)]
    released_orb_point: Option<String>,
}

/// OpenAPI schema for [`crate::domain::stats::TimeBucket`].
#[derive(ToSchema)]
#[schema(as = crate::domain::stats::TimeBucket)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct TimeBucketSchema {
    /// `HH:00` for hourly ranges, `YYYY-MM-DD` otherwise.
    #[schema(example = "14:00")]
    label: String,
    count: u32,
}

/// OpenAPI schema for [`crate::domain::stats::CategoryStat`].
#[derive(ToSchema)]
#[schema(as = crate::domain::stats::CategoryStat)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct CategoryStatSchema {
    text: String,
    count: u32,
    #[schema(example = 42.5)]
    percentage: f64,
}

/// OpenAPI schema for [`crate::domain::stats::OrbPointStats`].
#[derive(ToSchema)]
#[schema(as = crate::domain::stats::OrbPointStats, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct OrbPointStatsSchema {
    orb_point: OrbPointSchema,
    total_responses: u32,
    timeline: Vec<TimeBucketSchema>,
    how_did_you_hear_about: Vec<CategoryStatSchema>,
    visiting_from: Vec<CategoryStatSchema>,
    interested_crypto: Vec<CategoryStatSchema>,
}
