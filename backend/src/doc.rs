//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, the
//! domain schema wrappers from [`crate::inbound::http::schemas`] and the
//! session cookie security scheme. Swagger UI serves it in debug builds.

use crate::inbound::http::schemas::{
    AssignmentOutcomeSchema, CategoryStatSchema, ErrorCodeSchema, ErrorSchema,
    OperatorProfileSchema, OrbPointSchema, OrbPointStatsSchema, RoleSchema, SectorSchema,
    SurveyFormSchema, SurveyOptionSchema, SurveyResponseSchema, TimeBucketSchema, UserSchema,
};
use crate::inbound::http::session::SESSION_COOKIE;
use crate::inbound::http::{auth, operators, orb_points, surveys};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE,
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "OrbPoint survey API",
        description = "Staff directory, OrbPoint assignments, survey capture and statistics."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        auth::login,
        auth::logout,
        auth::register,
        auth::me,
        surveys::survey_options,
        surveys::submit_survey,
        surveys::get_survey_response,
        orb_points::list_orb_points,
        orb_points::create_orb_point,
        orb_points::get_orb_point,
        orb_points::delete_orb_point,
        orb_points::orb_point_stats,
        orb_points::list_orb_point_promoters,
        orb_points::assign_orb_point_promoters,
        orb_points::list_orb_point_responses,
        operators::list_operators,
        operators::get_operator,
        operators::create_operator,
        operators::list_unassigned_promoters,
        operators::assign_operator,
        operators::unassign_operator,
        operators::delete_operator,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        UserSchema,
        OperatorProfileSchema,
        SectorSchema,
        OrbPointSchema,
        SurveyOptionSchema,
        SurveyFormSchema,
        SurveyResponseSchema,
        AssignmentOutcomeSchema,
        TimeBucketSchema,
        CategoryStatSchema,
        OrbPointStatsSchema,
    )),
    tags(
        (name = "auth", description = "Login, logout and registration"),
        (name = "surveys", description = "Survey form and submission"),
        (name = "orb-points", description = "OrbPoint management and statistics"),
        (name = "operators", description = "Staff accounts and assignments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
