//! Admin endpoints for OrbPoints and their survey statistics.
//!
//! ```text
//! GET /api/v1/admin/orb-points
//! POST /api/v1/admin/orb-points {"name":"Plaza Norte","sectors":[...]}
//! GET /api/v1/admin/orb-points/{id}/stats?range=DAY&date=2024-05-01
//! GET /api/v1/admin/orb-points/{id}/promoters
//! POST /api/v1/admin/orb-points/{id}/promoters {"operatorIds":["..."]}
//! GET /api/v1/admin/orb-points/{id}/responses
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::AssignmentOutcome;
use crate::domain::stats::OrbPointStats;
use crate::domain::{
    Action, Error, OperatorId, OperatorProfile, OrbPoint, OrbPointDraft, OrbPointId, Sector,
    SurveyResponse,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::authorize_caller;
use crate::inbound::http::schemas::{
    AssignmentOutcomeSchema, ErrorSchema, OperatorProfileSchema, OrbPointSchema,
    OrbPointStatsSchema, SurveyResponseSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_orb_point_error, parse_id, parse_range, require};

/// One sector of a new OrbPoint.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectorRequest {
    #[schema(example = "Food court")]
    pub sector_name: String,
    #[serde(default)]
    pub sector_type: String,
}

/// Body of `POST /api/v1/admin/orb-points`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrbPointRequest {
    #[schema(example = "Plaza Norte")]
    pub name: Option<String>,
    #[serde(default)]
    pub area_type: String,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub sectors: Vec<SectorRequest>,
    /// Operator to bind straight away.
    #[schema(format = Uuid)]
    pub operator_id: Option<String>,
}

/// Body of `POST /api/v1/admin/orb-points/{id}/promoters`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignPromotersRequest {
    #[serde(default)]
    pub operator_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OrbPointPath {
    id: String,
}

/// Query string of the statistics endpoint.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// One of 1D, DAY, 1W, 1M, 3M, 6M, 1Y, ALL; defaults to ALL.
    pub range: Option<String>,
    /// `YYYY-MM-DD`, required when `range=DAY`.
    pub date: Option<String>,
}

fn draft_from(request: CreateOrbPointRequest) -> Result<(OrbPointDraft, Option<OperatorId>), Error> {
    let name = require(request.name, "name")?;
    let operator_id = request
        .operator_id
        .as_deref()
        .map(|raw| parse_id::<OperatorId>(raw, "operatorId"))
        .transpose()?;
    let sectors = request
        .sectors
        .into_iter()
        .map(|sector| Sector {
            sector_name: sector.sector_name,
            sector_type: sector.sector_type,
        })
        .collect();
    let draft = OrbPointDraft::try_new(
        &name,
        &request.area_type,
        &request.direction,
        &request.region,
        sectors,
    )
    .map_err(map_orb_point_error)?;
    Ok((draft, operator_id))
}

/// List every OrbPoint.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orb-points",
    responses(
        (status = 200, description = "OrbPoints", body = [OrbPointSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["orb-points"],
    operation_id = "listOrbPoints",
    security(("SessionCookie" = []))
)]
#[get("/admin/orb-points")]
pub async fn list_orb_points(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OrbPoint>>> {
    authorize_caller(&state, &session, Action::ManageOrbPoints).await?;
    Ok(web::Json(state.directory.list_orb_points().await?))
}

/// Create an OrbPoint, optionally binding an operator to it.
#[utoipa::path(
    post,
    path = "/api/v1/admin/orb-points",
    request_body = CreateOrbPointRequest,
    responses(
        (status = 201, description = "OrbPoint created", body = OrbPointSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Operator not found", body = ErrorSchema)
    ),
    tags = ["orb-points"],
    operation_id = "createOrbPoint",
    security(("SessionCookie" = []))
)]
#[post("/admin/orb-points")]
pub async fn create_orb_point(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateOrbPointRequest>,
) -> ApiResult<HttpResponse> {
    let admin = authorize_caller(&state, &session, Action::ManageOrbPoints).await?;
    let (draft, operator_id) = draft_from(payload.into_inner())?;

    let mut orb_point = state.directory_command.create_orb_point(draft).await?;
    info!(admin = %admin.id, orb_point_id = %orb_point.id, "OrbPoint created");
    if let Some(operator_id) = operator_id {
        let outcome = state.assignments.assign(operator_id, orb_point.id).await?;
        orb_point.operator_id = Some(outcome.operator_id);
    }
    Ok(HttpResponse::Created().json(orb_point))
}

/// Fetch one OrbPoint.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orb-points/{id}",
    params(("id" = String, Path, description = "OrbPoint id")),
    responses(
        (status = 200, description = "OrbPoint", body = OrbPointSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["orb-points"],
    operation_id = "getOrbPoint",
    security(("SessionCookie" = []))
)]
#[get("/admin/orb-points/{id}")]
pub async fn get_orb_point(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OrbPointPath>,
) -> ApiResult<web::Json<OrbPoint>> {
    authorize_caller(&state, &session, Action::ManageOrbPoints).await?;
    let id: OrbPointId = parse_id(&path.id, "id")?;
    state
        .directory
        .get_orb_point(id)
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::not_found(format!("OrbPoint {id} not found")))
}

/// Delete an OrbPoint, unbinding its operator.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/orb-points/{id}",
    params(("id" = String, Path, description = "OrbPoint id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Concurrent modification", body = ErrorSchema)
    ),
    tags = ["orb-points"],
    operation_id = "deleteOrbPoint",
    security(("SessionCookie" = []))
)]
#[delete("/admin/orb-points/{id}")]
pub async fn delete_orb_point(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OrbPointPath>,
) -> ApiResult<HttpResponse> {
    authorize_caller(&state, &session, Action::ManageOrbPoints).await?;
    let id: OrbPointId = parse_id(&path.id, "id")?;
    state.directory_command.delete_orb_point(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Timeline and answer breakdowns for one OrbPoint.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orb-points/{id}/stats",
    params(("id" = String, Path, description = "OrbPoint id"), StatsQuery),
    responses(
        (status = 200, description = "Statistics", body = OrbPointStatsSchema),
        (status = 400, description = "Invalid range or date", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["orb-points"],
    operation_id = "orbPointStats",
    security(("SessionCookie" = []))
)]
#[get("/admin/orb-points/{id}/stats")]
pub async fn orb_point_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OrbPointPath>,
    query: web::Query<StatsQuery>,
) -> ApiResult<web::Json<OrbPointStats>> {
    authorize_caller(&state, &session, Action::ViewStatistics).await?;
    let id: OrbPointId = parse_id(&path.id, "id")?;
    let selection = parse_range(query.range.as_deref(), query.date.as_deref())?;
    Ok(web::Json(state.stats.orb_point_stats(id, selection).await?))
}

/// Promoters on an OrbPoint's team.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orb-points/{id}/promoters",
    params(("id" = String, Path, description = "OrbPoint id")),
    responses(
        (status = 200, description = "Team members", body = [OperatorProfileSchema]),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["orb-points"],
    operation_id = "listOrbPointPromoters",
    security(("SessionCookie" = []))
)]
#[get("/admin/orb-points/{id}/promoters")]
pub async fn list_orb_point_promoters(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OrbPointPath>,
) -> ApiResult<web::Json<Vec<OperatorProfile>>> {
    authorize_caller(&state, &session, Action::ManageOrbPoints).await?;
    let id: OrbPointId = parse_id(&path.id, "id")?;
    Ok(web::Json(state.directory.list_orb_point_promoters(id).await?))
}

/// Add several promoters to an OrbPoint's team at once.
#[utoipa::path(
    post,
    path = "/api/v1/admin/orb-points/{id}/promoters",
    params(("id" = String, Path, description = "OrbPoint id")),
    request_body = AssignPromotersRequest,
    responses(
        (status = 200, description = "Promoters assigned", body = [AssignmentOutcomeSchema]),
        (status = 400, description = "Invalid request or not a promoter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "OrbPoint or operator not found", body = ErrorSchema),
        (status = 409, description = "Already on the team or concurrent change", body = ErrorSchema)
    ),
    tags = ["orb-points"],
    operation_id = "assignOrbPointPromoters",
    security(("SessionCookie" = []))
)]
#[post("/admin/orb-points/{id}/promoters")]
pub async fn assign_orb_point_promoters(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OrbPointPath>,
    payload: web::Json<AssignPromotersRequest>,
) -> ApiResult<web::Json<Vec<AssignmentOutcome>>> {
    let admin = authorize_caller(&state, &session, Action::ManageOperators).await?;
    let id: OrbPointId = parse_id(&path.id, "id")?;
    let operator_ids = payload
        .into_inner()
        .operator_ids
        .iter()
        .map(|raw| parse_id::<OperatorId>(raw, "operatorIds"))
        .collect::<Result<Vec<_>, _>>()?;
    let outcomes = state.assignments.assign_promoters(id, operator_ids).await?;
    info!(admin = %admin.id, orb_point_id = %id, promoters = outcomes.len(), "team updated");
    Ok(web::Json(outcomes))
}

/// Raw survey responses recorded at an OrbPoint, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orb-points/{id}/responses",
    params(("id" = String, Path, description = "OrbPoint id")),
    responses(
        (status = 200, description = "Survey responses", body = [SurveyResponseSchema]),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["orb-points"],
    operation_id = "listOrbPointResponses",
    security(("SessionCookie" = []))
)]
#[get("/admin/orb-points/{id}/responses")]
pub async fn list_orb_point_responses(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OrbPointPath>,
) -> ApiResult<web::Json<Vec<SurveyResponse>>> {
    authorize_caller(&state, &session, Action::ViewStatistics).await?;
    let id: OrbPointId = parse_id(&path.id, "id")?;
    Ok(web::Json(state.directory.list_survey_responses(id).await?))
}
