//! Admin endpoints for staff accounts and operator/OrbPoint bindings.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::AssignmentOutcome;
use crate::domain::{Action, Error, OperatorId, OperatorProfile, OrbPointId, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::authorize_caller;
use crate::inbound::http::auth::RegisterRequest;
use crate::inbound::http::schemas::{AssignmentOutcomeSchema, ErrorSchema, OperatorProfileSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_id, parse_role, require};

/// Query string of `GET /api/v1/admin/operators`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OperatorListQuery {
    /// Restrict to `admin`, `operator` or `promoter`.
    pub role: Option<String>,
}

/// Staff account created by an admin.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    #[serde(flatten)]
    pub account: RegisterRequest,
    /// `operator` (supervisor) or `promoter`.
    #[schema(example = "promoter")]
    pub role: Option<String>,
}

/// Body of `PUT /api/v1/admin/operators/{id}/assignment`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    #[schema(format = Uuid)]
    pub orb_point_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperatorPath {
    id: String,
}

fn staff_role(raw: Option<String>) -> Result<Role, Error> {
    let raw = require(raw, "role")?;
    match parse_role(&raw, "role")? {
        Role::Admin => Err(Error::invalid_request("admins cannot be created here").with_details(
            serde_json::json!({"field": "role", "value": raw, "code": "invalid_role"}),
        )),
        role => Ok(role),
    }
}

/// List operator profiles, optionally by role.
#[utoipa::path(
    get,
    path = "/api/v1/admin/operators",
    params(OperatorListQuery),
    responses(
        (status = 200, description = "Operator profiles", body = [OperatorProfileSchema]),
        (status = 400, description = "Unknown role", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["operators"],
    operation_id = "listOperators",
    security(("SessionCookie" = []))
)]
#[get("/admin/operators")]
pub async fn list_operators(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OperatorListQuery>,
) -> ApiResult<web::Json<Vec<OperatorProfile>>> {
    authorize_caller(&state, &session, Action::ManageOperators).await?;
    let role = query
        .role
        .as_deref()
        .map(|raw| parse_role(raw, "role"))
        .transpose()?;
    Ok(web::Json(state.directory.list_operators(role).await?))
}

/// Fetch one operator profile.
#[utoipa::path(
    get,
    path = "/api/v1/admin/operators/{id}",
    params(("id" = String, Path, description = "Operator id")),
    responses(
        (status = 200, description = "Operator profile", body = OperatorProfileSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["operators"],
    operation_id = "getOperator",
    security(("SessionCookie" = []))
)]
#[get("/admin/operators/{id}")]
pub async fn get_operator(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OperatorPath>,
) -> ApiResult<web::Json<OperatorProfile>> {
    authorize_caller(&state, &session, Action::ManageOperators).await?;
    let id: OperatorId = parse_id(&path.id, "id")?;
    state
        .directory
        .get_operator(id)
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::not_found(format!("operator {id} not found")))
}

/// Create a supervisor or promoter account.
#[utoipa::path(
    post,
    path = "/api/v1/admin/operators",
    request_body = CreateStaffRequest,
    responses(
        (status = 201, description = "Account created", body = OperatorProfileSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["operators"],
    operation_id = "createOperator",
    security(("SessionCookie" = []))
)]
#[post("/admin/operators")]
pub async fn create_operator(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateStaffRequest>,
) -> ApiResult<HttpResponse> {
    let admin = authorize_caller(&state, &session, Action::ManageOperators).await?;
    let CreateStaffRequest { account, role } = payload.into_inner();
    let role = staff_role(role)?;
    let profile = state
        .directory_command
        .create_account(account.into_account(role)?)
        .await?;
    info!(admin = %admin.id, operator_id = %profile.operator.id, role = role.as_str(), "staff account created");
    Ok(HttpResponse::Created().json(profile))
}

/// Promoters without an OrbPoint.
#[utoipa::path(
    get,
    path = "/api/v1/admin/promoters/unassigned",
    responses(
        (status = 200, description = "Unbound promoters", body = [OperatorProfileSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["operators"],
    operation_id = "listUnassignedPromoters",
    security(("SessionCookie" = []))
)]
#[get("/admin/promoters/unassigned")]
pub async fn list_unassigned_promoters(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OperatorProfile>>> {
    authorize_caller(&state, &session, Action::ManageOperators).await?;
    Ok(web::Json(
        state.assignments.list_promoters_without_orb_point().await?,
    ))
}

/// Bind an operator to an OrbPoint, releasing previous bindings.
#[utoipa::path(
    put,
    path = "/api/v1/admin/operators/{id}/assignment",
    params(("id" = String, Path, description = "Operator id")),
    request_body = AssignmentRequest,
    responses(
        (status = 200, description = "Binding written", body = AssignmentOutcomeSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Operator or OrbPoint not found", body = ErrorSchema),
        (status = 409, description = "Already assigned or concurrent change", body = ErrorSchema)
    ),
    tags = ["operators"],
    operation_id = "assignOperator",
    security(("SessionCookie" = []))
)]
#[put("/admin/operators/{id}/assignment")]
pub async fn assign_operator(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OperatorPath>,
    payload: web::Json<AssignmentRequest>,
) -> ApiResult<web::Json<AssignmentOutcome>> {
    authorize_caller(&state, &session, Action::ManageOperators).await?;
    let operator_id: OperatorId = parse_id(&path.id, "id")?;
    let raw = require(payload.into_inner().orb_point_id, "orbPointId")?;
    let orb_point_id: OrbPointId = parse_id(&raw, "orbPointId")?;
    Ok(web::Json(
        state.assignments.assign(operator_id, orb_point_id).await?,
    ))
}

/// Clear an operator's OrbPoint binding.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/operators/{id}/assignment",
    params(("id" = String, Path, description = "Operator id")),
    responses(
        (status = 204, description = "Binding cleared"),
        (status = 404, description = "Operator not found", body = ErrorSchema),
        (status = 409, description = "Concurrent change", body = ErrorSchema)
    ),
    tags = ["operators"],
    operation_id = "unassignOperator",
    security(("SessionCookie" = []))
)]
#[delete("/admin/operators/{id}/assignment")]
pub async fn unassign_operator(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OperatorPath>,
) -> ApiResult<HttpResponse> {
    authorize_caller(&state, &session, Action::ManageOperators).await?;
    let operator_id: OperatorId = parse_id(&path.id, "id")?;
    state.assignments.unassign(operator_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete an operator with its profile and login.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/operators/{id}",
    params(("id" = String, Path, description = "Operator id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Operator not found", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["operators"],
    operation_id = "deleteOperator",
    security(("SessionCookie" = []))
)]
#[delete("/admin/operators/{id}")]
pub async fn delete_operator(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OperatorPath>,
) -> ApiResult<HttpResponse> {
    let admin = authorize_caller(&state, &session, Action::ManageOperators).await?;
    let operator_id: OperatorId = parse_id(&path.id, "id")?;
    state.assignments.delete_operator(operator_id).await?;
    info!(admin = %admin.id, %operator_id, "operator deleted");
    Ok(HttpResponse::NoContent().finish())
}
