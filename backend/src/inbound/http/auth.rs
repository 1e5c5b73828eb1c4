//! Session endpoints: login, logout, self-registration and the current user.
//!
//! ```text
//! POST /api/v1/login {"email":"ana@orb.test","password":"secret123"}
//! GET /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::NewAccount;
use crate::domain::{
    Credentials, Error, OperatorProfile, OrbPointId, Role, User, UserProfile, landing_path,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_credentials_error, map_profile_error, require};

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Signed-in user and the page the client should open next.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(value_type = UserSchema)]
    pub user: User,
    #[schema(example = "/admin/dashboard")]
    pub redirect_to: String,
    /// OrbPoint the user works at, when bound.
    #[schema(value_type = Option<String>, format = Uuid)]
    pub orb_point_id: Option<OrbPointId>,
}

/// Self-registration form for `POST /api/v1/register`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub n_doc: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl RegisterRequest {
    /// Validate the form into an account request for `role`.
    pub(crate) fn into_account(self, role: Role) -> Result<NewAccount, Error> {
        let n_doc = require(self.n_doc, "nDoc")?;
        let firstname = require(self.firstname, "firstname")?;
        let lastname = require(self.lastname, "lastname")?;
        let email = require(self.email, "email")?;
        let password = require(self.password, "password")?;
        let confirmation = require(self.password_confirmation, "passwordConfirmation")?;

        let profile = UserProfile::try_from_parts(&n_doc, &firstname, &lastname, &email)
            .map_err(map_profile_error)?;
        let credentials = Credentials::try_for_signup(&email, &password, &confirmation)
            .map_err(map_credentials_error)?;
        Ok(NewAccount {
            profile,
            credentials,
            role,
        })
    }
}

async fn session_response(state: &HttpState, user: User) -> ApiResult<SessionResponse> {
    let orb_point_id = match user.role {
        Role::Admin => None,
        Role::Operator | Role::Promoter => state
            .directory
            .find_operator_for_user(&user.id)
            .await?
            .and_then(|profile| profile.operator.orb_point_id),
    };
    Ok(SessionResponse {
        redirect_to: landing_path(user.role).to_owned(),
        orb_point_id,
        user,
    })
}

/// Verify credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let email = require(email, "email")?;
    let password = require(password, "password")?;
    let credentials =
        Credentials::try_from_parts(&email, &password).map_err(map_credentials_error)?;

    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user.id)?;
    info!(user_id = %user.id, role = user.role.as_str(), "user logged in");
    Ok(web::Json(session_response(&state, user).await?))
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Create an operator account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let account = payload.into_inner().into_account(Role::Operator)?;
    let OperatorProfile { user_data, .. } = state.directory_command.create_account(account).await?;
    session.persist_user(&user_data.id)?;
    let body = SessionResponse {
        redirect_to: landing_path(user_data.role).to_owned(),
        orb_point_id: None,
        user: user_data,
    };
    Ok(HttpResponse::Created().json(body))
}

/// Current user and landing page.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Signed-in user", body = SessionResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SessionResponse>> {
    let user_id = session.require_user_id()?;
    let Some(user) = state.directory.get_user(&user_id).await? else {
        session.clear();
        return Err(Error::unauthorized("login required"));
    };
    Ok(web::Json(session_response(&state, user).await?))
}
