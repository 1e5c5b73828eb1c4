//! In-process harness wiring the HTTP API to the in-memory adapters.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::{BoxBody, EitherBody};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::{App, HttpResponse, test, web};
use mockable::{Clock, DefaultClock};
use serde_json::Value;

use orbsurvey::domain::{
    AssignmentService, AssignmentSettings, Credentials, DirectoryService, IdentityLoginService,
    SurveyService, UserProfile,
};
use orbsurvey::inbound::http::api_routes;
use orbsurvey::inbound::http::session::SESSION_COOKIE;
use orbsurvey::inbound::http::state::HttpState;
use orbsurvey::middleware::RouteGuard;
use orbsurvey::outbound::memory::{
    MemoryDirectoryRepository, MemoryIdentityProvider, MemorySurveyResponseRepository,
};

pub const ADMIN_EMAIL: &str = "admin@orbsurvey.test";
pub const ADMIN_PASSWORD: &str = "admin-secret";

/// HTTP state over fresh in-memory adapters with a bootstrapped admin.
pub async fn memory_state() -> web::Data<HttpState> {
    let directory = Arc::new(MemoryDirectoryRepository::new());
    let responses = Arc::new(MemorySurveyResponseRepository::new());
    let identity = Arc::new(MemoryIdentityProvider::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let directory_service = Arc::new(DirectoryService::new(
        directory.clone(),
        responses.clone(),
        identity.clone(),
        clock.clone(),
    ));
    let profile = UserProfile::try_from_parts("0", "OrbPoint", "Admin", ADMIN_EMAIL)
        .expect("admin profile");
    let credentials =
        Credentials::try_from_parts(ADMIN_EMAIL, ADMIN_PASSWORD).expect("admin credentials");
    directory_service
        .bootstrap_admin(profile, &credentials)
        .await
        .expect("bootstrap admin");
    let survey_service = Arc::new(SurveyService::new(directory.clone(), responses, clock));

    web::Data::new(HttpState {
        login: Arc::new(IdentityLoginService::new(identity.clone(), directory.clone())),
        directory: directory_service.clone(),
        directory_command: directory_service,
        assignments: Arc::new(AssignmentService::new(
            directory,
            identity,
            AssignmentSettings::default(),
        )),
        surveys: survey_service.clone(),
        stats: survey_service,
    })
}

async fn page() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// The API under `/api/v1` behind the login redirect, as the server mounts it.
pub fn app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(state)
        .wrap(RouteGuard)
        .service(api_routes(web::scope("/api/v1")).wrap(session))
        .route("/", web::get().to(page))
        .route("/admin/dashboard", web::get().to(page))
}

/// Status, JSON body (`Null` when empty) and refreshed session cookie.
pub struct Reply {
    pub status: u16,
    pub body: Value,
    pub cookie: Option<Cookie<'static>>,
}

/// Send one request, attaching `cookie` and a JSON `body` when given.
pub async fn send<S>(
    app: &S,
    method: Method,
    uri: &str,
    cookie: Option<&Cookie<'static>>,
    body: Option<Value>,
) -> Reply
where
    S: Service<
            actix_http::Request,
            Response = ServiceResponse<EitherBody<BoxBody>>,
            Error = actix_web::Error,
        >,
{
    let mut request = test::TestRequest::default().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.cookie(cookie.clone());
    }
    if let Some(body) = body {
        request = request.set_json(body);
    }
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status().as_u16();
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned);
    let bytes = test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    Reply {
        status,
        body,
        cookie,
    }
}

/// Log in and return the session cookie.
pub async fn login<S>(app: &S, email: &str, password: &str) -> (Reply, Cookie<'static>)
where
    S: Service<
            actix_http::Request,
            Response = ServiceResponse<EitherBody<BoxBody>>,
            Error = actix_web::Error,
        >,
{
    let reply = send(
        app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(reply.status, 200, "login failed: {}", reply.body);
    let cookie = reply.cookie.clone().expect("session cookie");
    (reply, cookie)
}

/// Body for creating a staff account.
pub fn staff(email: &str, role: &str) -> Value {
    serde_json::json!({
        "nDoc": "12345678",
        "firstname": "Lucía",
        "lastname": "Gómez",
        "email": email,
        "password": "staff-secret",
        "passwordConfirmation": "staff-secret",
        "role": role,
    })
}

/// Body for creating an OrbPoint with two sectors.
pub fn orb_point(name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "areaType": "mall",
        "direction": "Av. Principal 123",
        "region": "Lima",
        "sectors": [
            { "sectorName": "Food court", "sectorType": "food" },
            { "sectorName": "Cinema", "sectorType": "leisure" },
        ],
    })
}

/// String field of a JSON body.
pub fn text<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing string field {key} in {body}"))
}
