//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, Scope, test, web};

use crate::domain::ports::{
    MockAssignmentCommand, MockDirectoryCommand, MockDirectoryQuery, MockLoginService,
    MockSurveyCommand, MockSurveyStatsQuery,
};
use crate::domain::{Error, Role, User, UserId};
use crate::inbound::http::session::{SESSION_COOKIE, SessionContext};
use crate::inbound::http::state::HttpState;

const SEED_PATH: &str = "/__test/session";

/// Session middleware with a fresh key and the `Secure` flag off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Mock ports for one handler test; unset expectations panic when hit.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub directory: MockDirectoryQuery,
    pub directory_command: MockDirectoryCommand,
    pub assignments: MockAssignmentCommand,
    pub surveys: MockSurveyCommand,
    pub stats: MockSurveyStatsQuery,
}

impl MockPorts {
    /// Make `get_user` resolve `user` for every request.
    pub fn with_caller(mut self, user: User) -> Self {
        self.directory
            .expect_get_user()
            .returning(move |_| Ok(Some(user.clone())));
        self
    }

    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            login: Arc::new(self.login),
            directory: Arc::new(self.directory),
            directory_command: Arc::new(self.directory_command),
            assignments: Arc::new(self.assignments),
            surveys: Arc::new(self.surveys),
            stats: Arc::new(self.stats),
        })
    }
}

/// A stored user with the given role, as returned by `get_user`.
pub fn caller(role: Role) -> User {
    crate::domain::fixtures::user("caller", role)
}

async fn seed_session(session: SessionContext) -> Result<HttpResponse, Error> {
    let id = UserId::new("caller").map_err(|err| Error::internal(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::Ok().finish())
}

/// App with session middleware, `state`, the handlers registered by `api`
/// under `/api/v1`, and a route that signs in the fixture caller.
pub fn test_app(
    state: web::Data<HttpState>,
    api: impl FnOnce(Scope) -> Scope,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(test_session_middleware())
        .app_data(state)
        .route(SEED_PATH, web::get().to(seed_session))
        .service(api(web::scope("/api/v1")))
}

/// Session cookie for the fixture caller.
pub async fn signed_in<S>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, test::TestRequest::get().uri(SEED_PATH).to_request()).await;
    session_cookie(&res)
}
