//! Redirect anonymous visitors of page routes to the login page.
//!
//! Only the presence of the `session` cookie is checked. Handlers still
//! authenticate and authorise every request on their own.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::inbound::http::session::SESSION_COOKIE;

/// Page every guarded request is redirected to.
pub const LOGIN_PATH: &str = "/auth/login";

fn is_guarded(path: &str) -> bool {
    path == "/" || path == "/admin" || path.starts_with("/admin/")
}

/// Middleware answering `302 Found` to `/auth/login` for guarded paths
/// requested without a session cookie.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use orbsurvey::middleware::RouteGuard;
///
/// let app = App::new().wrap(RouteGuard);
/// ```
#[derive(Clone)]
pub struct RouteGuard;

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware { service }))
    }
}

/// Service wrapper produced by [`RouteGuard`].
pub struct RouteGuardMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_guarded(req.path()) && req.cookie(SESSION_COOKIE).is_none() {
            debug!(path = %req.path(), "redirecting anonymous request to login");
            let response = HttpResponse::Found()
                .insert_header((header::LOCATION, LOGIN_PATH))
                .finish()
                .map_into_right_body();
            let (request, _) = req.into_parts();
            return Box::pin(ready(Ok(ServiceResponse::new(request, response))));
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
