//! Request middleware.
//!
//! Purpose: request lifecycle concerns such as tracing and the login
//! redirect for page routes.

pub mod route_guard;
pub mod trace;

pub use route_guard::RouteGuard;
pub use trace::Trace;
