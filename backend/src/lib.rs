//! OrbPoint survey backend: staff directory, operator/OrbPoint bindings,
//! survey capture and statistics behind a session-authenticated REST API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
