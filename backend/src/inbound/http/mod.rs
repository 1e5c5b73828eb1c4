//! HTTP inbound adapter exposing the REST API.

mod access;
pub mod auth;
pub mod error;
pub mod health;
pub mod operators;
pub mod orb_points;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod surveys;
#[cfg(test)]
pub mod test_utils;
pub(crate) mod validation;

use actix_web::Scope;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `scope`.
pub fn api_routes(scope: Scope) -> Scope {
    scope
        .service(auth::login)
        .service(auth::logout)
        .service(auth::register)
        .service(auth::me)
        .service(surveys::survey_options)
        .service(surveys::submit_survey)
        .service(surveys::get_survey_response)
        .service(orb_points::list_orb_points)
        .service(orb_points::create_orb_point)
        .service(orb_points::orb_point_stats)
        .service(orb_points::get_orb_point)
        .service(orb_points::delete_orb_point)
        .service(orb_points::list_orb_point_promoters)
        .service(orb_points::assign_orb_point_promoters)
        .service(orb_points::list_orb_point_responses)
        .service(operators::list_operators)
        .service(operators::get_operator)
        .service(operators::create_operator)
        .service(operators::list_unassigned_promoters)
        .service(operators::assign_operator)
        .service(operators::unassign_operator)
        .service(operators::delete_operator)
}
