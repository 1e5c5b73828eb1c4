//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to and from domain records
//! live with the repositories that use them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{operators, orb_points, survey_responses, users};

// ---------------------------------------------------------------------------
// Directory models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: String,
    pub n_doc: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = operators)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OperatorRow {
    pub id: Uuid,
    pub orb_point_id: Option<Uuid>,
    pub user_data_id: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = orb_points)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrbPointRow {
    pub id: Uuid,
    pub name: String,
    pub area_type: String,
    pub direction: String,
    pub region: String,
    pub sectors: serde_json::Value,
    pub operator_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Survey response models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = survey_responses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SurveyResponseRow {
    pub id: Uuid,
    pub how_did_you_hear_about: String,
    pub visiting_from: String,
    pub interested_crypto: Vec<String>,
    pub contact_number: String,
    pub operator_id: Uuid,
    pub orb_point_id: Uuid,
    pub submitted_at: DateTime<Utc>,
}
