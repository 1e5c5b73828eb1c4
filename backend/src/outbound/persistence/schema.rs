//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes a table, update this file (or regenerate it with
//! `diesel print-schema`).

diesel::table! {
    /// Staff profiles keyed by the identity provider's account id.
    users (id) {
        id -> Varchar,
        n_doc -> Varchar,
        firstname -> Varchar,
        lastname -> Varchar,
        /// Lower-cased login email.
        email -> Varchar,
        /// `admin`, `operator` or `promoter`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Operator records. A supervisor's `orb_point_id` mirrors
    /// `orb_points.operator_id`; promoters share theirs.
    operators (id) {
        id -> Uuid,
        orb_point_id -> Nullable<Uuid>,
        user_data_id -> Varchar,
    }
}

diesel::table! {
    /// Physical collection locations.
    orb_points (id) {
        id -> Uuid,
        name -> Varchar,
        area_type -> Varchar,
        direction -> Varchar,
        region -> Varchar,
        /// JSON array of `{sectorName, sectorType}` objects.
        sectors -> Jsonb,
        operator_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only survey submissions.
    survey_responses (id) {
        id -> Uuid,
        how_did_you_hear_about -> Varchar,
        visiting_from -> Varchar,
        interested_crypto -> Array<Text>,
        contact_number -> Varchar,
        operator_id -> Uuid,
        orb_point_id -> Uuid,
        submitted_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, operators, orb_points, survey_responses);
