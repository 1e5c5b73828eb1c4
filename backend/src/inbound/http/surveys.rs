//! Survey form and submission endpoints for operators and promoters.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::SurveyForm;
use crate::domain::{Action, Error, SurveyAnswers, SurveyResponse, SurveyResponseId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, SurveyFormSchema, SurveyResponseSchema};
use crate::inbound::http::access::authorize_caller;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_id, require};

/// Survey answers posted by the form.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRequest {
    /// Id from the how-did-you-hear catalogue.
    #[schema(example = "1")]
    pub how_did_you_hear_about: Option<String>,
    /// Sector name of the caller's OrbPoint.
    #[schema(example = "Food court")]
    pub visiting_from: Option<String>,
    #[serde(default)]
    pub interested_crypto: Vec<String>,
    pub contact_number: Option<String>,
}

impl TryFrom<SurveyRequest> for SurveyAnswers {
    type Error = Error;

    fn try_from(value: SurveyRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            how_did_you_hear_about: require(value.how_did_you_hear_about, "howDidYouHearAbout")?,
            visiting_from: require(value.visiting_from, "visitingFrom")?,
            interested_crypto: value.interested_crypto,
            contact_number: require(value.contact_number, "contactNumber")?,
        })
    }
}

/// Answer catalogues and sectors for the caller's OrbPoint.
#[utoipa::path(
    get,
    path = "/api/v1/survey/options",
    responses(
        (status = 200, description = "Survey form", body = SurveyFormSchema),
        (status = 400, description = "Caller is not bound to an OrbPoint", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Role may not take surveys", body = ErrorSchema)
    ),
    tags = ["surveys"],
    operation_id = "surveyOptions"
)]
#[get("/survey/options")]
pub async fn survey_options(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SurveyForm>> {
    let user = authorize_caller(&state, &session, Action::ViewSurveyForm).await?;
    let form = state.surveys.survey_form(&user.id).await?;
    Ok(web::Json(form))
}

/// Record a survey response at the caller's OrbPoint.
#[utoipa::path(
    post,
    path = "/api/v1/surveys",
    request_body = SurveyRequest,
    responses(
        (status = 201, description = "Response stored", body = SurveyResponseSchema),
        (status = 400, description = "Invalid answers", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Role may not take surveys", body = ErrorSchema)
    ),
    tags = ["surveys"],
    operation_id = "submitSurvey"
)]
#[post("/surveys")]
pub async fn submit_survey(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SurveyRequest>,
) -> ApiResult<HttpResponse> {
    let user = authorize_caller(&state, &session, Action::SubmitSurvey).await?;
    let answers = SurveyAnswers::try_from(payload.into_inner())?;
    let response = state.surveys.submit(&user.id, answers).await?;
    Ok(HttpResponse::Created().json(response))
}

#[derive(Debug, Deserialize)]
struct SurveyResponsePath {
    id: String,
}

/// Fetch one stored survey response.
#[utoipa::path(
    get,
    path = "/api/v1/admin/survey-responses/{id}",
    params(("id" = String, Path, description = "Survey response id")),
    responses(
        (status = 200, description = "Survey response", body = SurveyResponseSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["surveys"],
    operation_id = "getSurveyResponse",
    security(("SessionCookie" = []))
)]
#[get("/admin/survey-responses/{id}")]
pub async fn get_survey_response(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<SurveyResponsePath>,
) -> ApiResult<web::Json<SurveyResponse>> {
    authorize_caller(&state, &session, Action::ViewStatistics).await?;
    let id: SurveyResponseId = parse_id(&path.id, "id")?;
    state
        .directory
        .get_survey_response(id)
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::not_found(format!("survey response {id} not found")))
}
