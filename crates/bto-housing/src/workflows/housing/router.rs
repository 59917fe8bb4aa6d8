use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicationId, ApplicationOutcome, FlatType, MaritalStatus, Nric, ProjectId, RegistrationId,
    Session, User, UserRole, WithdrawalId,
};
use super::error::HousingError;
use super::project::ProjectDraft;
use super::service::{FlatSelection, HousingService};

/// Header carrying the NRIC of the calling user.
pub const SESSION_HEADER: &str = "x-nric";

/// Router builder exposing the housing core over HTTP.
pub fn housing_router(service: Arc<HousingService>) -> Router {
    Router::new()
        .route("/api/v1/housing/users", post(register_user_handler))
        .route(
            "/api/v1/housing/projects",
            get(available_projects_handler).post(create_project_handler),
        )
        .route("/api/v1/housing/projects/:project_id", get(project_handler))
        .route(
            "/api/v1/housing/projects/:project_id/visibility",
            put(visibility_handler),
        )
        .route("/api/v1/housing/projects/:project_id/units", put(units_handler))
        .route(
            "/api/v1/housing/projects/:project_id/applications",
            get(project_applications_handler).post(submit_handler),
        )
        .route(
            "/api/v1/housing/projects/:project_id/registrations",
            get(pending_registrations_handler).post(register_officer_handler),
        )
        .route(
            "/api/v1/housing/projects/:project_id/withdrawals",
            get(pending_withdrawals_handler),
        )
        .route("/api/v1/housing/applications", get(history_handler))
        .route(
            "/api/v1/housing/applications/:application_id",
            get(application_handler),
        )
        .route(
            "/api/v1/housing/applications/:application_id/decision",
            post(decide_handler),
        )
        .route(
            "/api/v1/housing/applications/:application_id/booking",
            post(book_handler),
        )
        .route(
            "/api/v1/housing/applications/:application_id/withdrawals",
            post(request_withdrawal_handler),
        )
        .route(
            "/api/v1/housing/registrations/:registration_id/decision",
            post(process_registration_handler),
        )
        .route(
            "/api/v1/housing/withdrawals/:withdrawal_id/decision",
            post(process_withdrawal_handler),
        )
        .with_state(service)
}

impl IntoResponse for HousingError {
    fn into_response(self) -> Response {
        let status = match &self {
            HousingError::UnknownUser(_)
            | HousingError::UnknownProject(_)
            | HousingError::UnknownApplication(_)
            | HousingError::UnknownRegistration(_)
            | HousingError::UnknownWithdrawal(_) => StatusCode::NOT_FOUND,
            HousingError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
            HousingError::IneligibleApplicant { .. }
            | HousingError::InvalidMaritalStatus { .. }
            | HousingError::InvalidNric { .. }
            | HousingError::InvalidProject { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            HousingError::InconsistentSnapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::CONFLICT,
        };
        let payload = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, Json(payload)).into_response()
    }
}

fn session(service: &HousingService, headers: &HeaderMap) -> Result<Session, Response> {
    let Some(raw) = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        let payload = json!({
            "error": format!("missing {SESSION_HEADER} header"),
            "kind": "MISSING_SESSION",
        });
        return Err((StatusCode::UNAUTHORIZED, Json(payload)).into_response());
    };
    Nric::parse(raw)
        .and_then(|nric| service.open_session(&nric))
        .map_err(IntoResponse::into_response)
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, HousingError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Sign-up body; the marital status is parsed by the core so bad values carry a kind.
#[derive(Debug, Deserialize)]
pub(crate) struct UserRegistration {
    nric: Nric,
    name: String,
    age: u8,
    marital_status: String,
    role: UserRole,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingQuery {
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VisibilityUpdate {
    visible: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnitTotalUpdate {
    flat_type: FlatType,
    total: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionBody {
    outcome: ApplicationOutcome,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewBody {
    approve: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WithdrawalBody {
    #[serde(default)]
    reason: String,
}

pub(crate) async fn register_user_handler(
    State(service): State<Arc<HousingService>>,
    Json(registration): Json<UserRegistration>,
) -> Response {
    let result = registration
        .marital_status
        .parse::<MaritalStatus>()
        .and_then(|marital_status| {
            service.register_user(User {
                nric: registration.nric,
                name: registration.name,
                age: registration.age,
                marital_status,
                role: registration.role,
            })
        });
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn available_projects_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Query(query): Query<ListingQuery>,
) -> Response {
    let session = match session(&service, &headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let today = query.date.unwrap_or_else(|| Utc::now().date_naive());
    (StatusCode::OK, Json(service.available_projects(&session, today))).into_response()
}

pub(crate) async fn create_project_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Json(draft): Json<ProjectDraft>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(StatusCode::CREATED, service.create_project(&session, draft)),
        Err(response) => response,
    }
}

pub(crate) async fn project_handler(
    State(service): State<Arc<HousingService>>,
    Path(project_id): Path<String>,
) -> Response {
    respond(StatusCode::OK, service.project(&ProjectId(project_id)))
}

pub(crate) async fn visibility_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(update): Json<VisibilityUpdate>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::OK,
            service.set_visibility(&session, &ProjectId(project_id), update.visible),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn units_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(update): Json<UnitTotalUpdate>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::OK,
            service.set_unit_total(
                &session,
                &ProjectId(project_id),
                update.flat_type,
                update.total,
            ),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::CREATED,
            service.submit(&session, &ProjectId(project_id)),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn project_applications_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::OK,
            service.project_applications(&session, &ProjectId(project_id)),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn register_officer_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::CREATED,
            service.register_officer(&session, &ProjectId(project_id)),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn pending_registrations_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::OK,
            service.pending_registrations(&session, &ProjectId(project_id)),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn pending_withdrawals_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::OK,
            service.pending_withdrawals(&session, &ProjectId(project_id)),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn history_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(StatusCode::OK, service.application_history(&session)),
        Err(response) => response,
    }
}

pub(crate) async fn application_handler(
    State(service): State<Arc<HousingService>>,
    Path(application_id): Path<String>,
) -> Response {
    respond(
        StatusCode::OK,
        service.application(&ApplicationId(application_id)),
    )
}

pub(crate) async fn decide_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::OK,
            service.decide(&session, &ApplicationId(application_id), body.outcome),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn book_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(selection): Json<FlatSelection>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::OK,
            service.book(&session, &ApplicationId(application_id), selection),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn request_withdrawal_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(body): Json<WithdrawalBody>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::ACCEPTED,
            service.request_withdrawal(&session, &ApplicationId(application_id), &body.reason),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn process_registration_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(registration_id): Path<String>,
    Json(body): Json<ReviewBody>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::OK,
            service.process_registration(&session, &RegistrationId(registration_id), body.approve),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn process_withdrawal_handler(
    State(service): State<Arc<HousingService>>,
    headers: HeaderMap,
    Path(withdrawal_id): Path<String>,
    Json(body): Json<ReviewBody>,
) -> Response {
    match session(&service, &headers) {
        Ok(session) => respond(
            StatusCode::OK,
            service.process_withdrawal(&session, &WithdrawalId(withdrawal_id), body.approve),
        ),
        Err(response) => response,
    }
}
