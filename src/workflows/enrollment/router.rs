use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::warn;

use super::authority::CertificatePolicyAuthority;
use super::domain::ApplicantRecord;
use super::intake::{IntakeError, SubmittedApplicant, SubmittedIntake};
use super::store::{RecordStore, StoreError};
use super::workflow::{EnrollmentError, EnrollmentWorkflow};
use crate::config::EnrollmentConfig;
use crate::error::AppError;

/// Shared handler state: the roster and the approval policy.
pub struct EnrollmentState<S> {
    store: Arc<S>,
    config: Arc<EnrollmentConfig>,
}

impl<S> EnrollmentState<S> {
    pub fn new(store: Arc<S>, config: EnrollmentConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

impl<S> Clone for EnrollmentState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

/// Router exposing enrollment submission and the current roster.
pub fn enrollment_router<S>(store: Arc<S>, config: EnrollmentConfig) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/enrollments",
            post(enroll_handler::<S>).get(roster_handler::<S>),
        )
        .with_state(EnrollmentState::new(store, config))
}

pub(crate) async fn enroll_handler<S>(
    State(state): State<EnrollmentState<S>>,
    Json(applicant): Json<SubmittedApplicant>,
) -> Response
where
    S: RecordStore + 'static,
{
    let intake = Arc::new(SubmittedIntake::new(applicant));
    let authority = Arc::new(CertificatePolicyAuthority::from_config(&state.config));
    let workflow = EnrollmentWorkflow::new(Arc::clone(&intake), authority, state.store);

    match workflow.process_enrollment() {
        Ok(_) => match intake.last_notice() {
            Some(notice) => {
                let status = if notice.is_enrolled() {
                    StatusCode::CREATED
                } else {
                    StatusCode::OK
                };
                (status, Json(notice)).into_response()
            }
            None => {
                let payload = json!({ "error": "enrollment finished without a notice" });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
            }
        },
        Err(EnrollmentError::Intake(IntakeError::MissingField(field))) => {
            let payload = json!({
                "error": format!("applicant did not provide `{field}`"),
                "field": field,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(EnrollmentError::Store(StoreError::Duplicate(email))) => {
            let payload = json!({
                "error": "applicant already enrolled",
                "contact_email": email,
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(other) => {
            warn!(error = %other, "enrollment attempt failed");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn roster_handler<S>(
    State(state): State<EnrollmentState<S>>,
) -> Result<Json<Vec<ApplicantRecord>>, AppError>
where
    S: RecordStore + 'static,
{
    let roster = state.store.roster().map_err(EnrollmentError::from)?;
    Ok(Json(roster))
}
