use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::domain::PersonId;
use super::email::EmailClient;
use super::repository::{IncomeReviewStore, RepositoryError};
use super::scheduler::{IncomeReviewError, IncomeReviewScheduler};

/// Router builder exposing the income review job over HTTP.
pub fn income_review_router<S, E>(service: Arc<IncomeReviewScheduler<S, E>>) -> Router
where
    S: IncomeReviewStore + 'static,
    E: EmailClient + 'static,
{
    Router::new()
        .route("/api/v1/income-review/run", post(run_handler::<S, E>))
        .route(
            "/api/v1/income-review/notifications/:person_id",
            get(notifications_handler::<S, E>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunRequest {
    /// Reference date override; defaults to the current day.
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn run_handler<S, E>(
    State(service): State<Arc<IncomeReviewScheduler<S, E>>>,
    axum::Json(payload): axum::Json<RunRequest>,
) -> Response
where
    S: IncomeReviewStore + 'static,
    E: EmailClient + 'static,
{
    let reference = payload
        .today
        .map(|today| today.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or_else(Utc::now);

    match service.run_review(reference) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(IncomeReviewError::Repository(RepositoryError::Unavailable(detail))) => {
            let payload = json!({ "error": format!("repository unavailable: {detail}") });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn notifications_handler<S, E>(
    State(service): State<Arc<IncomeReviewScheduler<S, E>>>,
    Path(person_id): Path<String>,
) -> Response
where
    S: IncomeReviewStore + 'static,
    E: EmailClient + 'static,
{
    let receiver = match person_id.parse::<Uuid>() {
        Ok(id) => PersonId(id),
        Err(_) => {
            let payload = json!({ "error": "person id must be a UUID" });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.notifications_for(receiver) {
        Ok(notifications) => (StatusCode::OK, axum::Json(notifications)).into_response(),
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
