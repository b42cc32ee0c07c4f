//! Request handlers for the donor API.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::donor::Donor;
use crate::error::Error;
use crate::registry::{SearchQuery, StatusUpdateRequest};

use super::error::ApiError;
use super::payload::RegistrationPayload;
use super::AppState;

/// Message reported by the status endpoint while the service is up.
const RUNNING_MESSAGE: &str = "Server is running.";

/// `GET /api/status`
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let donor_count = state.read().donor_count();
    Json(json!({
        "app_version": env!("CARGO_PKG_VERSION"),
        "donor_count": donor_count,
        "status": RUNNING_MESSAGE,
        "started_at": state.started_at().to_rfc3339(),
    }))
}

/// `GET /api/donors/search?blood_group=&name=`
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Donor>>, ApiError> {
    let Query(query) = query.map_err(|rejection| Error::invalid_request(rejection.body_text()))?;

    let registry = state.read();
    Ok(Json(registry.search(&query).into_iter().cloned().collect()))
}

/// `POST /api/donors` and `POST /api/donors/register`
pub async fn register(
    State(state): State<AppState>,
    RegistrationPayload(request): RegistrationPayload,
) -> Result<impl IntoResponse, ApiError> {
    let donor = state.write(move |registry| registry.register(request)).await?;
    Ok((StatusCode::CREATED, Json(donor)))
}

/// `POST /api/donors/update_status`
pub async fn update_status(
    State(state): State<AppState>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| Error::invalid_request(rejection.body_text()))?;

    let donor = state
        .write(move |registry| registry.update_status(request))
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Donor {} status updated to {}.",
            donor.id, donor.availability_status
        ),
        "donor": donor,
    })))
}
