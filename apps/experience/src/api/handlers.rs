//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        ActivitiesResponse, ActivityJson, CalendarQuery, CalendarResponse, ConfirmationResponse,
        EligibilityResponse, ErrorResponse, HealthResponse, RecordResponse, RegisterResponse,
        RegistrationListResponse, check_text_lengths,
    },
};
use crate::crm;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use experience_core::{
    ActivityId, ExperienceError, RegistrantProfile, Registration, RegistrationForm,
    RegistrationId, activity, activity_event, catalog, compute_steps, eligible_activities,
    has_lounge_access, wizard,
};
use std::sync::Arc;

/// HTTP status for a core error.
fn error_status(error: &ExperienceError) -> StatusCode {
    match error {
        ExperienceError::NotFound(_) => StatusCode::NOT_FOUND,
        ExperienceError::Incomplete(_) | ExperienceError::InvalidInput(_) => {
            StatusCode::BAD_REQUEST
        }
        ExperienceError::Storage(_)
        | ExperienceError::Serialization(_)
        | ExperienceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message for a request body that failed to parse.
fn rejection_message(rejection: &JsonRejection) -> String {
    format!("Invalid request body: {}", rejection.body_text())
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let persistent = state.registry.read().await.is_persistent();
    Json(HealthResponse::ok(persistent))
}

// =============================================================================
// CATALOG HANDLERS
// =============================================================================

/// The full activity catalog, in presentation order.
pub async fn activities_handler() -> impl IntoResponse {
    let activities: Vec<ActivityJson> = catalog().iter().map(ActivityJson::from).collect();
    Json(ActivitiesResponse {
        count: activities.len(),
        activities,
    })
}

/// What a set of qualification answers unlocks.
pub async fn eligibility_handler(
    payload: Result<Json<RegistrantProfile>, JsonRejection>,
) -> Response {
    let profile = match payload {
        Ok(Json(profile)) => profile,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(rejection_message(&rejection))),
            )
                .into_response();
        }
    };
    Json(EligibilityResponse {
        activities: eligible_activities(&profile)
            .into_iter()
            .map(ActivityJson::from)
            .collect(),
        lounge_access: has_lounge_access(&profile),
        steps: compute_steps(&profile),
    })
    .into_response()
}

// =============================================================================
// REGISTER HANDLER
// =============================================================================

/// Validate, finalize and store a registration.
///
/// CRM sync runs on a spawned task after the record is stored, so its
/// latency and failures never reach the response.
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationForm>, JsonRejection>,
) -> impl IntoResponse {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            let body = RegisterResponse::error(rejection_message(&rejection));
            return (StatusCode::BAD_REQUEST, Json(body));
        }
    };
    if let Err(e) = check_text_lengths(&form) {
        return (StatusCode::BAD_REQUEST, Json(RegisterResponse::error(e.to_string())));
    }
    if let Err(e) = wizard::validate(&form) {
        let body = match e {
            ExperienceError::Incomplete(step) => RegisterResponse::incomplete(step),
            other => RegisterResponse::error(other.to_string()),
        };
        return (StatusCode::BAD_REQUEST, Json(body));
    }

    let registration = form.finalize();
    let stored = {
        let mut registry = state.registry.write().await;
        registry.register(registration)
    };

    match stored {
        Ok(record) => {
            tracing::info!(
                registration_id = record.id.0,
                activities = record.registration.activities.len(),
                "Registration stored"
            );
            let id = record.id;
            let sync = Arc::clone(&state.crm);
            tokio::spawn(async move {
                crm::sync_best_effort(sync.as_ref(), &record).await;
            });
            (StatusCode::OK, Json(RegisterResponse::success(id)))
        }
        Err(e) => {
            tracing::error!("Failed to store registration: {}", e);
            (
                error_status(&e),
                Json(RegisterResponse::error(format!("Registration failed: {}", e))),
            )
        }
    }
}

// =============================================================================
// CONFIRMATION HANDLER
// =============================================================================

/// Public confirmation summary of a stored registration.
pub async fn confirmation_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let registry = state.registry.read().await;
    match registry.get(RegistrationId(id)) {
        Ok(record) => (StatusCode::OK, Json(ConfirmationResponse::success(&record))),
        Err(e) => (error_status(&e), Json(ConfirmationResponse::error(e.to_string()))),
    }
}

// =============================================================================
// CALENDAR HANDLER
// =============================================================================

/// Calendar export for one activity.
///
/// `?format=ics` returns the `.ics` file itself; otherwise a JSON body with
/// the event, the ICS text and the Google/Outlook links.
pub async fn calendar_handler(
    Path(activity_id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Response {
    let id = match activity_id.parse::<ActivityId>() {
        Ok(id) => id,
        Err(e) => {
            return (StatusCode::NOT_FOUND, Json(CalendarResponse::error(e.to_string())))
                .into_response();
        }
    };

    let Some(event) = activity_event(activity(id)) else {
        tracing::error!(activity = %id, "Catalog entry has no parsable time window");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(CalendarResponse::error("Calendar event unavailable")),
        )
            .into_response();
    };

    if query.format.as_deref() == Some("ics") {
        let disposition = format!("attachment; filename=\"{}\"", event.file_name());
        return (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            event.to_ics(),
        )
            .into_response();
    }

    (StatusCode::OK, Json(CalendarResponse::success(event))).into_response()
}

// =============================================================================
// ADMIN HANDLERS
// =============================================================================

/// All registrations, newest first.
pub async fn admin_list_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    match registry.list() {
        Ok(records) => (StatusCode::OK, Json(RegistrationListResponse::success(records))),
        Err(e) => (
            error_status(&e),
            Json(RegistrationListResponse::error(e.to_string())),
        ),
    }
}

/// One registration with every stored answer.
pub async fn admin_get_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let registry = state.registry.read().await;
    match registry.get(RegistrationId(id)) {
        Ok(record) => (StatusCode::OK, Json(RecordResponse::success(record))),
        Err(e) => (error_status(&e), Json(RecordResponse::error(e.to_string()))),
    }
}

/// Replace the editable fields of a registration.
///
/// The id and creation time are kept. The body is stored as given: staff
/// edits are not re-run through eligibility.
pub async fn admin_update_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> impl IntoResponse {
    let registration = match payload {
        Ok(Json(registration)) => registration,
        Err(rejection) => {
            let body = RecordResponse::error(rejection_message(&rejection));
            return (StatusCode::BAD_REQUEST, Json(body));
        }
    };
    if let Err(e) = check_text_lengths(&registration.to_form()) {
        return (StatusCode::BAD_REQUEST, Json(RecordResponse::error(e.to_string())));
    }

    let mut registry = state.registry.write().await;
    match registry.update(RegistrationId(id), registration) {
        Ok(record) => {
            tracing::info!(registration_id = id, "Registration updated by admin");
            (StatusCode::OK, Json(RecordResponse::success(record)))
        }
        Err(e) => (error_status(&e), Json(RecordResponse::error(e.to_string()))),
    }
}

/// Delete a registration.
pub async fn admin_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut registry = state.registry.write().await;
    match registry.delete(RegistrationId(id)) {
        Ok(()) => {
            tracing::info!(registration_id = id, "Registration deleted by admin");
            (StatusCode::OK, Json(RecordResponse::deleted()))
        }
        Err(e) => (error_status(&e), Json(RecordResponse::error(e.to_string()))),
    }
}
