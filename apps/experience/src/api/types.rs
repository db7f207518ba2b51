//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Request bodies reuse the core types directly (`RegistrantProfile`,
//! `RegistrationForm`, `Registration`); only responses are defined here.

use chrono::{DateTime, Utc};
use experience_core::{
    Activity, ActivityId, CalendarEvent, ExperienceError, RegistrationForm, RegistrationId,
    RegistrationRecord, StepId, activity, activity_display_string, has_lounge_access,
    primitives::{MAX_LONG_TEXT_LENGTH, MAX_SHORT_TEXT_LENGTH},
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub persistent: bool,
}

impl HealthResponse {
    pub fn ok(persistent: bool) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            persistent,
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Error body for routes whose success response has no `error` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// =============================================================================
// ACTIVITIES
// =============================================================================

/// A catalog entry as shown to registrants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityJson {
    pub id: ActivityId,
    pub day: String,
    pub date: String,
    pub time: String,
    pub name: String,
    pub description: String,
    /// `"<name> - <date> • <time>"`, the input to `/calendar`.
    pub display: String,
}

impl From<&Activity> for ActivityJson {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            day: activity.day.to_string(),
            date: activity.day.date_label().to_string(),
            time: activity.time.to_string(),
            name: activity.name.to_string(),
            description: activity.description.to_string(),
            display: activity_display_string(activity),
        }
    }
}

/// The full catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitiesResponse {
    pub count: usize,
    pub activities: Vec<ActivityJson>,
}

/// What a profile unlocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub activities: Vec<ActivityJson>,
    pub lounge_access: bool,
    pub steps: Vec<StepId>,
}

// =============================================================================
// REGISTER RESPONSE
// =============================================================================

/// Result of `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub id: Option<u64>,
    /// First step whose answers are incomplete.
    pub step: Option<StepId>,
    pub error: Option<String>,
}

impl RegisterResponse {
    pub fn success(id: RegistrationId) -> Self {
        Self {
            success: true,
            id: Some(id.0),
            step: None,
            error: None,
        }
    }

    pub fn incomplete(step: StepId) -> Self {
        Self {
            success: false,
            id: None,
            step: Some(step),
            error: Some(format!("Incomplete answers for step: {}", step)),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            step: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// CONFIRMATION RESPONSE
// =============================================================================

/// A selected activity on the confirmation page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedActivity {
    pub id: ActivityId,
    pub display: String,
}

/// Public summary of a stored registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub lounge_access: bool,
    pub activities: Vec<ConfirmedActivity>,
}

impl From<&RegistrationRecord> for Confirmation {
    fn from(record: &RegistrationRecord) -> Self {
        let registration = &record.registration;
        Self {
            id: record.id.0,
            created_at: record.created_at,
            name: registration.contact.full_name(),
            email: registration.contact.email.clone(),
            lounge_access: has_lounge_access(&registration.profile),
            activities: registration
                .activities
                .selected()
                .map(|id| ConfirmedActivity {
                    id,
                    display: activity_display_string(activity(id)),
                })
                .collect(),
        }
    }
}

/// Result of `GET /registration/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    pub success: bool,
    pub registration: Option<Confirmation>,
    pub error: Option<String>,
}

impl ConfirmationResponse {
    pub fn success(record: &RegistrationRecord) -> Self {
        Self {
            success: true,
            registration: Some(Confirmation::from(record)),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            registration: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// CALENDAR RESPONSE
// =============================================================================

/// Calendar export for one activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub success: bool,
    pub event: Option<CalendarEvent>,
    pub ics: Option<String>,
    pub file_name: Option<String>,
    pub google_url: Option<String>,
    pub outlook_url: Option<String>,
    pub error: Option<String>,
}

impl CalendarResponse {
    pub fn success(event: CalendarEvent) -> Self {
        Self {
            success: true,
            ics: Some(event.to_ics()),
            file_name: Some(event.file_name()),
            google_url: Some(event.google_calendar_url()),
            outlook_url: Some(event.outlook_url()),
            event: Some(event),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            event: None,
            ics: None,
            file_name: None,
            google_url: None,
            outlook_url: None,
            error: Some(msg.into()),
        }
    }
}

/// Query string of `GET /calendar/{activity_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    /// `ics` returns the raw `text/calendar` file instead of JSON.
    pub format: Option<String>,
}

// =============================================================================
// ADMIN RESPONSES
// =============================================================================

/// Result of `GET /admin/registrations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationListResponse {
    pub success: bool,
    pub count: usize,
    pub registrations: Vec<RegistrationRecord>,
    pub error: Option<String>,
}

impl RegistrationListResponse {
    pub fn success(registrations: Vec<RegistrationRecord>) -> Self {
        Self {
            success: true,
            count: registrations.len(),
            registrations,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            registrations: Vec::new(),
            error: Some(msg.into()),
        }
    }
}

/// Result of the single-record admin routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    pub registration: Option<RegistrationRecord>,
    pub error: Option<String>,
}

impl RecordResponse {
    pub fn success(record: RegistrationRecord) -> Self {
        Self {
            success: true,
            registration: Some(record),
            error: None,
        }
    }

    pub fn deleted() -> Self {
        Self {
            success: true,
            registration: None,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            registration: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// INPUT VALIDATION
// =============================================================================

/// Reject answers longer than the input limits.
///
/// Runs at the API and CLI boundary before anything reaches the store.
pub fn check_text_lengths(form: &RegistrationForm) -> Result<(), ExperienceError> {
    let contact = &form.contact;
    let short = [
        ("first_name", &contact.first_name),
        ("last_name", &contact.last_name),
        ("email", &contact.email),
        ("company", &contact.company),
        ("title", &contact.title),
    ];
    let long = [
        ("biggest_challenge", &form.chro_track.biggest_challenge),
        ("win_to_share", &form.chro_track.win_to_share),
        ("dietary_other", &form.logistics.dietary_other),
    ];

    let limited = short
        .iter()
        .map(|(field, value)| (*field, *value, MAX_SHORT_TEXT_LENGTH))
        .chain(
            long.iter()
                .map(|(field, value)| (*field, *value, MAX_LONG_TEXT_LENGTH)),
        );

    for (field, value, max) in limited {
        if value.len() > max {
            return Err(ExperienceError::InvalidInput(format!(
                "{} length {} exceeds maximum {} bytes",
                field,
                value.len(),
                max
            )));
        }
    }
    Ok(())
}
