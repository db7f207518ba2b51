//! # CRM Sync Module
//!
//! Pushes each new registration to the CRM as a contact.
//!
//! Sync is best-effort: a failure is logged and never reaches the registrant.
//! When no access token is configured, `DisabledSync` skips every contact.

mod hubspot;

pub use hubspot::HubSpotSync;

use crate::config::CrmConfig;
use async_trait::async_trait;
use experience_core::{RegistrationRecord, activity};
use serde_json::{Map, Value};
use std::sync::Arc;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors from the CRM client.
#[derive(Debug)]
pub enum CrmError {
    /// Cannot reach the CRM.
    ConnectionFailed(String),
    /// 401/403 from the CRM - token missing scopes or revoked.
    Unauthorized,
    /// 429 Too Many Requests.
    RateLimited,
    /// Any other non-success status.
    Rejected(u16, String),
    /// Failed to parse a response body.
    ParseError(String),
}

impl std::fmt::Display for CrmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed(url) => write!(f, "Cannot connect to CRM at {url}"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid CRM access token"),
            Self::RateLimited => write!(f, "Rate limited by CRM"),
            Self::Rejected(status, msg) => write!(f, "CRM rejected request ({status}): {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for CrmError {}

// =============================================================================
// CONTACT SYNC
// =============================================================================

/// What a sync attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new contact was created.
    Created(String),
    /// An existing contact with the same email was updated.
    Updated(String),
    /// Nothing was sent.
    Skipped(&'static str),
}

/// Destination for registration contacts.
#[async_trait]
pub trait ContactSync: Send + Sync {
    /// Create or update the contact for `record`, keyed by email.
    async fn sync_contact(&self, record: &RegistrationRecord) -> Result<SyncOutcome, CrmError>;
}

/// Sync used when no CRM token is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSync;

#[async_trait]
impl ContactSync for DisabledSync {
    async fn sync_contact(&self, record: &RegistrationRecord) -> Result<SyncOutcome, CrmError> {
        tracing::warn!(
            event = "crm_sync_skipped",
            registration_id = record.id.0,
            "CRM access token not configured, skipping contact sync"
        );
        Ok(SyncOutcome::Skipped("no access token"))
    }
}

/// Build the sync for a CRM configuration.
pub fn from_config(config: &CrmConfig) -> Arc<dyn ContactSync> {
    match config.access_token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => match HubSpotSync::new(&config.base_url, token, config.timeout_secs) {
            Ok(sync) => {
                tracing::info!("CRM sync enabled: {}", config.base_url);
                Arc::new(sync)
            }
            Err(e) => {
                tracing::warn!("CRM client could not be built ({}), sync disabled", e);
                Arc::new(DisabledSync)
            }
        },
        None => {
            tracing::info!("CRM sync disabled: no access token");
            Arc::new(DisabledSync)
        }
    }
}

/// Run a sync and log the result. Never fails.
pub async fn sync_best_effort(sync: &dyn ContactSync, record: &RegistrationRecord) {
    match sync.sync_contact(record).await {
        Ok(SyncOutcome::Created(contact_id)) => {
            tracing::info!(registration_id = record.id.0, %contact_id, "CRM contact created");
        }
        Ok(SyncOutcome::Updated(contact_id)) => {
            tracing::info!(registration_id = record.id.0, %contact_id, "CRM contact updated");
        }
        Ok(SyncOutcome::Skipped(reason)) => {
            tracing::debug!(registration_id = record.id.0, reason, "CRM sync skipped");
        }
        Err(e) => {
            tracing::error!(
                event = "crm_sync_failure",
                registration_id = record.id.0,
                error = %e,
                "CRM sync failed"
            );
        }
    }
}

// =============================================================================
// CONTACT PROPERTIES
// =============================================================================

/// CRM contact properties for a stored registration.
///
/// Property names match the custom properties defined in the CRM portal.
pub fn contact_properties(record: &RegistrationRecord) -> Map<String, Value> {
    let registration = &record.registration;
    let contact = &registration.contact;
    let profile = &registration.profile;
    let logistics = &registration.logistics;

    let selected_activities = registration
        .activities
        .selected()
        .map(|id| activity(id).crm_label)
        .collect::<Vec<_>>()
        .join("; ");
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    let pairs = [
        ("email", contact.email.trim().to_string()),
        ("firstname", contact.first_name.trim().to_string()),
        ("lastname", contact.last_name.trim().to_string()),
        ("company", contact.company.trim().to_string()),
        ("jobtitle", contact.title.trim().to_string()),
        ("is_chro", profile.is_chro().label().to_string()),
        (
            "company_size",
            profile
                .company_size()
                .map_or("Not specified", |size| size.as_str())
                .to_string(),
        ),
        ("is_exec_member", profile.is_exec_member().label().to_string()),
        (
            "staying_at_wynn",
            logistics.staying_at_venue.label().to_string(),
        ),
        ("check_in_date", date(logistics.check_in_date)),
        ("check_out_date", date(logistics.check_out_date)),
        ("dietary_restrictions", logistics.dietary_summary()),
        ("selected_activities", selected_activities),
        ("transform_2026_registered", "Yes".to_string()),
        (
            "registration_date",
            record.created_at.format("%Y-%m-%d").to_string(),
        ),
    ];

    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::String(value)))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use experience_core::{
        ActivityId, Answer, CompanySize, ContactInfo, DietaryRestriction, Logistics,
        RegistrantProfile, Registration, RegistrationId,
    };

    fn record() -> RegistrationRecord {
        RegistrationRecord {
            id: RegistrationId(3),
            created_at: Utc
                .with_ymd_and_hms(2026, 2, 14, 17, 30, 0)
                .single()
                .expect("timestamp"),
            registration: Registration {
                contact: ContactInfo {
                    first_name: " Sam ".to_string(),
                    last_name: "Rivera".to_string(),
                    email: "sam@northwind.test".to_string(),
                    company: "Northwind".to_string(),
                    title: "CHRO".to_string(),
                },
                profile: RegistrantProfile::new()
                    .with_chro(Answer::Yes)
                    .with_company_size(CompanySize::Under5000)
                    .with_exec_member(Answer::No),
                chro_track: None,
                activities: [ActivityId::AiAtWorkMon, ActivityId::ChroTrackSessionTue]
                    .into_iter()
                    .collect(),
                logistics: Logistics {
                    staying_at_venue: Answer::Yes,
                    check_in_date: NaiveDate::from_ymd_opt(2026, 3, 22),
                    check_out_date: NaiveDate::from_ymd_opt(2026, 3, 25),
                    dietary_restrictions: [DietaryRestriction::Vegetarian].into_iter().collect(),
                    dietary_other: String::new(),
                },
            },
        }
    }

    fn prop<'a>(props: &'a Map<String, Value>, key: &str) -> &'a str {
        props.get(key).and_then(Value::as_str).unwrap_or("<missing>")
    }

    #[test]
    fn properties_carry_answers_and_labels() {
        let props = contact_properties(&record());

        assert_eq!(prop(&props, "firstname"), "Sam");
        assert_eq!(prop(&props, "is_chro"), "Yes");
        assert_eq!(prop(&props, "company_size"), "under_5000");
        assert_eq!(prop(&props, "is_exec_member"), "No");
        assert_eq!(prop(&props, "staying_at_wynn"), "Yes");
        assert_eq!(prop(&props, "check_in_date"), "2026-03-22");
        assert_eq!(prop(&props, "dietary_restrictions"), "Vegetarian");
        assert_eq!(
            prop(&props, "selected_activities"),
            format!(
                "{}; {}",
                activity(ActivityId::AiAtWorkMon).crm_label,
                activity(ActivityId::ChroTrackSessionTue).crm_label
            )
        );
        assert_eq!(prop(&props, "transform_2026_registered"), "Yes");
        assert_eq!(prop(&props, "registration_date"), "2026-02-14");
    }

    #[test]
    fn missing_answers_use_placeholders() {
        let mut record = record();
        record.registration.profile = RegistrantProfile::new().with_chro(Answer::No);
        record.registration.logistics = Logistics {
            staying_at_venue: Answer::No,
            ..Logistics::default()
        };
        record.registration.activities = Default::default();

        let props = contact_properties(&record);
        assert_eq!(prop(&props, "company_size"), "Not specified");
        assert_eq!(prop(&props, "check_in_date"), "");
        assert_eq!(prop(&props, "dietary_restrictions"), "None");
        assert_eq!(prop(&props, "selected_activities"), "");
    }

    #[tokio::test]
    async fn disabled_sync_skips() {
        let outcome = DisabledSync.sync_contact(&record()).await.expect("skip");
        assert!(matches!(outcome, SyncOutcome::Skipped(_)));
    }

    #[test]
    fn missing_token_disables_sync() {
        // Building must not fail or panic without a token.
        let _sync = from_config(&CrmConfig::default());
    }
}
