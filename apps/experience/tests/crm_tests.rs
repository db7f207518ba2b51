//! Integration tests for the HubSpot contact sync against a mock CRM.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::{TimeZone, Utc};
use experience::crm::{ContactSync, CrmError, HubSpotSync, SyncOutcome, sync_best_effort};
use experience_core::{
    ActivityId, Answer, ContactInfo, Logistics, RegistrantProfile, Registration, RegistrationId,
    RegistrationRecord,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "pat-test-token";

fn record() -> RegistrationRecord {
    RegistrationRecord {
        id: RegistrationId(8),
        created_at: Utc.with_ymd_and_hms(2026, 1, 20, 9, 0, 0).single().unwrap(),
        registration: Registration {
            contact: ContactInfo {
                first_name: "Alex".to_string(),
                last_name: "Moreno".to_string(),
                email: "alex@tailspin.test".to_string(),
                company: "Tailspin".to_string(),
                title: "CEO".to_string(),
            },
            profile: RegistrantProfile::new()
                .with_chro(Answer::No)
                .with_exec_member(Answer::Yes),
            chro_track: None,
            activities: [ActivityId::VipDinnerTue].into_iter().collect(),
            logistics: Logistics {
                staying_at_venue: Answer::No,
                ..Logistics::default()
            },
        },
    }
}

fn client(server: &MockServer) -> HubSpotSync {
    HubSpotSync::new(&server.uri(), TOKEN, 5).unwrap()
}

#[tokio::test]
async fn creates_new_contact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(body_partial_json(json!({
            "properties": {
                "email": "alex@tailspin.test",
                "is_chro": "No",
                "is_exec_member": "Yes",
                "company_size": "Not specified",
                "transform_2026_registered": "Yes",
                "registration_date": "2026-01-20"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "5501"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(&server).sync_contact(&record()).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Created("5501".to_string()));
}

#[tokio::test]
async fn conflict_updates_existing_contact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"category": "CONFLICT"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts/search"))
        .and(body_partial_json(json!({
            "filterGroups": [{"filters": [{
                "propertyName": "email",
                "operator": "EQ",
                "value": "alex@tailspin.test"
            }]}],
            "limit": 1
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total": 1, "results": [{"id": "77"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/crm/v3/objects/contacts/77"))
        .and(body_partial_json(json!({"properties": {"jobtitle": "CEO"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "77"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(&server).sync_contact(&record()).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Updated("77".to_string()));
}

#[tokio::test]
async fn conflict_without_match_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "results": []})))
        .mount(&server)
        .await;

    let outcome = client(&server).sync_contact(&record()).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Skipped(_)));
}

#[tokio::test]
async fn unauthorized_token_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client(&server).sync_contact(&record()).await;
    assert!(matches!(result, Err(CrmError::Unauthorized)));
}

#[tokio::test]
async fn server_error_is_reported_and_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(2)
        .mount(&server)
        .await;

    let sync = client(&server);
    let result = sync.sync_contact(&record()).await;
    assert!(matches!(result, Err(CrmError::Rejected(503, _))));

    // The best-effort wrapper logs and returns.
    sync_best_effort(&sync, &record()).await;
}

#[tokio::test]
async fn unreachable_crm_is_a_connection_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let sync = HubSpotSync::new(&uri, TOKEN, 1).unwrap();
    let result = sync.sync_contact(&record()).await;
    assert!(matches!(result, Err(CrmError::ConnectionFailed(_))));
}
