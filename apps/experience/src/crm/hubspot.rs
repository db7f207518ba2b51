//! HubSpot contacts client (CRM v3 objects API).

use super::{ContactSync, CrmError, SyncOutcome, contact_properties};
use async_trait::async_trait;
use experience_core::RegistrationRecord;
use serde_json::{Value, json};
use std::time::Duration;

const CONTACTS_PATH: &str = "/crm/v3/objects/contacts";
const SEARCH_PATH: &str = "/crm/v3/objects/contacts/search";

/// Contact sync against the HubSpot REST API.
#[derive(Clone)]
pub struct HubSpotSync {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl HubSpotSync {
    /// Create a client for `base_url` authenticated with a private-app token.
    pub fn new(base_url: &str, access_token: &str, timeout_secs: u64) -> Result<Self, CrmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| CrmError::ConnectionFailed(format!("{base_url}: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, CrmError> {
        req.send()
            .await
            .map_err(|e| CrmError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Map error statuses and parse a JSON body.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, CrmError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(CrmError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CrmError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CrmError::Rejected(status.as_u16(), body));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| CrmError::ParseError(e.to_string()))
    }

    /// Find the contact id for `email`, if one exists.
    async fn find_by_email(&self, email: &str) -> Result<Option<String>, CrmError> {
        let body = json!({
            "filterGroups": [{
                "filters": [{
                    "propertyName": "email",
                    "operator": "EQ",
                    "value": email,
                }],
            }],
            "properties": ["email"],
            "limit": 1,
        });
        let req = self.request(reqwest::Method::POST, SEARCH_PATH).json(&body);
        let resp = self.send(req).await?;
        let found = self.handle_response(resp).await?;

        Ok(found
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(contact_id))
    }
}

/// Object ids come back as strings, but accept numbers too.
fn contact_id(object: &Value) -> Option<String> {
    match object.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[async_trait]
impl ContactSync for HubSpotSync {
    async fn sync_contact(&self, record: &RegistrationRecord) -> Result<SyncOutcome, CrmError> {
        let mut properties = contact_properties(record);

        let req = self
            .request(reqwest::Method::POST, CONTACTS_PATH)
            .json(&json!({ "properties": properties }));
        let resp = self.send(req).await?;

        if resp.status() != reqwest::StatusCode::CONFLICT {
            let created = self.handle_response(resp).await?;
            let id = contact_id(&created)
                .ok_or_else(|| CrmError::ParseError("contact id missing".to_string()))?;
            return Ok(SyncOutcome::Created(id));
        }

        let email = record.registration.contact.email.trim();
        let Some(id) = self.find_by_email(email).await? else {
            tracing::warn!(
                event = "crm_conflict_unresolved",
                registration_id = record.id.0,
                "CRM reported a conflict but no contact matched the email"
            );
            return Ok(SyncOutcome::Skipped("conflict without matching contact"));
        };

        // The email is the lookup key and stays as stored.
        properties.remove("email");
        let path = format!("{}/{}", CONTACTS_PATH, id);
        let req = self
            .request(reqwest::Method::PATCH, &path)
            .json(&json!({ "properties": properties }));
        let resp = self.send(req).await?;
        self.handle_response(resp).await?;
        Ok(SyncOutcome::Updated(id))
    }
}
