use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{IdentityError, IdentityResolver};
use crate::config::{endpoint_url, IdentityConfig};

/// Identity Toolkit REST client (`projects/{project}/accounts:lookup`).
#[derive(Clone)]
pub struct IdentityToolkitClient {
    http: Client,
    lookup_url: Url,
    service_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    local_id: Option<[&'a str; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<[&'a str; 1]>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountRecord>,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    #[serde(default)]
    email: Option<String>,
}

impl IdentityToolkitClient {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        if config.project_id.trim().is_empty() {
            return Err(IdentityError::Misconfigured("IDENTITY_PROJECT_ID is not set".to_string()));
        }

        let lookup_url = endpoint_url(
            &config.api_url,
            &format!("v1/projects/{}/accounts:lookup", config.project_id.trim()),
        )
        .map_err(|e| IdentityError::Misconfigured(format!("invalid IDENTITY_API_URL: {}", e)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdentityError::Misconfigured(e.to_string()))?;

        Ok(Self {
            http,
            lookup_url,
            service_token: config.service_token.clone(),
        })
    }

    async fn lookup(&self, request: &LookupRequest<'_>) -> Result<Vec<AccountRecord>, IdentityError> {
        let mut call = self.http.post(self.lookup_url.clone()).json(request);
        if !self.service_token.is_empty() {
            call = call.bearer_auth(&self.service_token);
        }

        let response = call
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let body: LookupResponse = response
                    .json()
                    .await
                    .map_err(|e| IdentityError::Unavailable(format!("malformed lookup response: {}", e)))?;
                Ok(body.users)
            }
            // The toolkit answers 400 USER_NOT_FOUND for unknown ids on some projects
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                let text = response.text().await.unwrap_or_default();
                if text.contains("USER_NOT_FOUND") || text.contains("EMAIL_NOT_FOUND") {
                    Ok(Vec::new())
                } else {
                    Err(IdentityError::Unavailable(format!("lookup rejected: {}", text)))
                }
            }
            status => Err(IdentityError::Unavailable(format!("lookup failed with status {}", status))),
        }
    }
}

#[async_trait]
impl IdentityResolver for IdentityToolkitClient {
    async fn resolve_email_by_subject(&self, subject: &str) -> Result<String, IdentityError> {
        let users = self
            .lookup(&LookupRequest {
                local_id: Some([subject]),
                email: None,
            })
            .await?;

        users
            .into_iter()
            .next()
            .and_then(|account| account.email)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| IdentityError::NotFound(subject.to_string()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, IdentityError> {
        let users = self
            .lookup(&LookupRequest {
                local_id: None,
                email: Some([email]),
            })
            .await?;

        // The provider matches emails case-insensitively and returns its stored form
        Ok(!users.is_empty())
    }
}
