use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use sha1::Sha1;
use thiserror::Error;
use url::Url;

use crate::config::{endpoint_url, UploadConfig};

type HmacSha1 = Hmac<Sha1>;

/// Upload provider account. Only `cloud_name` and `api_key` ever leave the server.
#[derive(Clone)]
pub struct UploadCredentials {
    pub cloud_name: String,
    pub api_key: String,
    api_secret: String,
}

impl UploadCredentials {
    pub fn new(cloud_name: impl Into<String>, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl From<&UploadConfig> for UploadCredentials {
    fn from(config: &UploadConfig) -> Self {
        Self::new(&config.cloud_name, &config.api_key, &config.api_secret)
    }
}

impl fmt::Debug for UploadCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// What the client presents to the provider alongside its upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSignatureGrant {
    pub signature: String,
    pub timestamp: i64,
    pub cloud_name: String,
    pub api_key: String,
    pub folder: String,
    pub public_id: Option<String>,
}

/// Sorted `key=value` pairs joined by `&`; the exact bytes that get signed.
pub fn canonical_string(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Debug, Error)]
#[error("upload signing key rejected: {0}")]
pub struct SigningError(String);

/// Lowercase hex HMAC-SHA1 of `payload` under `secret`.
pub fn sign_payload(secret: &str, payload: &str) -> Result<String, SigningError> {
    let mut mac = match HmacSha1::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => return Err(SigningError(e.to_string())),
    };
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn signature_params(timestamp: i64, folder: &str, public_id: Option<&str>) -> BTreeMap<&'static str, String> {
    let mut params = BTreeMap::new();
    params.insert("timestamp", timestamp.to_string());
    params.insert("folder", folder.to_string());
    if let Some(public_id) = public_id {
        params.insert("public_id", public_id.to_string());
    }
    params
}

/// Mints upload signatures. Stateless: the output depends only on the inputs,
/// the timestamp and the secret.
#[derive(Debug, Clone)]
pub struct UploadSigner {
    credentials: UploadCredentials,
}

impl UploadSigner {
    pub fn new(credentials: UploadCredentials) -> Self {
        Self { credentials }
    }

    /// Sign for the current Unix second.
    pub fn issue_signature(&self, folder: &str, public_id: Option<&str>) -> Result<UploadSignatureGrant, SigningError> {
        self.issue_signature_at(folder, public_id, chrono::Utc::now().timestamp())
    }

    /// Sign for an explicit timestamp. An empty `public_id` counts as absent.
    pub fn issue_signature_at(
        &self,
        folder: &str,
        public_id: Option<&str>,
        timestamp: i64,
    ) -> Result<UploadSignatureGrant, SigningError> {
        let public_id = public_id.filter(|id| !id.is_empty());
        let payload = canonical_string(&signature_params(timestamp, folder, public_id));
        let signature = sign_payload(&self.credentials.api_secret, &payload)?;

        tracing::debug!(folder, has_public_id = public_id.is_some(), timestamp, "issued upload signature");

        Ok(UploadSignatureGrant {
            signature,
            timestamp,
            cloud_name: self.credentials.cloud_name.clone(),
            api_key: self.credentials.api_key.clone(),
            folder: folder.to_string(),
            public_id: public_id.map(str::to_string),
        })
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("upload provider credentials are not configured")]
    NotConfigured,
    #[error("upload provider rejected the credentials (status {0})")]
    Rejected(u16),
    #[error("upload provider unreachable: {0}")]
    Unreachable(String),
    #[error("invalid upload provider URL: {0}")]
    InvalidUrl(String),
}

/// Read-only probe of the upload provider account
#[async_trait]
pub trait UploadProvider: Send + Sync {
    async fn ping(&self) -> Result<(), ProviderError>;
}

/// Cloudinary Admin API client; only the usage endpoint is called.
pub struct CloudinaryClient {
    http: Client,
    api_url: String,
    credentials: UploadCredentials,
}

impl CloudinaryClient {
    pub fn new(config: &UploadConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            credentials: UploadCredentials::from(config),
        })
    }

    fn usage_url(&self) -> Result<Url, ProviderError> {
        endpoint_url(&self.api_url, &format!("v1_1/{}/usage", self.credentials.cloud_name))
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl UploadProvider for CloudinaryClient {
    async fn ping(&self) -> Result<(), ProviderError> {
        if !self.credentials.is_complete() {
            return Err(ProviderError::NotConfigured);
        }

        let response = self
            .http
            .get(self.usage_url()?)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .send()
            .await
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::Rejected(response.status().as_u16()))
        }
    }
}
