#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use couture_api::auth::{generate_token, Claims};
use couture_api::config::AppConfig;
use couture_api::database::MemoryDocumentStore;
use couture_api::identity::IdentityToolkitClient;
use couture_api::services::{CloudinaryClient, UploadCredentials, UploadSigner};
use couture_api::{app, AppState};

pub const JWT_SECRET: &str = "integration-secret";
pub const BOOTSTRAP_EMAIL: &str = "admin@couturefusion.com";
pub const UPLOAD_SECRET: &str = "test-secret";

/// Bind a free local port and serve `router` on it for the lifetime of the test runtime
async fn serve(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

/// Stand-in for the Identity Toolkit `accounts:lookup` endpoint
#[derive(Clone, Default)]
pub struct FakeIdentityProvider {
    accounts: Arc<HashMap<String, String>>,
    down: Arc<AtomicBool>,
}

impl FakeIdentityProvider {
    pub fn new(accounts: &[(&str, &str)]) -> Self {
        let accounts = accounts
            .iter()
            .map(|(uid, email)| (uid.to_string(), email.to_string()))
            .collect();
        Self {
            accounts: Arc::new(accounts),
            down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub async fn start(&self) -> Result<String> {
        let router = Router::new().fallback(identity_lookup).with_state(self.clone());
        serve(router).await
    }
}

async fn identity_lookup(State(provider): State<FakeIdentityProvider>, Json(body): Json<Value>) -> impl IntoResponse {
    if provider.down.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "unavailable" })));
    }

    let wanted = |field: &str| -> Vec<String> {
        body.get(field)
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    };
    let ids = wanted("localId");
    // Lookups by email ignore case, like the real provider
    let emails: Vec<String> = wanted("email").iter().map(|e| e.to_lowercase()).collect();

    let users: Vec<Value> = provider
        .accounts
        .iter()
        .filter(|(uid, email)| ids.contains(uid) || emails.contains(&email.to_lowercase()))
        .map(|(uid, email)| json!({ "localId": uid, "email": email }))
        .collect();

    // The real service omits `users` entirely when nothing matches
    if users.is_empty() {
        (StatusCode::OK, Json(json!({ "kind": "identitytoolkit#GetAccountInfoResponse" })))
    } else {
        (StatusCode::OK, Json(json!({ "users": users })))
    }
}

/// `Authorization` header for api key `123456789` and secret `test-secret`
pub const UPLOAD_BASIC_AUTH: &str = "Basic MTIzNDU2Nzg5OnRlc3Qtc2VjcmV0";

/// Stand-in for the Cloudinary Admin API usage endpoint
pub async fn start_fake_cloudinary() -> Result<String> {
    let router = Router::new().fallback(|headers: HeaderMap| async move {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == UPLOAD_BASIC_AUTH)
            .unwrap_or(false);

        if authorized {
            (StatusCode::OK, Json(json!({ "plan": "Free" })))
        } else {
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": { "message": "Invalid credentials" } })))
        }
    });
    serve(router).await
}

/// A running API wired to fake providers and an in-memory store
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub config: AppConfig,
    pub identity: FakeIdentityProvider,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer token for an identity-provider uid
    pub fn token_for(&self, subject: &str) -> String {
        let claims = Claims::new(&self.config.auth, subject, 1);
        generate_token(&self.config.auth, &claims).expect("failed to sign test token")
    }

    pub async fn check_admin(&self, subject: &str) -> Result<Value> {
        let resp = self
            .client
            .get(self.url("/admin-auth/check-admin"))
            .bearer_auth(self.token_for(subject))
            .send()
            .await?;
        anyhow::ensure!(resp.status().is_success(), "check-admin returned {}", resp.status());
        Ok(resp.json().await?)
    }

    pub async fn set_admin(&self, subject: &str, email: &str, is_admin: bool) -> Result<Value> {
        let resp = self
            .client
            .post(self.url("/admin-auth/set-admin"))
            .bearer_auth(self.token_for(subject))
            .json(&json!({ "email": email, "is_admin": is_admin }))
            .send()
            .await?;
        anyhow::ensure!(resp.status().is_success(), "set-admin returned {}", resp.status());
        Ok(resp.json().await?)
    }
}

pub struct TestAppBuilder {
    accounts: Vec<(&'static str, &'static str)>,
    bootstrap_enabled: bool,
    bootstrap_token: Option<String>,
    upload_url: Option<String>,
    upload_secret: String,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            bootstrap_enabled: true,
            bootstrap_token: None,
            upload_url: None,
            upload_secret: UPLOAD_SECRET.to_string(),
        }
    }

    pub fn account(mut self, subject: &'static str, email: &'static str) -> Self {
        self.accounts.push((subject, email));
        self
    }

    pub fn bootstrap(mut self, enabled: bool, token: Option<&str>) -> Self {
        self.bootstrap_enabled = enabled;
        self.bootstrap_token = token.map(str::to_string);
        self
    }

    pub fn upload_api(mut self, url: String) -> Self {
        self.upload_url = Some(url);
        self
    }

    pub fn upload_secret(mut self, secret: &str) -> Self {
        self.upload_secret = secret.to_string();
        self
    }

    pub async fn spawn(self) -> Result<TestApp> {
        let identity = FakeIdentityProvider::new(&self.accounts);
        let identity_url = identity.start().await?;

        let mut config = AppConfig::development();
        config.auth.jwt_secret = JWT_SECRET.to_string();
        config.identity.api_url = identity_url;
        config.identity.project_id = "couture-test".to_string();
        config.identity.timeout_secs = 2;
        config.admin.bootstrap_enabled = self.bootstrap_enabled;
        config.admin.bootstrap_token = self.bootstrap_token;
        config.upload.cloud_name = "couture".to_string();
        config.upload.api_key = "123456789".to_string();
        config.upload.api_secret = self.upload_secret;
        config.upload.timeout_secs = 2;
        if let Some(url) = self.upload_url {
            config.upload.api_url = url;
        }

        let state = AppState::new(
            Arc::new(IdentityToolkitClient::new(&config.identity)?),
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(CloudinaryClient::new(&config.upload)?),
            UploadSigner::new(UploadCredentials::from(&config.upload)),
            &config,
        );
        let base_url = serve(app(state, &config)).await?;

        Ok(TestApp {
            base_url,
            client: reqwest::Client::new(),
            config,
            identity,
        })
    }
}
