use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, AuthConfig, SecurityConfig};
use crate::database::{self, DocumentStore};
use crate::handlers;
use crate::identity::{IdentityError, IdentityResolver, IdentityToolkitClient};
use crate::middleware::{bootstrap_gate_middleware, subject_auth_middleware, BootstrapGate};
use crate::services::{
    AdminRegistry, CloudinaryClient, DocumentAdminStore, UploadCredentials, UploadProvider, UploadSigner,
};

/// Shared per-process handles. Everything behind these is request-scoped or external.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AdminRegistry>,
    pub signer: Arc<UploadSigner>,
    pub upload_provider: Arc<dyn UploadProvider>,
    pub documents: Arc<dyn DocumentStore>,
    pub auth: Arc<AuthConfig>,
    pub bootstrap_gate: Arc<BootstrapGate>,
}

impl AppState {
    /// Wire the production collaborators described by `config`.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let documents = database::open_document_store(&config.storage).await?;

        let identity: Arc<dyn IdentityResolver> = match IdentityToolkitClient::new(&config.identity) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::warn!("Identity provider not available ({}); admin checks will fail soft", e);
                Arc::new(UnconfiguredIdentity(e.to_string()))
            }
        };

        let upload_provider = Arc::new(CloudinaryClient::new(&config.upload)?);
        let credentials = UploadCredentials::from(&config.upload);
        if !credentials.is_complete() {
            tracing::warn!("Cloudinary credentials incomplete; issued signatures will be rejected by the provider");
        }

        Ok(Self::new(
            identity,
            documents,
            upload_provider,
            UploadSigner::new(credentials),
            config,
        ))
    }

    /// Assemble state from explicit collaborators.
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        documents: Arc<dyn DocumentStore>,
        upload_provider: Arc<dyn UploadProvider>,
        signer: UploadSigner,
        config: &AppConfig,
    ) -> Self {
        let admin_store = Arc::new(DocumentAdminStore::new(documents.clone()));
        let registry = AdminRegistry::new(identity, admin_store, config.admin.bootstrap_email.clone());

        Self {
            registry: Arc::new(registry),
            signer: Arc::new(signer),
            upload_provider,
            documents,
            auth: Arc::new(config.auth.clone()),
            bootstrap_gate: Arc::new(BootstrapGate::from(&config.admin)),
        }
    }
}

/// Stand-in resolver when the identity provider is not configured.
struct UnconfiguredIdentity(String);

#[async_trait::async_trait]
impl IdentityResolver for UnconfiguredIdentity {
    async fn resolve_email_by_subject(&self, _subject: &str) -> Result<String, IdentityError> {
        Err(IdentityError::Misconfigured(self.0.clone()))
    }

    async fn email_exists(&self, _email: &str) -> Result<bool, IdentityError> {
        Err(IdentityError::Misconfigured(self.0.clone()))
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(cloudinary_routes())
        .merge(admin_bootstrap_routes(&state))
        // Subject token required
        .merge(admin_auth_routes(&state))
        .with_state(state)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs))),
        )
        .layer(cors_layer(&config.security))
}

fn cloudinary_routes() -> Router<AppState> {
    use handlers::public::cloudinary;

    Router::new()
        .route("/cloudinary/status", get(cloudinary::cloudinary_status))
        .route("/cloudinary/generate-signature", post(cloudinary::generate_signature))
}

fn admin_bootstrap_routes(state: &AppState) -> Router<AppState> {
    use handlers::public::admin_bootstrap;

    Router::new()
        .route(
            "/admin-auth/register-firebase-admin",
            post(admin_bootstrap::register_firebase_admin),
        )
        .route_layer(middleware::from_fn_with_state(
            state.bootstrap_gate.clone(),
            bootstrap_gate_middleware,
        ))
}

fn admin_auth_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected::admin_auth;

    Router::new()
        .route("/admin-auth/check-admin", get(admin_auth::check_admin))
        .route("/admin-auth/set-admin", post(admin_auth::set_admin))
        .route_layer(middleware::from_fn_with_state(state.auth.clone(), subject_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Couture Fusion API",
        "version": version,
        "endpoints": {
            "check_admin": "GET /admin-auth/check-admin (subject token)",
            "set_admin": "POST /admin-auth/set-admin (subject token)",
            "register_admin": "POST /admin-auth/register-firebase-admin (automation)",
            "upload_status": "GET /cloudinary/status",
            "upload_signature": "POST /cloudinary/generate-signature",
            "health": "GET /health",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.documents.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}
