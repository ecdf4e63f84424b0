use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub upload: UploadConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub token_expiry_hours: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub api_url: String,
    pub project_id: String,
    #[serde(skip_serializing)]
    pub service_token: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(skip_serializing)]
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub bootstrap_email: String,
    pub bootstrap_enabled: bool,
    #[serde(skip_serializing)]
    pub bootstrap_token: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub cloud_name: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    pub api_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

// Secrets stay out of logs: these Debug impls only report whether a value is set.

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &redacted(&self.jwt_secret))
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("token_expiry_hours", &self.token_expiry_hours)
            .finish()
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_url", &self.api_url)
            .field("project_id", &self.project_id)
            .field("service_token", &redacted(&self.service_token))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("database_url", &self.database_url.as_deref().map(redacted))
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("bootstrap_email", &self.bootstrap_email)
            .field("bootstrap_enabled", &self.bootstrap_enabled)
            .field("bootstrap_token", &self.bootstrap_token.as_deref().map(redacted))
            .finish()
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &redacted(&self.api_secret))
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

pub const DEFAULT_BOOTSTRAP_EMAIL: &str = "admin@couturefusion.com";
pub const DEFAULT_IDENTITY_API_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_UPLOAD_API_URL: &str = "https://api.cloudinary.com";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("COUTURE_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = v.parse().unwrap_or(self.server.request_timeout_secs);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        self.auth.jwt_issuer = non_empty_var("AUTH_JWT_ISSUER").or(self.auth.jwt_issuer);
        self.auth.jwt_audience = non_empty_var("AUTH_JWT_AUDIENCE").or(self.auth.jwt_audience);
        if let Ok(v) = env::var("AUTH_TOKEN_EXPIRY_HOURS") {
            self.auth.token_expiry_hours = v.parse().unwrap_or(self.auth.token_expiry_hours);
        }

        // Identity provider overrides
        if let Some(v) = non_empty_var("IDENTITY_API_URL") {
            self.identity.api_url = v;
        }
        if let Ok(v) = env::var("IDENTITY_PROJECT_ID") {
            self.identity.project_id = v;
        }
        if let Ok(v) = env::var("IDENTITY_SERVICE_TOKEN") {
            self.identity.service_token = v;
        }
        if let Ok(v) = env::var("IDENTITY_TIMEOUT_SECS") {
            self.identity.timeout_secs = v.parse().unwrap_or(self.identity.timeout_secs);
        }

        // Storage overrides
        self.storage.database_url = non_empty_var("DATABASE_URL").or(self.storage.database_url);
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.storage.max_connections = v.parse().unwrap_or(self.storage.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.storage.connect_timeout_secs = v.parse().unwrap_or(self.storage.connect_timeout_secs);
        }

        // Admin overrides
        if let Some(v) = non_empty_var("ADMIN_BOOTSTRAP_EMAIL") {
            self.admin.bootstrap_email = v;
        }
        if let Ok(v) = env::var("ADMIN_BOOTSTRAP_ENABLED") {
            self.admin.bootstrap_enabled = v.parse().unwrap_or(self.admin.bootstrap_enabled);
        }
        self.admin.bootstrap_token = non_empty_var("ADMIN_BOOTSTRAP_TOKEN").or(self.admin.bootstrap_token);

        // Upload provider overrides
        if let Ok(v) = env::var("CLOUDINARY_CLOUD_NAME") {
            self.upload.cloud_name = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_KEY") {
            self.upload.api_key = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_API_SECRET") {
            self.upload.api_secret = v;
        }
        if let Some(v) = non_empty_var("CLOUDINARY_API_URL") {
            self.upload.api_url = v;
        }
        if let Ok(v) = env::var("CLOUDINARY_TIMEOUT_SECS") {
            self.upload.timeout_secs = v.parse().unwrap_or(self.upload.timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = parse_list(&v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                request_timeout_secs: 30,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_issuer: None,
                jwt_audience: None,
                token_expiry_hours: 24 * 7, // 1 week
            },
            identity: IdentityConfig::defaults(10),
            storage: StorageConfig {
                database_url: None,
                max_connections: 5,
                connect_timeout_secs: 30,
            },
            admin: AdminConfig {
                bootstrap_email: DEFAULT_BOOTSTRAP_EMAIL.to_string(),
                bootstrap_enabled: true,
                bootstrap_token: None,
            },
            upload: UploadConfig::defaults(10),
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                request_timeout_secs: 20,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_issuer: None,
                jwt_audience: None,
                token_expiry_hours: 24,
            },
            identity: IdentityConfig::defaults(5),
            storage: StorageConfig {
                database_url: None,
                max_connections: 10,
                connect_timeout_secs: 10,
            },
            admin: AdminConfig {
                bootstrap_email: DEFAULT_BOOTSTRAP_EMAIL.to_string(),
                bootstrap_enabled: true,
                bootstrap_token: None,
            },
            upload: UploadConfig::defaults(5),
            security: SecurityConfig {
                cors_origins: vec!["https://staging.couturefusion.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                request_timeout_secs: 15,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_issuer: None,
                jwt_audience: None,
                token_expiry_hours: 4,
            },
            identity: IdentityConfig::defaults(5),
            storage: StorageConfig {
                database_url: None,
                max_connections: 20,
                connect_timeout_secs: 5,
            },
            admin: AdminConfig {
                bootstrap_email: DEFAULT_BOOTSTRAP_EMAIL.to_string(),
                bootstrap_enabled: false,
                bootstrap_token: None,
            },
            upload: UploadConfig::defaults(5),
            security: SecurityConfig {
                cors_origins: vec!["https://couturefusion.databutton.app".to_string()],
            },
        }
    }
}

impl IdentityConfig {
    fn defaults(timeout_secs: u64) -> Self {
        Self {
            api_url: DEFAULT_IDENTITY_API_URL.to_string(),
            project_id: String::new(),
            service_token: String::new(),
            timeout_secs,
        }
    }
}

impl UploadConfig {
    fn defaults(timeout_secs: u64) -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            api_url: DEFAULT_UPLOAD_API_URL.to_string(),
            timeout_secs,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Join `path` under a configured base URL. The base is treated as a
/// directory even without a trailing slash, so a proxy prefix is kept.
pub fn endpoint_url(base: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
