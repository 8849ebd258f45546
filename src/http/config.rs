//! HTTP Server Configuration
//!
//! Bind address plus the application settings resolved from the
//! environment at boot: JWT signing material, the public base URL used
//! in reset emails, SMTP credentials and the upload directory.

use std::env;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::{EmailConfig, JwtConfig};

/// HTTP server bind configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    /// Public base URL used when rendering reset links
    pub base_url: String,
    /// SMTP settings; absent means emails are logged, not sent
    pub email: Option<EmailConfig>,
    /// Root directory for uploaded files
    pub upload_root: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            jwt: JwtConfig::default(),
            base_url: "http://localhost:3000".to_string(),
            email: None,
            upload_root: "public".to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = AppConfig::default();

        if let Ok(host) = env::var("HOST") {
            config.server.host = host;
        }
        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.server.port = port;
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            config.jwt.secret = secret;
        }
        if let Some(days) = env::var("JWT_TTL_DAYS").ok().and_then(|d| d.parse().ok()) {
            config.jwt.ttl = Duration::days(days);
        }
        if let Ok(base_url) = env::var("BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(root) = env::var("UPLOAD_DIR") {
            config.upload_root = root;
        }

        if let Ok(smtp_host) = env::var("SMTP_HOST") {
            let mut email = EmailConfig {
                smtp_host,
                ..EmailConfig::default()
            };
            if let Some(port) = env::var("SMTP_PORT").ok().and_then(|p| p.parse().ok()) {
                email.smtp_port = port;
            }
            if let Ok(user) = env::var("SMTP_USERNAME") {
                email.smtp_user = user;
            }
            if let Ok(password) = env::var("SMTP_PASSWORD") {
                email.smtp_password = password;
            }
            if let Ok(from) = env::var("EMAIL_FROM") {
                email.from_email = from;
            }
            config.email = Some(email);
        }

        config
    }
}
