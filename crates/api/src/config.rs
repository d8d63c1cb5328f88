//! Application configuration loaded from environment variables.

use common::ProductId;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `JWT_SECRET` — symmetric signing secret for auth and access tokens
/// - `POS_MODULE_ID` — UUID of the POS product (optional; unset disables
///   access-token issuance)
/// - `DASHBOARD_URL` — base URL access tokens are appended to
/// - `DATABASE_URL` — PostgreSQL connection string (optional; unset runs
///   against the in-memory store)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub pos_module_id: Option<ProductId>,
    pub dashboard_url: String,
    pub database_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "development-secret".to_string()),
            pos_module_id: std::env::var("POS_MODULE_ID")
                .ok()
                .and_then(|id| id.parse().ok()),
            dashboard_url: std::env::var("DASHBOARD_URL")
                .unwrap_or_else(|_| "https://pos.example.com".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            jwt_secret: "development-secret".to_string(),
            pos_module_id: None,
            dashboard_url: "https://pos.example.com".to_string(),
            database_url: None,
        }
    }
}
