//! Application configuration.
//!
//! The configuration is assembled once at startup and shared read-only
//! (behind an `Arc`) with every service and handler.

use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Site presentation settings.
    #[serde(default)]
    pub site: SiteConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this site.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Site presentation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Number of posts on one feed page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// IANA time zone that defines the "today" visitor window.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Where unauthenticated visitors are sent.
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Prefix for uploaded post images.
    #[serde(default = "default_media_url")]
    pub media_url: String,
}

/// Authentication settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Name of the cookie carrying the access token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_page_size() -> u64 {
    6
}

fn default_time_zone() -> String {
    "Europe/Moscow".to_string()
}

fn default_login_url() -> String {
    "/auth/login/".to_string()
}

fn default_media_url() -> String {
    "/media/".to_string()
}

fn default_cookie_name() -> String {
    "yatube_token".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            time_zone: default_time_zone(),
            login_url: default_login_url(),
            media_url: default_media_url(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `YATUBE_ENV`)
    /// 3. Environment variables with `YATUBE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("YATUBE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("YATUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("YATUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration suitable for tests and local tooling.
    #[must_use]
    pub fn with_database_url(url: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                url: "http://localhost:8000".to_string(),
            },
            database: DatabaseConfig {
                url: url.into(),
                max_connections: 1,
                min_connections: 1,
            },
            site: SiteConfig::default(),
            auth: AuthConfig::default(),
        }
    }

    /// The configured site time zone.
    pub fn time_zone(&self) -> Result<Tz, AppError> {
        self.site
            .time_zone
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("invalid time zone {:?}: {e}", self.site.time_zone)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_site_defaults() {
        let site = SiteConfig::default();
        assert_eq!(site.page_size, 6);
        assert_eq!(site.login_url, "/auth/login/");
        assert_eq!(site.time_zone, "Europe/Moscow");
    }

    #[test]
    fn test_time_zone_parses() {
        let config = Config::with_database_url("sqlite::memory:");
        assert_eq!(config.time_zone().unwrap(), chrono_tz::Europe::Moscow);
    }

    #[test]
    fn test_invalid_time_zone_is_config_error() {
        let mut config = Config::with_database_url("sqlite::memory:");
        config.site.time_zone = "Mars/Olympus".to_string();
        assert!(matches!(config.time_zone(), Err(AppError::Config(_))));
    }
}
