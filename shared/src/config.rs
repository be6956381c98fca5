//! Configuration management for the proxy

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_FACTURAMA_API_URL: &str = "https://api.facturama.mx";
pub const DEFAULT_FACTURAMA_SANDBOX_API_URL: &str = "https://apisandbox.facturama.mx";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub facturama: FacturamaConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacturamaConfig {
    pub production: UpstreamCredentials,
    /// `None` unless both sandbox user and password are set.
    pub sandbox: Option<UpstreamCredentials>,
}

/// Base URL plus the basic-auth pair used against it.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamCredentials {
    pub base_url: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for UpstreamCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamCredentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub log_level: String,
}

impl Config {
    /// Reads the process environment; `.env` loading is left to the binary.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| anyhow::anyhow!("{} must be set", key))
        };

        let production = UpstreamCredentials {
            base_url: trim_base_url(
                var("FACTURAMA_API_URL").unwrap_or_else(|| DEFAULT_FACTURAMA_API_URL.to_string()),
            ),
            username: required("PRODUCTION_FACTURAMA_USER")?,
            password: required("FACTURAMA_PASSWORD")?,
        };

        let sandbox = match (var("SANDBOX_FACTURAMA_USER"), var("SANDBOX_FACTURAMA_PASSWORD")) {
            (Some(username), Some(password)) => Some(UpstreamCredentials {
                base_url: trim_base_url(
                    var("FACTURAMA_SANDBOX_API_URL")
                        .unwrap_or_else(|| DEFAULT_FACTURAMA_SANDBOX_API_URL.to_string()),
                ),
                username,
                password,
            }),
            (None, None) => None,
            _ => {
                anyhow::bail!("SANDBOX_FACTURAMA_USER and SANDBOX_FACTURAMA_PASSWORD must be set together")
            }
        };

        Ok(Config {
            server: ServerConfig {
                port: var("PORT")
                    .unwrap_or_else(|| "8080".to_string())
                    .parse()
                    .map_err(|e| anyhow::anyhow!("PORT is not a valid port: {}", e))?,
                request_timeout_seconds: var("REQUEST_TIMEOUT_SECONDS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .map_err(|e| anyhow::anyhow!("REQUEST_TIMEOUT_SECONDS is not a number: {}", e))?,
            },
            facturama: FacturamaConfig { production, sandbox },
            app: AppConfig {
                environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
                log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            },
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    pub fn sandbox_enabled(&self) -> bool {
        self.facturama.sandbox.is_some()
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
