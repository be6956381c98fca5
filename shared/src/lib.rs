//! Shared library for the Facturama proxy
//!
//! - Configuration loaded from the environment
//! - Error type rendered as `{"error": ...}` responses
//! - Basic-auth HTTP client for the upstream API

pub mod config;
pub mod error;
pub mod service_client;

// Re-export commonly used types
pub use config::{Config, UpstreamCredentials};
pub use error::{AppError, ErrorResponse, Result};
pub use service_client::{ServiceClient, UpstreamResponse};
