use crate::services::{FacturamaClient, InvoicingClient};
use shared::Config;
use std::sync::Arc;
use std::time::Duration;

/// Estado compartido de la aplicación.
/// Read-only after startup: upstream clients plus the request deadline.
#[derive(Clone)]
pub struct AppState {
    pub facturama: Arc<dyn InvoicingClient>,
    pub facturama_sandbox: Option<Arc<dyn InvoicingClient>>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let request_timeout = config.request_timeout();

        let facturama = FacturamaClient::new(
            config.facturama.production.clone(),
            "Facturama",
            request_timeout,
        )?;
        tracing::info!("✅ Facturama client ready ({})", facturama.base_url());

        let facturama_sandbox = match &config.facturama.sandbox {
            Some(credentials) => {
                let sandbox = FacturamaClient::new(credentials.clone(), "Facturama sandbox", request_timeout)?;
                tracing::info!("✅ Facturama sandbox client ready ({})", sandbox.base_url());
                Some(Arc::new(sandbox) as Arc<dyn InvoicingClient>)
            }
            None => {
                tracing::info!("ℹ️ Sandbox credentials not set. /api/sandbox/cfdi will answer 503.");
                None
            }
        };

        Ok(Self::with_clients(Arc::new(facturama), facturama_sandbox, request_timeout))
    }

    pub fn with_clients(
        facturama: Arc<dyn InvoicingClient>,
        facturama_sandbox: Option<Arc<dyn InvoicingClient>>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            facturama,
            facturama_sandbox,
            request_timeout,
        }
    }
}
