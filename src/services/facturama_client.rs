// ============================================================================
// FACTURAMA CLIENT
// ============================================================================
//
// Endpoints used:
// - POST /3/cfdis                          create a CFDI 4.0
// - GET  /cfdi?type=issued&...             list issued CFDIs
// - GET  /cfdi/{format}/{type}/{id}        file download (base64 envelope)
//
// ============================================================================

use async_trait::async_trait;
use shared::{Result, ServiceClient, UpstreamCredentials, UpstreamResponse};
use std::time::Duration;

use crate::api::cfdi::models::{CfdiListQuery, FileFormat};
use crate::models::cfdi::CfdiRequest;

/// The three upstream calls the proxy needs. Handlers only see this trait.
#[async_trait]
pub trait InvoicingClient: Send + Sync {
    async fn create_cfdi(&self, request: &CfdiRequest) -> Result<UpstreamResponse>;

    async fn list_cfdis(&self, filters: &CfdiListQuery) -> Result<UpstreamResponse>;

    async fn fetch_file(&self, format: FileFormat, cfdi_type: &str, id: &str) -> Result<UpstreamResponse>;
}

#[derive(Debug, Clone)]
pub struct FacturamaClient {
    client: ServiceClient,
}

impl FacturamaClient {
    pub fn new(credentials: UpstreamCredentials, service_name: &str, timeout: Duration) -> Result<Self> {
        let client = ServiceClient::new(credentials, service_name, timeout)?;
        Ok(Self { client })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl InvoicingClient for FacturamaClient {
    async fn create_cfdi(&self, request: &CfdiRequest) -> Result<UpstreamResponse> {
        let body = serde_json::to_vec(request)?;
        tracing::info!(
            "Creating CFDI for receiver {} ({} items) via {}",
            request.receiver.rfc,
            request.items.len(),
            self.client.service_name()
        );
        self.client.post_json("/3/cfdis", body).await
    }

    async fn list_cfdis(&self, filters: &CfdiListQuery) -> Result<UpstreamResponse> {
        let endpoint = format!("/cfdi?{}", filters.upstream_query());
        self.client.get(&endpoint, Some("application/json")).await
    }

    async fn fetch_file(&self, format: FileFormat, cfdi_type: &str, id: &str) -> Result<UpstreamResponse> {
        let endpoint = format!(
            "/cfdi/{}/{}/{}",
            format,
            urlencoding::encode(cfdi_type),
            urlencoding::encode(id)
        );
        self.client.get(&endpoint, None).await
    }
}
