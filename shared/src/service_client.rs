//! HTTP client for upstream API communication

use crate::{config::UpstreamCredentials, error::AppError, Result};
use bytes::Bytes;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use std::time::Duration;

/// An upstream reply kept as-is so it can be relayed without reshaping.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.as_u16() >= 400
    }
}

#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    credentials: UpstreamCredentials,
    service_name: String,
}

impl ServiceClient {
    pub fn new(credentials: UpstreamCredentials, service_name: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("facturama-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            service_name: service_name.into(),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn base_url(&self) -> &str {
        &self.credentials.base_url
    }

    /// GET `endpoint` (path plus optional query) with basic auth.
    pub async fn get(&self, endpoint: &str, accept: Option<&str>) -> Result<UpstreamResponse> {
        let url = format!("{}{}", self.credentials.base_url, endpoint);

        let mut request = self.authorized(self.client.get(&url));
        if let Some(accept) = accept {
            request = request.header(header::ACCEPT, accept);
        }

        self.send(request).await
    }

    /// POST an already serialized JSON document with basic auth.
    pub async fn post_json(&self, endpoint: &str, body: Vec<u8>) -> Result<UpstreamResponse> {
        let url = format!("{}{}", self.credentials.base_url, endpoint);

        let request = self
            .authorized(self.client.post(&url))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);

        self.send(request).await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    async fn send(&self, request: RequestBuilder) -> Result<UpstreamResponse> {
        let request = request
            .build()
            .map_err(|e| AppError::request_build(e.to_string()))?;

        tracing::debug!("{} {} {}", self.service_name, request.method(), request.url().path());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if status.as_u16() >= 400 {
            tracing::warn!("{} answered HTTP {}", self.service_name, status);
        }

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }

    /// Map reqwest errors to AppError
    fn map_reqwest_error(&self, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::timeout(format!("Request to {} timed out", self.service_name))
        } else if error.is_builder() {
            AppError::request_build(error.to_string())
        } else {
            tracing::error!("Request to {} failed: {}", self.service_name, error);
            AppError::upstream_unavailable(&self.service_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};
    use wiremock::{
        matchers::{body_string, header as header_eq, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer, timeout: Duration) -> ServiceClient {
        ServiceClient::new(
            UpstreamCredentials {
                base_url: server.uri(),
                username: "facturama".to_string(),
                password: "secreto".to_string(),
            },
            "Facturama",
            timeout,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sends_basic_auth_and_keeps_raw_reply() {
        let server = MockServer::start().await;
        let expected_auth = format!(
            "Basic {}",
            general_purpose::STANDARD.encode("facturama:secreto")
        );

        Mock::given(method("POST"))
            .and(path("/3/cfdis"))
            .and(header_eq("authorization", expected_auth.as_str()))
            .and(header_eq("content-type", "application/json"))
            .and(body_string(r#"{"a":1}"#))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"Id":"abc"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let reply = client.post_json("/3/cfdis", br#"{"a":1}"#.to_vec()).await.unwrap();

        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.content_type.as_deref(), Some("application/json"));
        assert_eq!(&reply.body[..], br#"{"Id":"abc"}"#);
        assert!(!reply.is_error());
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cfdi"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Authorization has been denied"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let reply = client.get("/cfdi?type=issued", Some("application/json")).await.unwrap();

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert!(reply.is_error());
        assert_eq!(&reply.body[..], b"Authorization has been denied");
    }

    #[tokio::test]
    async fn slow_upstream_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(50));
        let err = client.get("/cfdi", None).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout { .. }));
    }

    #[tokio::test]
    async fn unreachable_upstream_maps_to_unavailable() {
        let client = ServiceClient::new(
            UpstreamCredentials {
                base_url: "http://127.0.0.1:1".to_string(),
                username: "u".to_string(),
                password: "p".to_string(),
            },
            "Facturama",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.get("/cfdi", None).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamUnavailable { .. }));
    }
}
