use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tokio::time::Duration;

use crate::attribution::token::AttributionToken;
use crate::modules::config::{AttributionSettings, UpstreamProxyConfig};

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

/// One HTTP exchange with the attribution endpoint. An `Err` means no HTTP
/// response was obtained at all (DNS, TLS, reset, timeout).
#[async_trait]
pub trait AttributionTransport: Send + Sync {
    async fn post_token(
        &self,
        url: &str,
        token: &AttributionToken,
    ) -> Result<TransportResponse, String>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_settings(settings: &AttributionSettings) -> Result<Self, String> {
        let client = build_client(&settings.upstream_proxy, settings.request_timeout_secs)?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl AttributionTransport for ReqwestTransport {
    async fn post_token(
        &self,
        url: &str,
        token: &AttributionToken,
    ) -> Result<TransportResponse, String> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(token.as_str().to_string())
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        Ok(TransportResponse { status, body })
    }
}

fn build_client(
    upstream_proxy: &UpstreamProxyConfig,
    timeout_secs: u64,
) -> Result<reqwest::Client, String> {
    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(timeout_secs.max(5)));

    if upstream_proxy.enabled && !upstream_proxy.url.is_empty() {
        let proxy = reqwest::Proxy::all(&upstream_proxy.url)
            .map_err(|e| format!("Invalid upstream proxy url: {}", e))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))
}

/// Short category prefix plus the underlying error, e.g.
/// `timeout: operation timed out`.
fn classify_transport_error(error: &reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_decode() || error.is_body() {
        "body interrupted"
    } else if error.is_request() {
        "request error"
    } else {
        "unknown error"
    };
    format!("{}: {}", kind, error)
}
