use std::sync::Arc;

use serde_json::Value;

use crate::attribution::errors::{truncate_utf8, AttributionError};
use crate::attribution::legacy::{AttributionRecord, LegacyAttributionClient};
use crate::attribution::observability::AttributionSource;
use crate::attribution::platform::{Capability, DeviceEnvironment};
use crate::attribution::privacy::stable_hash_hex;
use crate::attribution::token::{AttributionToken, AttributionTokenSource};
use crate::attribution::transport::{AttributionTransport, TransportResponse};
use crate::modules::config::AttributionSettings;

/// Retrieves attribution for the current install, hiding which service
/// answered.
///
/// Holds no mutable state: every call probes the device capability once,
/// threads it through, and fetches fresh. Concurrent calls are independent.
pub struct AttributionFetcher {
    env: DeviceEnvironment,
    settings: AttributionSettings,
    transport: Arc<dyn AttributionTransport>,
    token_source: Arc<dyn AttributionTokenSource>,
    legacy_client: Arc<dyn LegacyAttributionClient>,
}

impl AttributionFetcher {
    pub fn new(
        env: DeviceEnvironment,
        settings: AttributionSettings,
        transport: Arc<dyn AttributionTransport>,
        token_source: Arc<dyn AttributionTokenSource>,
        legacy_client: Arc<dyn LegacyAttributionClient>,
    ) -> Self {
        Self {
            env,
            settings,
            transport,
            token_source,
            legacy_client,
        }
    }

    pub fn environment(&self) -> &DeviceEnvironment {
        &self.env
    }

    pub fn capability(&self) -> Capability {
        Capability::probe(&self.env)
    }

    /// AdServices first, iAd as fallback. Both failing yields
    /// `CombinedFailure` with both messages.
    pub async fn fetch_combined_attribution(&self) -> Result<AttributionRecord, AttributionError> {
        self.fetch_combined_attribution_with_source()
            .await
            .map(|(record, _)| record)
    }

    pub async fn fetch_combined_attribution_with_source(
        &self,
    ) -> Result<(AttributionRecord, AttributionSource), AttributionError> {
        let capability = self.capability();
        match capability {
            Capability::Unsupported => Err(AttributionError::UnsupportedPlatform),
            Capability::LegacyOnly => {
                tracing::debug!(
                    "[Attribution] iOS {} predates AdServices, asking iAd directly",
                    self.env.os_version
                );
                let record = self.legacy_with(capability).await?;
                tracing::info!("[Attribution] Resolved via iAd ({} keys)", record.len());
                Ok((record, AttributionSource::LegacyIad))
            }
            Capability::Full => {
                let primary = match self.ad_services_with(capability).await {
                    Ok(record) => {
                        tracing::info!(
                            "[Attribution] Resolved via AdServices ({} keys)",
                            record.len()
                        );
                        return Ok((record, AttributionSource::AdServices));
                    }
                    Err(e) => e,
                };

                log_failure("AdServices failed, falling back to iAd", &primary);
                match self.legacy_with(capability).await {
                    Ok(record) => {
                        tracing::info!(
                            "[Attribution] Resolved via iAd fallback ({} keys)",
                            record.len()
                        );
                        Ok((record, AttributionSource::LegacyIad))
                    }
                    Err(fallback) => {
                        let err = AttributionError::CombinedFailure {
                            primary_message: primary.to_string(),
                            fallback_message: fallback.to_string(),
                        };
                        tracing::warn!("[Attribution] Both services failed: {}", err);
                        Err(err)
                    }
                }
            }
        }
    }

    pub async fn fetch_legacy_attribution(&self) -> Result<AttributionRecord, AttributionError> {
        self.legacy_with(self.capability()).await
    }

    pub async fn fetch_attribution_token(&self) -> Result<AttributionToken, AttributionError> {
        self.token_with(self.capability())
    }

    pub async fn fetch_ad_services_attribution(
        &self,
    ) -> Result<AttributionRecord, AttributionError> {
        self.ad_services_with(self.capability()).await
    }

    fn token_with(&self, capability: Capability) -> Result<AttributionToken, AttributionError> {
        if capability == Capability::Unsupported {
            return Err(AttributionError::UnsupportedPlatform);
        }
        // Token generation needs hardware attestation; checked before anything else.
        if self.env.is_simulator {
            return Err(AttributionError::SimulatorUnsupported);
        }
        if capability != Capability::Full {
            return Err(AttributionError::ServiceUnavailable(
                "AdServices not available pre iOS 14.3".to_string(),
            ));
        }
        if !self.token_source.is_service_available() {
            return Err(AttributionError::ServiceUnavailable(
                "AAAttributionClass not found".to_string(),
            ));
        }

        let raw = self
            .token_source
            .attribution_token()
            .map_err(AttributionError::TokenGenerationFailed)?;
        let token = AttributionToken::new(raw);
        tracing::debug!(
            "[Attribution] Generated token {} (sha256 {})",
            token,
            &stable_hash_hex(token.as_str())[..12]
        );
        Ok(token)
    }

    async fn ad_services_with(
        &self,
        capability: Capability,
    ) -> Result<AttributionRecord, AttributionError> {
        let token = self.token_with(capability)?;
        self.exchange_token(&token).await
    }

    async fn legacy_with(
        &self,
        capability: Capability,
    ) -> Result<AttributionRecord, AttributionError> {
        if capability == Capability::Unsupported {
            return Err(AttributionError::UnsupportedPlatform);
        }
        if !self.env.supports_legacy_client() {
            return Err(AttributionError::LegacyUnavailable);
        }

        self.legacy_client
            .request_attribution_details()
            .await
            .map_err(AttributionError::LegacyClient)
    }

    /// POST the token, retrying 404/500 with a fixed delay.
    ///
    /// Every retryable status consumes one unit of the attempt budget; the
    /// request fails once the budget hits zero, reporting how many units were
    /// consumed. Transport errors and malformed bodies are never retried.
    async fn exchange_token(
        &self,
        token: &AttributionToken,
    ) -> Result<AttributionRecord, AttributionError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let url = self.settings.endpoint_url.as_str();
        let mut retries_left = max_attempts;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            tracing::debug!("[Attribution] POST {} (attempt {})", url, attempt);

            let resp = self
                .transport
                .post_token(url, token)
                .await
                .map_err(AttributionError::Transport)?;

            if resp.status == 200 {
                return parse_record(&resp);
            }

            if self.settings.is_retryable(resp.status) {
                retries_left -= 1;
                if retries_left > 0 {
                    tracing::warn!(
                        "[Attribution] AdServices returned {} on attempt {}, retrying in {}s ({} left)",
                        resp.status,
                        attempt,
                        self.settings.retry_delay_secs,
                        retries_left
                    );
                    tokio::time::sleep(self.settings.retry_delay()).await;
                    continue;
                }
            }

            return Err(AttributionError::HttpStatus {
                status: resp.status,
                retries_used: max_attempts - retries_left,
            });
        }
    }
}

fn parse_record(resp: &TransportResponse) -> Result<AttributionRecord, AttributionError> {
    if resp.body.is_empty() {
        return Err(AttributionError::MalformedResponse(
            "empty response body".to_string(),
        ));
    }

    match serde_json::from_slice::<Value>(&resp.body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AttributionError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            truncate_utf8(&other.to_string(), 120)
        ))),
        Err(e) => Err(AttributionError::MalformedResponse(e.to_string())),
    }
}

fn log_failure(context: &str, err: &AttributionError) {
    if err.is_environmental() {
        tracing::debug!("[Attribution] {}: {}", context, err);
    } else {
        tracing::warn!("[Attribution] {}: {}", context, err);
    }
}
