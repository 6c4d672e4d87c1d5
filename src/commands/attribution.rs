use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::attribution::{
    AttributionError, AttributionFetcher, AttributionTokenSource, DeviceEnvironment,
    LegacyAttributionClient, ReqwestTransport,
};
use crate::modules::config::AttributionSettings;

/// Rejection handed back to the host, the moral equivalent of
/// `reject(code, message)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRejection {
    pub code: String,
    pub message: String,
}

impl From<AttributionError> for BridgeRejection {
    fn from(err: AttributionError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Host-facing module. Mirrors the shape the app layer calls into; a module
/// built without a fetcher rejects every call with `module_unavailable`.
#[derive(Clone)]
pub struct AppleAdsAttribution {
    fetcher: Option<Arc<AttributionFetcher>>,
}

impl AppleAdsAttribution {
    pub fn new(fetcher: Option<Arc<AttributionFetcher>>) -> Self {
        Self { fetcher }
    }

    /// Wire up the production HTTP transport from settings.
    pub fn link(
        env: DeviceEnvironment,
        settings: AttributionSettings,
        token_source: Arc<dyn AttributionTokenSource>,
        legacy_client: Arc<dyn LegacyAttributionClient>,
    ) -> Result<Self, String> {
        settings.validate()?;
        let transport = ReqwestTransport::from_settings(&settings)?;
        tracing::info!(
            "AppleAdsAttribution linked (platform={:?}, os={}, simulator={})",
            env.platform,
            env.os_version,
            env.is_simulator
        );
        let fetcher = AttributionFetcher::new(
            env,
            settings,
            Arc::new(transport),
            token_source,
            legacy_client,
        );
        Ok(Self::new(Some(Arc::new(fetcher))))
    }

    pub fn is_linked(&self) -> bool {
        self.fetcher.is_some()
    }

    fn fetcher(&self) -> Result<&AttributionFetcher, BridgeRejection> {
        self.fetcher
            .as_deref()
            .ok_or_else(|| AttributionError::ModuleUnavailable.into())
    }

    /// AdServices with iAd fallback.
    pub async fn get_attribution_data(&self) -> Result<Value, BridgeRejection> {
        let record = self.fetcher()?.fetch_combined_attribution().await?;
        Ok(Value::Object(record))
    }

    pub async fn get_ad_services_attribution_token(&self) -> Result<String, BridgeRejection> {
        let token = self.fetcher()?.fetch_attribution_token().await?;
        Ok(token.into_inner())
    }

    pub async fn get_ad_services_attribution_data(&self) -> Result<Value, BridgeRejection> {
        let record = self.fetcher()?.fetch_ad_services_attribution().await?;
        Ok(Value::Object(record))
    }

    pub async fn get_iad_attribution_data(&self) -> Result<Value, BridgeRejection> {
        let record = self.fetcher()?.fetch_legacy_attribution().await?;
        Ok(Value::Object(record))
    }
}
