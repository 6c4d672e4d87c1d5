use thiserror::Error;

/// Every way an attribution request can fail.
///
/// `code()` is the machine-readable kind handed to the host as the rejection
/// code; `Display` is the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributionError {
    #[error("AppleAdsAttribution is only available on iOS")]
    UnsupportedPlatform,

    #[error("AppleAdsAttribution native module is not linked")]
    ModuleUnavailable,

    #[error("Error getting token, not available in Simulator")]
    SimulatorUnsupported,

    #[error("Error getting token, {0}")]
    ServiceUnavailable(String),

    #[error("Error getting token: {0}")]
    TokenGenerationFailed(String),

    #[error("Request to Adservices API failed: {0}")]
    Transport(String),

    #[error(
        "Request to get data from Adservices API failed with status code {status}. Re-tried {retries_used} times"
    )]
    HttpStatus { status: u16, retries_used: u32 },

    #[error("Adservices API returned an unreadable body: {0}")]
    MalformedResponse(String),

    #[error("iAd ADClient not available")]
    LegacyUnavailable,

    #[error("{0}")]
    LegacyClient(String),

    #[error("Ad services error: {primary_message}. \niAD error: {fallback_message}")]
    CombinedFailure {
        primary_message: String,
        fallback_message: String,
    },
}

impl AttributionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedPlatform => "unsupported_platform",
            Self::ModuleUnavailable => "module_unavailable",
            Self::SimulatorUnsupported => "simulator_unsupported",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::TokenGenerationFailed(_) => "token_generation_failed",
            Self::Transport(_) => "transport_error",
            Self::HttpStatus { .. } => "http_status",
            Self::MalformedResponse(_) => "malformed_response",
            Self::LegacyUnavailable => "legacy_unavailable",
            Self::LegacyClient(_) => "legacy_client",
            Self::CombinedFailure { .. } => "combined_failure",
        }
    }

    /// Failures that depend on the device rather than on the request. Logged
    /// at debug instead of warn since they repeat on every launch.
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform
                | Self::SimulatorUnsupported
                | Self::ServiceUnavailable(_)
                | Self::LegacyUnavailable
        )
    }
}

pub(crate) fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = s[..end].to_string();
    out.push('…');
    out
}
