use serde::{Deserialize, Serialize};

/// Which service ended up answering a combined request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionSource {
    AdServices,
    LegacyIad,
}

impl AttributionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionSource::AdServices => "adservices",
            AttributionSource::LegacyIad => "iad",
        }
    }
}
