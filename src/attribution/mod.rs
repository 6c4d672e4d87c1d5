// Attribution 模块 - AdServices token exchange with iAd fallback

pub mod errors;
pub mod fetcher;
pub mod legacy;
pub mod observability;
pub mod platform;
pub mod privacy;
pub mod token;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use errors::AttributionError;
pub use fetcher::AttributionFetcher;
pub use legacy::{AttributionRecord, CallbackLegacyClient, LegacyAttributionClient, LegacyCompletion};
pub use observability::AttributionSource;
pub use platform::{Capability, DeviceEnvironment, OsVersion, Platform};
pub use token::{AttributionToken, AttributionTokenSource, ProvidedTokenSource};
pub use transport::{AttributionTransport, ReqwestTransport, TransportResponse};
