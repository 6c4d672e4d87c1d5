//! Apple Search Ads attribution for apps embedding this library.
//!
//! [`commands::attribution::AppleAdsAttribution`] is what the host calls;
//! [`attribution::AttributionFetcher`] does the work against three injected
//! services: the HTTP transport, the `AAAttribution` token API and the iAd
//! client.

pub mod attribution;
pub mod commands;
pub mod modules;

pub use attribution::{AttributionError, AttributionFetcher, AttributionRecord, AttributionSource};
pub use commands::attribution::{AppleAdsAttribution, BridgeRejection};
pub use modules::config::AttributionSettings;
