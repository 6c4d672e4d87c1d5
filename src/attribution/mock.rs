//! Test doubles for the three injected services.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

use crate::attribution::legacy::{AttributionRecord, LegacyAttributionClient};
use crate::attribution::token::{AttributionToken, AttributionTokenSource};
use crate::attribution::transport::{AttributionTransport, TransportResponse};

pub const VALID_BODY: &str = r#"{"attribution":true,"orgId":40669820,"campaignId":542370539,"conversionType":"Download","adGroupId":542317095,"countryOrRegion":"US","keywordId":87675432,"adId":542317136}"#;

/// Replays scripted responses in order and records when each call arrived.
pub struct StubTransport {
    script: Mutex<VecDeque<Result<TransportResponse, String>>>,
    calls: Mutex<Vec<(Instant, String, String)>>,
}

impl StubTransport {
    pub fn new(script: Vec<Result<TransportResponse, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn statuses(statuses: &[(u16, &str)]) -> Self {
        Self::new(statuses.iter().map(|(s, b)| Ok(response(*s, b))).collect())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _, _)| *t).collect()
    }

    /// (url, raw token) of every call.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, u, t)| (u.clone(), t.clone()))
            .collect()
    }
}

pub fn response(status: u16, body: &str) -> TransportResponse {
    TransportResponse {
        status,
        body: Bytes::from(body.to_string()),
    }
}

#[async_trait]
impl AttributionTransport for StubTransport {
    async fn post_token(
        &self,
        url: &str,
        token: &AttributionToken,
    ) -> Result<TransportResponse, String> {
        self.calls.lock().unwrap().push((
            Instant::now(),
            url.to_string(),
            token.as_str().to_string(),
        ));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("stub transport script exhausted".to_string()))
    }
}

pub struct StubTokenSource {
    pub available: bool,
    pub result: Result<String, String>,
    calls: AtomicUsize,
}

impl StubTokenSource {
    pub fn ok(token: &str) -> Self {
        Self {
            available: true,
            result: Ok(token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            available: true,
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn missing_class() -> Self {
        Self {
            available: false,
            result: Err("unreachable".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AttributionTokenSource for StubTokenSource {
    fn is_service_available(&self) -> bool {
        self.available
    }

    fn attribution_token(&self) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct StubLegacyClient {
    result: Result<AttributionRecord, String>,
    calls: AtomicUsize,
}

impl StubLegacyClient {
    pub fn ok(record: AttributionRecord) -> Self {
        Self {
            result: Ok(record),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LegacyAttributionClient for StubLegacyClient {
    async fn request_attribution_details(&self) -> Result<AttributionRecord, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub fn iad_record() -> AttributionRecord {
    let mut record = Map::new();
    record.insert(
        "Version3.1".to_string(),
        json!({ "iad-attribution": "true", "iad-org-name": "Example Org" }),
    );
    record
}

pub fn adservices_record() -> AttributionRecord {
    match serde_json::from_str::<Value>(VALID_BODY) {
        Ok(Value::Object(map)) => map,
        _ => unreachable!("VALID_BODY is a JSON object"),
    }
}
