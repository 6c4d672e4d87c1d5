use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::oneshot;

/// Attribution dictionary as returned by either service. Passed through untouched.
pub type AttributionRecord = Map<String, Value>;

/// Completion callback handed to a callback-style OS API. Must be invoked at
/// most once.
pub type LegacyCompletion = Box<dyn FnOnce(Result<AttributionRecord, String>) + Send>;

/// The iAd on-device client (`ADClient.requestAttributionDetails`).
#[async_trait]
pub trait LegacyAttributionClient: Send + Sync {
    async fn request_attribution_details(&self) -> Result<AttributionRecord, String>;
}

/// Adapts a completion-handler API into [`LegacyAttributionClient`].
///
/// The wrapped function receives a [`LegacyCompletion`] and is expected to
/// call it from whatever thread the OS answers on. If the completion is
/// dropped without being called the request fails instead of hanging.
pub struct CallbackLegacyClient<F>
where
    F: Fn(LegacyCompletion) + Send + Sync,
{
    request: F,
}

impl<F> CallbackLegacyClient<F>
where
    F: Fn(LegacyCompletion) + Send + Sync,
{
    pub fn new(request: F) -> Self {
        Self { request }
    }
}

#[async_trait]
impl<F> LegacyAttributionClient for CallbackLegacyClient<F>
where
    F: Fn(LegacyCompletion) + Send + Sync,
{
    async fn request_attribution_details(&self) -> Result<AttributionRecord, String> {
        let (tx, rx) = oneshot::channel();
        let completion: LegacyCompletion =
            Box::new(move |result: Result<AttributionRecord, String>| {
                let _ = tx.send(result);
            });
        (self.request)(completion);

        rx.await
            .map_err(|_| "iAd client dropped the request without answering".to_string())?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> AttributionRecord {
        let mut detail = Map::new();
        detail.insert("iad-attribution".to_string(), json!("true"));
        detail.insert("iad-campaign-id".to_string(), json!("1234567890"));
        let mut record = Map::new();
        record.insert("Version3.1".to_string(), Value::Object(detail));
        record
    }

    #[tokio::test]
    async fn callback_answered_on_another_thread() {
        let client = CallbackLegacyClient::new(|done: LegacyCompletion| {
            std::thread::spawn(move || done(Ok(sample_record())));
        });

        let record = client.request_attribution_details().await.unwrap();
        assert_eq!(record["Version3.1"]["iad-campaign-id"], "1234567890");
    }

    #[tokio::test]
    async fn callback_error_is_propagated() {
        let client = CallbackLegacyClient::new(|done: LegacyCompletion| {
            done(Err("The app is not authorized for ad tracking".to_string()));
        });

        let err = client.request_attribution_details().await.unwrap_err();
        assert_eq!(err, "The app is not authorized for ad tracking");
    }

    #[tokio::test]
    async fn dropped_callback_fails_instead_of_hanging() {
        let client = CallbackLegacyClient::new(|done: LegacyCompletion| drop(done));

        let err = client.request_attribution_details().await.unwrap_err();
        assert!(err.contains("without answering"));
    }
}
