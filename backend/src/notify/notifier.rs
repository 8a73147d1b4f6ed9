use serde_json::json;
use uuid::Uuid;

/// Fire-and-forget designer notification. Callers spawn this after the
/// checkout response is prepared; failures are logged and never surface.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(String),
}

impl Notifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub async fn order_created(&self, order_id: Uuid) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "order_id": order_id }))
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Http(format!(
                "dispatcher returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
