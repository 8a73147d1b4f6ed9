use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;

use super::ImagingError;

/// One labelled region from the segmentation model. The mask is a per-pixel
/// intensity array in row-major order over the submitted image.
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    pub label: String,
    pub mask: Vec<u8>,
}

/// Client for the external segmentation classifier. One shot, no retry;
/// any failure is surfaced to the caller as a hard error.
#[derive(Clone)]
pub struct HttpSegmenter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSegmenter {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub async fn segment(&self, image_png: &[u8]) -> Result<Vec<Segment>, ImagingError> {
        let body = json!({ "image": BASE64.encode(image_png) });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ImagingError::Classifier(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ImagingError::Classifier(format!(
                "classifier returned status {}",
                response.status()
            )));
        }

        let segments: Vec<Segment> = response
            .json()
            .await
            .map_err(|e| ImagingError::Classifier(format!("unusable response shape: {e}")))?;

        if segments.is_empty() {
            return Err(ImagingError::Classifier(
                "classifier returned no segments".into(),
            ));
        }

        Ok(segments)
    }
}
