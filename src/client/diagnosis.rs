// src/client/diagnosis.rs
use reqwest::Client;
use serde_json::json;

use crate::client::ClientConfig;
use crate::errors::CropSenseError;
use crate::models::{AnalysisResult, NormalizedImage};
use crate::services::{ImageNormalizer, ProgressEstimator};

/// Client side of the crop-analysis flow: stages an upload through the
/// normalizer and sends the staged data URI to the relay.
pub struct DiagnosisClient {
    http: Client,
    config: ClientConfig,
    normalizer: ImageNormalizer,
}

impl DiagnosisClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            normalizer: ImageNormalizer::new(),
        }
    }

    /// Normalizes an upload for transmission, falling back to the original
    /// bytes when the image cannot be decoded.
    pub fn stage(&self, data: &[u8], content_type: &str) -> NormalizedImage {
        self.normalizer.normalize_or_original(data, content_type)
    }

    pub async fn analyze(
        &self,
        staged: Option<&NormalizedImage>,
    ) -> Result<AnalysisResult, CropSenseError> {
        let image = staged.ok_or(CropSenseError::NoImage)?;

        let response = self
            .http
            .post(format!("{}/analyze-crop", self.config.relay_url))
            .bearer_auth(&self.config.publishable_key)
            .json(&json!({ "image": image.data_uri }))
            .send()
            .await
            .map_err(|e| CropSenseError::Network(format!("relay unreachable: {}", e)))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string))
                .unwrap_or(body);
            return Err(CropSenseError::Relay(message));
        }

        response
            .json::<AnalysisResult>()
            .await
            .map_err(|e| CropSenseError::Relay(format!("unexpected relay response: {}", e)))
    }

    /// Runs `analyze` under a progress estimator, forwarding each published
    /// tick to the callback. Success pins the bar to 100; failure abandons it
    /// where it was.
    pub async fn analyze_with_progress<F>(
        &self,
        staged: Option<&NormalizedImage>,
        mut on_progress: F,
    ) -> Result<AnalysisResult, CropSenseError>
    where
        F: FnMut(f32),
    {
        let (estimator, mut rx) = ProgressEstimator::start();
        on_progress(*rx.borrow());

        let mut analyze = std::pin::pin!(self.analyze(staged));
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_ok() {
                        on_progress(*rx.borrow());
                    }
                }
                result = &mut analyze => {
                    return match result {
                        Ok(analysis) => {
                            estimator.complete();
                            on_progress(100.0);
                            Ok(analysis)
                        }
                        Err(e) => {
                            drop(estimator);
                            Err(e)
                        }
                    };
                }
            }
        }
    }
}
