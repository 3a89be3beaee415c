// src/services/gateway.rs
use log::{error, info};
use reqwest::Client;
use serde_json::json;
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::errors::CropSenseError;
use crate::models::{AnalysisMeta, AnalysisResult, ChatMessage};

/// Deploy marker echoed back in analysis metadata.
pub const RELAY_VERSION: &str = "0.1.0";

const DIAGNOSIS_SYSTEM_PROMPT: &str = "You are an expert agricultural AI assistant specializing \
in crop disease detection. Analyze crop images and provide detailed diagnosis including: disease \
name, severity level (low/medium/high), symptoms, causes, and treatment recommendations. Be \
specific and practical.";

const DIAGNOSIS_USER_PROMPT: &str =
    "Analyze this crop image for any diseases or issues. Provide a detailed diagnosis.";

const CHAT_SYSTEM_PROMPT: &str = "You are a friendly and knowledgeable farming assistant. Answer \
questions about crops, pests, irrigation, soil health, weather and general agricultural practice \
with practical, concise advice a working farmer can act on.";

pub struct GatewayService {
    client: Client,
    gateway_url: String,
    api_key: Option<String>,
    vision_model_inline: String,
    vision_model_remote: String,
    chat_model: String,
}

impl GatewayService {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            client: Client::new(),
            gateway_url: config.gateway_url.clone(),
            api_key: config.api_key.clone(),
            vision_model_inline: config.vision_model_inline.clone(),
            vision_model_remote: config.vision_model_remote.clone(),
            chat_model: config.chat_model.clone(),
        }
    }

    /// The gateway's non-OpenAI provider path rejects inline data URIs for
    /// image inputs, so data-URI payloads must take the OpenAI-compatible
    /// model while plain URLs take the other provider.
    pub fn select_vision_model(&self, image: &str) -> &str {
        if image.starts_with("data:image/") {
            &self.vision_model_inline
        } else {
            &self.vision_model_remote
        }
    }

    fn api_key(&self) -> Result<&str, CropSenseError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| CropSenseError::Config("AI_GATEWAY_API_KEY not configured".to_string()))
    }

    pub async fn analyze_crop(&self, image: &str) -> Result<AnalysisResult, CropSenseError> {
        let api_key = self.api_key()?;
        let model = self.select_vision_model(image);
        let request_id = Uuid::new_v4();

        info!(
            "[analyze-crop] start request_id={} model={} inline={} image_len={}",
            request_id,
            model,
            image.starts_with("data:image/"),
            image.len()
        );

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.gateway_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "model": model,
                "messages": [
                    {
                        "role": "system",
                        "content": DIAGNOSIS_SYSTEM_PROMPT
                    },
                    {
                        "role": "user",
                        "content": [
                            {
                                "type": "text",
                                "text": DIAGNOSIS_USER_PROMPT
                            },
                            {
                                "type": "image_url",
                                "image_url": {
                                    "url": image
                                }
                            }
                        ]
                    }
                ],
            }))
            .send()
            .await
            .map_err(|e| CropSenseError::Network(format!("gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(
                "[analyze-crop] gateway error request_id={} status={} body={}",
                request_id, status, body
            );
            return Err(CropSenseError::Upstream { status, body });
        }

        let result: serde_json::Value = response.json().await.map_err(|e| {
            CropSenseError::MalformedUpstreamResponse(format!("unparseable gateway body: {}", e))
        })?;

        let analysis = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                CropSenseError::MalformedUpstreamResponse(
                    "no analysis text in gateway response".to_string(),
                )
            })?;

        info!(
            "[analyze-crop] complete request_id={} model={}",
            request_id, model
        );

        Ok(AnalysisResult {
            analysis: analysis.to_string(),
            meta: AnalysisMeta {
                version: RELAY_VERSION.to_string(),
                model: model.to_string(),
            },
        })
    }

    /// Opens a streaming completion for the transcript and hands back the raw
    /// upstream response. The caller pipes the byte stream through untouched;
    /// all delta parsing is the consumer's job.
    pub async fn chat_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<reqwest::Response, CropSenseError> {
        let api_key = self.api_key()?;

        let mut payload_messages = vec![json!({
            "role": "system",
            "content": CHAT_SYSTEM_PROMPT
        })];
        payload_messages.extend(messages.iter().map(|m| {
            json!({
                "role": m.role,
                "content": m.content
            })
        }));

        info!("[farm-chat] streaming transcript_len={}", messages.len());

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.gateway_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "model": self.chat_model,
                "messages": payload_messages,
                "stream": true,
            }))
            .send()
            .await
            .map_err(|e| CropSenseError::Network(format!("gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("[farm-chat] gateway error status={} body={}", status, body);
            return Err(CropSenseError::Upstream { status, body });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;

    fn gateway() -> GatewayService {
        GatewayService::from_config(&RelayConfig::default())
    }

    #[test]
    fn data_uri_selects_inline_model() {
        let gateway = gateway();
        let model = gateway.select_vision_model("data:image/jpeg;base64,/9j/4AAQ");
        assert_eq!(model, "openai/gpt-5-mini");
    }

    #[test]
    fn remote_url_selects_other_provider() {
        let gateway = gateway();
        let model = gateway.select_vision_model("https://example.com/leaf.jpg");
        assert_eq!(model, "google/gemini-2.5-flash");
    }

    #[test]
    fn non_image_data_uri_is_treated_as_remote() {
        // Only the image data-URI prefix takes the inline path.
        let gateway = gateway();
        let model = gateway.select_vision_model("data:text/plain;base64,aGk=");
        assert_eq!(model, "google/gemini-2.5-flash");
    }

    #[tokio::test]
    async fn missing_credential_is_a_config_error() {
        let gateway = gateway();
        let err = gateway.analyze_crop("https://example.com/leaf.jpg").await.unwrap_err();
        assert!(matches!(err, CropSenseError::Config(_)));
    }
}
