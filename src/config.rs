// src/config.rs

const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev";

// The gateway's non-OpenAI provider path rejects inline data URIs for image
// inputs, so data-URI uploads must go through an OpenAI-compatible vision
// model while plain URLs use the cheaper provider.
const DEFAULT_VISION_MODEL_INLINE: &str = "openai/gpt-5-mini";
const DEFAULT_VISION_MODEL_REMOTE: &str = "google/gemini-2.5-flash";
const DEFAULT_CHAT_MODEL: &str = "google/gemini-2.5-flash";

/// Server-side configuration, read once at startup. The gateway credential is
/// optional here; requests fail with a config error when it is absent.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub gateway_url: String,
    pub api_key: Option<String>,
    pub vision_model_inline: String,
    pub vision_model_remote: String,
    pub chat_model: String,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            gateway_url: std::env::var("AI_GATEWAY_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            api_key: std::env::var("AI_GATEWAY_API_KEY").ok(),
            vision_model_inline: std::env::var("CROP_VISION_MODEL_INLINE")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL_INLINE.to_string()),
            vision_model_remote: std::env::var("CROP_VISION_MODEL_REMOTE")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL_REMOTE.to_string()),
            chat_model: std::env::var("FARM_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            api_key: None,
            vision_model_inline: DEFAULT_VISION_MODEL_INLINE.to_string(),
            vision_model_remote: DEFAULT_VISION_MODEL_REMOTE.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}
