// src/client/mod.rs
pub mod chat;
pub mod diagnosis;
pub mod stream;

pub use chat::ChatClient;
pub use diagnosis::DiagnosisClient;
pub use stream::SseDecoder;

/// Transport configuration for the browser-equivalent client pipelines:
/// where the relay lives and the publishable key sent as the bearer token.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub publishable_key: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            relay_url: std::env::var("RELAY_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            publishable_key: std::env::var("RELAY_PUBLISHABLE_KEY").unwrap_or_default(),
        }
    }
}
