// src/client/chat.rs
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::json;

use crate::client::ClientConfig;
use crate::client::stream::SseDecoder;
use crate::errors::CropSenseError;
use crate::models::Transcript;

/// Client side of the farm-chat flow: sends the accumulating transcript to
/// the relay and folds the streamed deltas into the trailing assistant entry.
pub struct ChatClient {
    http: Client,
    config: ClientConfig,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Appends `text` as a user message, streams the assistant reply into a
    /// placeholder entry, and invokes `on_update` with the running content
    /// after every delta. On any stream failure the placeholder is removed,
    /// leaving the transcript as it was plus the user's own message.
    pub async fn send<F>(
        &self,
        transcript: &mut Transcript,
        text: &str,
        mut on_update: F,
    ) -> Result<(), CropSenseError>
    where
        F: FnMut(&str),
    {
        transcript.push_user(text);
        // Snapshot the outgoing payload before the placeholder goes in.
        let payload = json!({ "messages": transcript.messages() });
        transcript.begin_assistant();

        let result = self.stream_reply(transcript, &payload, &mut on_update).await;
        if result.is_err() {
            transcript.rollback_assistant();
        }
        result
    }

    async fn stream_reply<F>(
        &self,
        transcript: &mut Transcript,
        payload: &serde_json::Value,
        on_update: &mut F,
    ) -> Result<(), CropSenseError>
    where
        F: FnMut(&str),
    {
        let response = self
            .http
            .post(format!("{}/farm-chat", self.config.relay_url))
            .bearer_auth(&self.config.publishable_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| CropSenseError::StreamUnavailable(format!("relay unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(CropSenseError::StreamUnavailable(format!(
                "relay returned {}",
                response.status()
            )));
        }

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk
                .map_err(|e| CropSenseError::StreamUnavailable(format!("stream interrupted: {}", e)))?;
            for delta in decoder.feed(&chunk) {
                transcript.append_to_assistant(&delta);
                on_update(transcript.last_content());
            }
        }
        Ok(())
    }
}
