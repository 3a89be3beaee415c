// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered conversation history. Append-only, except that the trailing
/// assistant entry is mutated in place while a stream is arriving and removed
/// entirely if the stream never delivered.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_user(&mut self, content: &str) {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: content.to_string(),
        });
    }

    /// Appends the empty assistant placeholder a streaming reply fills in.
    pub fn begin_assistant(&mut self) {
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: String::new(),
        });
    }

    pub fn append_to_assistant(&mut self, delta: &str) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == Role::Assistant {
                last.content.push_str(delta);
            }
        }
    }

    pub fn last_content(&self) -> &str {
        self.messages.last().map(|m| m.content.as_str()).unwrap_or("")
    }

    /// Removes the trailing assistant entry after a failed stream so no
    /// orphan placeholder survives the call.
    pub fn rollback_assistant(&mut self) {
        if matches!(self.messages.last(), Some(m) if m.role == Role::Assistant) {
            self.messages.pop();
        }
    }
}

/// Bounded-size re-encoding of an upload, ready to send as a data URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
    pub staged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: String,
    pub meta: AnalysisMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMeta {
    pub version: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_grows_user_then_assistant() {
        let mut transcript = Transcript::new();
        transcript.push_user("How often should I water maize?");
        transcript.begin_assistant();
        transcript.append_to_assistant("Twice");
        transcript.append_to_assistant(" a week.");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last_content(), "Twice a week.");
        assert_eq!(transcript.messages()[0].role, Role::User);
        assert_eq!(transcript.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn rollback_removes_only_trailing_assistant() {
        let mut transcript = Transcript::new();
        transcript.push_user("hello");
        transcript.begin_assistant();
        transcript.rollback_assistant();

        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].role, Role::User);

        // A second rollback must not eat the user message.
        transcript.rollback_assistant();
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage {
            role: Role::Assistant,
            content: "ok".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
    }
}
