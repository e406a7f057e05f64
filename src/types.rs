//! Data model for the Ollama chat API.
//!
//! These types serialize/deserialize directly to/from the JSON payloads of
//! `POST /api/chat` with `stream: true` (newline-delimited JSON chunks).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction message.
    System,
    /// End-user message.
    User,
    /// Assistant/model message.
    Assistant,
}

/// A single message in the chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Model options forwarded to Ollama verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatOptions {
    /// Number of model layers to offload to the GPU.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_gpu: Option<u32>,
}

/// One `POST /api/chat` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
}

impl ChatRequest {
    /// Build a streaming chat request.
    pub fn streaming(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            options: None,
        }
    }

    /// Attach a `num_gpu` option when configured.
    pub fn with_num_gpu(mut self, num_gpu: Option<u32>) -> Self {
        if num_gpu.is_some() {
            self.options = Some(ChatOptions { num_gpu });
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Streaming response chunks
// ---------------------------------------------------------------------------

/// Partial message carried by one streamed chunk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub content: String,
}

/// One newline-delimited JSON chunk from a streaming chat response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: ChunkMessage,
    #[serde(default)]
    pub done: bool,
    /// Error payload Ollama embeds in-stream for some mid-stream failures.
    #[serde(default)]
    pub error: Option<String>,
}
