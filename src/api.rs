//! Streaming chat client for a local Ollama instance.
//!
//! `POST {url}/api/chat` with `stream: true` returns newline-delimited JSON
//! chunks. Tokens are forwarded to a sink (stderr in production) as they
//! arrive so the user watches the command being written, and the
//! concatenated text is returned once the stream completes.

use crate::error::ApiError;
use crate::types::{ChatChunk, ChatMessage, ChatRequest};
use std::io::Write;
use std::time::Duration;

const API_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the HTTP client with the request timeout applied.
fn build_http_client() -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(API_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Stream one chat generation and return the accumulated text, trimmed.
///
/// `token_sink` receives each content delta as it arrives.
pub async fn generate<W: Write>(
    base_url: &str,
    model: &str,
    messages: Vec<ChatMessage>,
    num_gpu: Option<u32>,
    token_sink: &mut W,
) -> Result<String, ApiError> {
    let http = build_http_client();
    let request = ChatRequest::streaming(model, messages).with_num_gpu(num_gpu);
    let url = format!("{}/api/chat", base_url.trim_end_matches('/'));
    tracing::debug!(%url, model, "sending chat request");

    let mut response = http.post(&url).json(&request).send().await?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status(status, body));
    }

    let mut accumulator = ChunkAccumulator::default();
    while let Some(bytes) = response.chunk().await? {
        for token in accumulator.push(&bytes)? {
            token_sink.write_all(token.as_bytes()).ok();
            token_sink.flush().ok();
        }
        if accumulator.done() {
            break;
        }
    }
    let text = accumulator.finish()?;
    token_sink.write_all(b"\n").ok();

    tracing::debug!(chars = text.len(), "generation complete");
    Ok(text)
}

/// Map transport-level failures to actionable operator hints.
pub fn diagnostic_hint(err: &ApiError, model: &str) -> Option<String> {
    if err.is_connect() {
        return Some("Cannot connect to Ollama. Is it running?".to_string());
    }
    if err.status_code() == Some(404) {
        return Some(format!("Model not found. Run: ollama pull {model}"));
    }
    None
}

// ---------------------------------------------------------------------------
// NDJSON chunk accumulation
// ---------------------------------------------------------------------------

/// Incremental decoder for a newline-delimited JSON chat stream.
///
/// Network chunk boundaries do not align with line boundaries, so bytes are
/// buffered until a full line is available.
#[derive(Debug, Default)]
pub struct ChunkAccumulator {
    buffer: String,
    text: String,
    done: bool,
}

impl ChunkAccumulator {
    /// Feed raw bytes; returns the content deltas completed by this chunk.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>, ApiError> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));

        let mut tokens = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            if let Some(token) = self.consume_line(line.trim())? {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    /// Whether the stream has signalled completion.
    pub fn done(&self) -> bool {
        self.done
    }

    /// Consume the accumulator, flushing any trailing unterminated line.
    pub fn finish(mut self) -> Result<String, ApiError> {
        let rest = std::mem::take(&mut self.buffer);
        if let Some(token) = self.consume_line(rest.trim())? {
            self.text.push_str(&token);
        }
        Ok(self.text.trim().to_string())
    }

    fn consume_line(&mut self, line: &str) -> Result<Option<String>, ApiError> {
        if line.is_empty() || self.done {
            return Ok(None);
        }
        let chunk: ChatChunk = serde_json::from_str(line)
            .map_err(|e| ApiError::InvalidResponse(format!("bad stream line: {e}")))?;
        if let Some(error) = chunk.error {
            return Err(ApiError::InvalidResponse(error));
        }
        if chunk.done {
            self.done = true;
        }
        if chunk.message.content.is_empty() {
            return Ok(None);
        }
        self.text.push_str(&chunk.message.content);
        Ok(Some(chunk.message.content))
    }
}
