// Claude API streaming client using reqwest-eventsource.
//
// Sends a message to the Anthropic Messages API with `stream: true`, collects
// the text deltas from the Server-Sent Events, and turns the finished reply
// into candidate group names.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tracing::{debug, warn};

use super::prompt;
use super::NameSource;
use crate::config::Config;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// A finished streamed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// `stop_reason` from the final `message_delta`, when one arrived.
    pub stop_reason: Option<String>,
}

impl Completion {
    /// The reply was cut off at `max_tokens`, so its tail may be partial.
    pub fn truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

/// Low-level Claude API streaming client.
pub struct ClaudeClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        Self::with_endpoint(ANTHROPIC_API_URL.to_string(), api_key, model, max_tokens)
    }

    /// Point the client at a different Messages endpoint.
    pub fn with_endpoint(endpoint: String, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
            max_tokens,
        }
    }

    /// Send one message and return the complete reply.
    ///
    /// Streams the response, concatenates every `content_block_delta` and
    /// keeps the `stop_reason` reported by `message_delta`.
    /// Fails on transport errors, non-2xx status, or a stream that ends
    /// without producing any text.
    pub async fn complete(&self, system: &str, user_content: &str) -> anyhow::Result<Completion> {
        if self.api_key.is_empty() {
            anyhow::bail!("API key not configured");
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let request = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = request
            .eventsource()
            .map_err(|e| anyhow::anyhow!("Failed to create event source: {e}"))?;

        let mut full_text = String::new();
        let mut stop_reason = None;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                }
                Ok(Event::Message(msg)) => match msg.event.as_str() {
                    "content_block_delta" => {
                        if let Some(text) = parse_delta_text(&msg.data) {
                            full_text.push_str(&text);
                        }
                    }
                    "message_delta" => {
                        stop_reason = parse_stop_reason(&msg.data);
                        debug!(?stop_reason, "message_delta");
                    }
                    "message_stop" => {
                        debug!("message_stop, streaming complete");
                        es.close();
                        return Ok(Completion {
                            text: full_text,
                            stop_reason,
                        });
                    }
                    "error" => {
                        es.close();
                        anyhow::bail!("API error event: {}", msg.data);
                    }
                    other => {
                        debug!(event_type = other, "ignoring SSE event");
                    }
                },
                Err(err) => {
                    warn!(?err, "SSE stream error");
                    es.close();
                    anyhow::bail!(extract_error_message(&err));
                }
            }
        }

        if full_text.is_empty() {
            anyhow::bail!("Stream ended unexpectedly without any content");
        }
        Ok(Completion {
            text: full_text,
            stop_reason,
        })
    }
}

#[async_trait]
impl NameSource for ClaudeClient {
    async fn suggest_names(&self, count: usize, theme: &str) -> anyhow::Result<Vec<String>> {
        let reply = self
            .complete(&prompt::system_prompt(), &prompt::build_naming_prompt(count, theme))
            .await?;
        let names = complete_names(&reply, count);
        if reply.truncated() {
            warn!(
                "naming reply hit max_tokens ({}), kept {} of {} names",
                self.max_tokens,
                names.len(),
                count
            );
        }
        if names.is_empty() {
            anyhow::bail!("reply contained no usable names");
        }
        Ok(names)
    }
}

// ---------------------------------------------------------------------------
// NamingClient wrapper
// ---------------------------------------------------------------------------

/// Either a live Claude client or a stand-in that always fails, so the app
/// falls back to default group names.
pub enum NamingClient {
    /// Claude API is configured and ready.
    Active(ClaudeClient),
    /// No API key configured.
    Disabled,
}

impl NamingClient {
    /// `Active` if credentials carry a non-empty API key, else `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => NamingClient::Active(ClaudeClient::new(
                key.clone(),
                config.naming.model.clone(),
                config.naming.max_tokens,
            )),
            _ => NamingClient::Disabled,
        }
    }
}

#[async_trait]
impl NameSource for NamingClient {
    async fn suggest_names(&self, count: usize, theme: &str) -> anyhow::Result<Vec<String>> {
        match self {
            NamingClient::Active(client) => client.suggest_names(count, theme).await,
            NamingClient::Disabled => anyhow::bail!("naming service not configured"),
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// Extract `delta.text` from a `content_block_delta` event's JSON.
///
/// Expected shape: `{ "type": "content_block_delta", "delta": { "type": "text_delta", "text": "..." } }`
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract `delta.stop_reason` from a `message_delta` event's JSON.
pub(crate) fn parse_stop_reason(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("stop_reason")?
        .as_str()
        .map(|s| s.to_string())
}

/// Candidate names from a reply, at most `count`.
///
/// A truncated reply ends mid-name: unless more than `count` names arrived,
/// its last candidate is dropped.
fn complete_names(reply: &Completion, count: usize) -> Vec<String> {
    let mut names = prompt::parse_candidate_names(&reply.text, count + 1);
    if reply.truncated() && names.len() <= count {
        names.pop();
    }
    names.truncate(count);
    names
}

fn extract_error_message(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            format!("API returned status {status}")
        }
        reqwest_eventsource::Error::Transport(e) => {
            format!("Network error: {e}")
        }
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
