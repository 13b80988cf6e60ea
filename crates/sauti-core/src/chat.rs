//! Reply generation via an OpenAI-compatible chat completion API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ChatConfig;
use crate::error::{CoreError, CoreResult};
use crate::message::ChatMessage;

const CHAT_TIMEOUT_SECS: u64 = 30;

/// Backend producing one assistant reply for an ordered message list.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one completion. A single blocking call, no retry, no token
    /// streaming; the first choice's content is the reply.
    async fn complete(&self, messages: &[ChatMessage]) -> CoreResult<String>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Production chat client for OpenAI-compatible `/chat/completions`.
#[derive(Debug, Clone)]
pub struct HttpChat {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HttpChat {
    pub fn new(config: ChatConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(CHAT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CoreError::Chat(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url,
            api_key: config.api_key,
            model: config.model,
            client,
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChat {
    async fn complete(&self, messages: &[ChatMessage]) -> CoreResult<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CoreError::Chat(format!("Chat API error {status}: {body}")));
        }

        let completion: CompletionResponse = res.json().await?;
        let reply = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CoreError::Chat("completion returned no choices".to_string()))?;
        debug!(target: "sauti::chat", chars = reply.len(), "completion received");
        Ok(reply)
    }
}
