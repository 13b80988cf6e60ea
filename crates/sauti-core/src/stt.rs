//! Speech-to-text: turn an uploaded audio blob into a transcript.
//!
//! `SttBackend` is the seam the server tests mock; `HttpStt` talks to any
//! OpenAI-compatible `/audio/transcriptions` endpoint.

use async_trait::async_trait;
use tracing::debug;

use crate::config::SttConfig;
use crate::error::{CoreError, CoreResult};

/// Fixed language hint sent with every transcription request.
pub const TRANSCRIPTION_LANGUAGE: &str = "en";

const STT_TIMEOUT_SECS: u64 = 30;

/// Backend converting audio bytes to text. Returns the transcript as-is
/// (the caller decides what an empty transcript means).
#[async_trait]
pub trait SttBackend: Send + Sync {
    /// Transcribe one audio blob. `mime_type` is the declared media type of
    /// the upload; `file_name` the declared name, if any.
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> CoreResult<String>;
}

/// Production STT client for OpenAI-compatible transcription APIs.
#[derive(Debug, Clone)]
pub struct HttpStt {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HttpStt {
    pub fn new(config: SttConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(STT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CoreError::Stt(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url,
            api_key: config.api_key,
            model: config.model,
            client,
        })
    }
}

#[async_trait]
impl SttBackend for HttpStt {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> CoreResult<String> {
        let url = format!(
            "{}/audio/transcriptions",
            self.base_url.trim_end_matches('/')
        );
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.unwrap_or("audio.wav").to_string())
            .mime_str(mime_type)
            .map_err(|e| CoreError::Stt(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", TRANSCRIPTION_LANGUAGE);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CoreError::Stt(format!("STT API error {status}: {body}")));
        }

        let json: serde_json::Value = res.json().await?;
        let text = json
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        debug!(target: "sauti::stt", chars = text.len(), "transcription received");
        Ok(text)
    }
}
