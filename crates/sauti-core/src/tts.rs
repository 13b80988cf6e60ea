//! Speech synthesis: turn the assistant reply into a PCM byte stream.
//!
//! The provider returns raw PCM float32 little-endian at 24 kHz; the stream
//! is forwarded to the HTTP caller without buffering the full payload.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt};
use serde::Serialize;
use std::pin::Pin;

use crate::config::TtsConfig;
use crate::error::{CoreError, CoreResult};

/// Output sample rate requested from the synthesis provider.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;
/// Output encoding requested from the synthesis provider.
pub const OUTPUT_FORMAT: &str = "pcm_f32le";
/// Fixed voice: speaker embedding reference passed to the provider.
pub const SPEAKER_EMBEDDINGS_URL: &str =
    "https://huggingface.co/datasets/Xenova/transformers.js-docs/resolve/main/speaker_embeddings.bin";

const SPEECH_RATE: f32 = 1.0;
const TTS_TIMEOUT_SECS: u64 = 60;

/// Synthesized audio as an incrementally consumable byte stream.
pub type AudioStream = Pin<Box<dyn Stream<Item = CoreResult<Bytes>> + Send>>;

/// Backend converting reply text into an audio byte stream.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize `text`. An error here means the provider refused the
    /// request; errors inside the returned stream mean transfer broke off.
    async fn synthesize(&self, text: &str) -> CoreResult<AudioStream>;
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    inputs: &'a str,
    parameters: SynthesisParameters<'a>,
}

#[derive(Debug, Serialize)]
struct SynthesisParameters<'a> {
    speaker_embeddings: &'a str,
    rate: f32,
    sample_rate: u32,
    output_format: &'a str,
}

/// Production TTS client posting to a fixed inference endpoint.
#[derive(Debug, Clone)]
pub struct HttpTts {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpTts {
    pub fn new(config: TtsConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(TTS_TIMEOUT_SECS))
            .build()
            .map_err(|e| CoreError::Tts(e.to_string()))?;
        Ok(Self {
            endpoint: config.endpoint,
            api_key: config.api_key,
            client,
        })
    }
}

#[async_trait]
impl TtsBackend for HttpTts {
    async fn synthesize(&self, text: &str) -> CoreResult<AudioStream> {
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SynthesisRequest {
                inputs: text,
                parameters: SynthesisParameters {
                    speaker_embeddings: SPEAKER_EMBEDDINGS_URL,
                    rate: SPEECH_RATE,
                    sample_rate: OUTPUT_SAMPLE_RATE,
                    output_format: OUTPUT_FORMAT,
                },
            })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CoreError::Tts(format!("TTS API error {status}: {body}")));
        }

        let stream = res
            .bytes_stream()
            .map_err(CoreError::from)
            .boxed();
        Ok(stream)
    }
}
