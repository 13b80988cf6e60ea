//! Application state: provider clients built once at startup.

use sauti_core::{ChatBackend, CoreResult, HttpChat, HttpStt, HttpTts, ProviderConfig, SttBackend, TtsBackend};
use std::sync::Arc;

/// Shared application state. Immutable after construction; cloning is cheap
/// and concurrent requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub stt: Arc<dyn SttBackend>,
    pub chat: Arc<dyn ChatBackend>,
    pub tts: Arc<dyn TtsBackend>,
}

impl AppState {
    /// Build production provider clients from configuration.
    pub fn new(config: ProviderConfig) -> CoreResult<Self> {
        Ok(Self {
            stt: Arc::new(HttpStt::new(config.stt)?),
            chat: Arc::new(HttpChat::new(config.chat)?),
            tts: Arc::new(HttpTts::new(config.tts)?),
        })
    }

    /// Wire explicit backends (tests and non-HTTP deployments).
    pub fn with_backends(
        stt: Arc<dyn SttBackend>,
        chat: Arc<dyn ChatBackend>,
        tts: Arc<dyn TtsBackend>,
    ) -> Self {
        Self { stt, chat, tts }
    }
}
