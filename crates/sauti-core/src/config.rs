//! Provider configuration, read once from the environment at process start.
//!
//! A missing API key resolves to the `sk-` placeholder so provider calls fail
//! authentication instead of the process failing to boot.

/// Placeholder bearer key used when no real key is configured.
pub const PLACEHOLDER_API_KEY: &str = "sk-";

const DEFAULT_CHAT_API_URL: &str = "https://router.inspiraus.work/v1";
const DEFAULT_CHAT_MODEL: &str = "zephyr";
const DEFAULT_STT_API_URL: &str = "https://api.deepinfra.com/v1/openai";
const DEFAULT_STT_MODEL: &str = "whisper-large-v3";
const DEFAULT_TTS_API_URL: &str =
    "https://api.deepinfra.com/v1/inference/microsoft/speecht5_tts";

/// Chat completion provider settings.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// Model identifier sent with every completion request.
    pub model: String,
}

/// Transcription provider settings.
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// Model identifier sent with every transcription request.
    pub model: String,
}

/// Speech synthesis provider settings. The endpoint is the full inference
/// URL, not an OpenAI-style base.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Full synthesis endpoint URL.
    pub endpoint: String,
    /// Bearer API key.
    pub api_key: String,
}

/// All provider settings for one server process.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub chat: ChatConfig,
    pub stt: SttConfig,
    pub tts: TtsConfig,
}

impl ProviderConfig {
    /// Read provider settings from the environment. Never fails: every value
    /// has a default, and absent keys become [`PLACEHOLDER_API_KEY`].
    pub fn from_env() -> Self {
        let deepinfra_key = std::env::var("DEEPINFRA_API_KEY").ok();

        let chat = ChatConfig {
            base_url: env_or("CHAT_API_URL", DEFAULT_CHAT_API_URL),
            api_key: std::env::var("CHAT_API_KEY")
                .unwrap_or_else(|_| PLACEHOLDER_API_KEY.to_string()),
            model: env_or("CHAT_MODEL", DEFAULT_CHAT_MODEL),
        };

        let stt = SttConfig {
            base_url: env_or("STT_API_URL", DEFAULT_STT_API_URL),
            api_key: std::env::var("STT_API_KEY")
                .ok()
                .or_else(|| deepinfra_key.clone())
                .unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string()),
            model: env_or("STT_MODEL", DEFAULT_STT_MODEL),
        };

        let tts = TtsConfig {
            endpoint: env_or("TTS_API_URL", DEFAULT_TTS_API_URL),
            api_key: std::env::var("TTS_API_KEY")
                .ok()
                .or(deepinfra_key)
                .unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string()),
        };

        Self { chat, stt, tts }
    }
}

fn env_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => default.to_string(),
    }
}
