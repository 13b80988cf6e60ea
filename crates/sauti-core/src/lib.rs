//! Sauti core: provider clients for the voice turn pipeline.
//!
//! One turn is transcript resolution (STT or identity), reply generation
//! (chat completion), and speech synthesis (TTS). Each provider sits behind
//! a trait so the server can be exercised with mock backends; the production
//! implementations speak HTTP via reqwest.

pub mod chat;
pub mod config;
pub mod error;
pub mod message;
pub mod prompt;
pub mod stt;
pub mod tts;

pub use chat::{ChatBackend, HttpChat};
pub use config::{ChatConfig, ProviderConfig, SttConfig, TtsConfig};
pub use error::{CoreError, CoreResult};
pub use message::{ChatMessage, ChatRole};
pub use prompt::{system_prompt, TurnContext};
pub use stt::{HttpStt, SttBackend};
pub use tts::{AudioStream, HttpTts, TtsBackend};
