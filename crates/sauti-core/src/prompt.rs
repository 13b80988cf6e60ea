//! System instruction for the voice assistant.
//!
//! The template is static; only the caller's location and local time are
//! interpolated. Wording is tuned for speech output, so no markdown and no
//! real-time claims.

/// Location and wall-clock context for one turn, derived from request
/// metadata by the server. Both are plain display strings.
#[derive(Debug, Clone)]
pub struct TurnContext {
    /// "City, Region, Country" or "unknown".
    pub location: String,
    /// Current time rendered in the caller's timezone.
    pub time: String,
}

/// Build the system instruction for one turn.
pub fn system_prompt(ctx: &TurnContext) -> String {
    format!(
        "- You are Sauti, a friendly and helpful voice assistant.\n\
         - Respond briefly to the user's request, and do not provide unnecessary information.\n\
         - If you don't understand the user's request, ask for clarification.\n\
         - You do not have access to up-to-date information, so you should not provide real-time data.\n\
         - You are not capable of performing actions other than responding to the user.\n\
         - Do not use markdown, emojis, or other formatting in your responses. Respond in a way easily spoken by text-to-speech software.\n\
         - User location is {location}.\n\
         - The current time is {time}.\n\
         - Your large language model is Zephyr, a powerful open-source model.\n\
         - Your speech-to-text and text-to-speech models are Whisper and SpeechT5, hosted by DeepInfra.",
        location = ctx.location,
        time = ctx.time,
    )
}
