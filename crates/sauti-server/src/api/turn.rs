//! The voice turn handler: one multipart request in, one audio stream out.
//!
//! Pipeline is strictly sequential: resolve the transcript (identity for text
//! input, STT for audio), generate the reply, synthesize speech, forward the
//! provider's PCM stream with percent-encoded `X-Transcript`/`X-Response`
//! headers. Failure at any stage short-circuits the rest.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Extension, Multipart, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    RequestExt,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, error, info, warn};

use crate::api::request_context::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;
use sauti_core::{system_prompt, ChatMessage, ChatRole, TurnContext};

const CITY_HEADER: &str = "x-vercel-ip-city";
const REGION_HEADER: &str = "x-vercel-ip-country-region";
const COUNTRY_HEADER: &str = "x-vercel-ip-country";
const TIMEZONE_HEADER: &str = "x-vercel-ip-timezone";

/// Header characters left unescaped, matching JavaScript's
/// `encodeURIComponent` so existing clients decode the values unchanged.
const HEADER_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug)]
enum TurnInput {
    Text(String),
    Audio {
        bytes: Vec<u8>,
        mime_type: String,
        file_name: Option<String>,
    },
}

#[derive(Debug)]
struct ParsedTurnRequest {
    input: TurnInput,
    history: Vec<ChatMessage>,
}

pub async fn voice_turn(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    req: Request,
) -> Result<Response, ApiError> {
    let headers = req.headers().clone();
    let parsed = parse_turn_request(req).await?;
    let correlation_id = ctx.correlation_id;

    // Stage 1: transcript resolution. Text input is the transcript verbatim;
    // only an exactly-empty text field counts as no transcript.
    let transcript = match parsed.input {
        TurnInput::Text(text) if text.is_empty() => {
            warn!(target: "sauti::turn", correlation_id = %correlation_id, "empty text input");
            return Err(ApiError::bad_request("Invalid audio"));
        }
        TurnInput::Text(text) => text,
        TurnInput::Audio {
            bytes,
            mime_type,
            file_name,
        } => {
            debug!(target: "sauti::turn", correlation_id = %correlation_id, bytes = bytes.len(), "transcription started");
            let started = Instant::now();
            let result = state
                .stt
                .transcribe(bytes, &mime_type, file_name.as_deref())
                .await;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            match result {
                Ok(text) if !text.trim().is_empty() => {
                    info!(target: "sauti::turn", correlation_id = %correlation_id, elapsed_ms, "transcription complete");
                    text.trim().to_string()
                }
                Ok(_) => {
                    warn!(target: "sauti::turn", correlation_id = %correlation_id, elapsed_ms, "transcription returned empty text");
                    return Err(ApiError::bad_request("Invalid audio"));
                }
                Err(err) => {
                    warn!(target: "sauti::turn", correlation_id = %correlation_id, elapsed_ms, error = %err, "transcription failed");
                    return Err(ApiError::bad_request("Invalid audio"));
                }
            }
        }
    };

    // Stage 2: reply generation. System instruction, then the submitted
    // history verbatim, then the transcript as the final user turn.
    let turn_ctx = TurnContext {
        location: location_from_headers(&headers),
        time: format_time(Utc::now(), header_str(&headers, TIMEZONE_HEADER)),
    };
    let mut messages = Vec::with_capacity(parsed.history.len() + 2);
    messages.push(ChatMessage::system(system_prompt(&turn_ctx)));
    messages.extend(parsed.history);
    messages.push(ChatMessage::user(transcript.clone()));

    debug!(target: "sauti::turn", correlation_id = %correlation_id, "text completion started");
    let started = Instant::now();
    let reply = match state.chat.complete(&messages).await {
        Ok(reply) => {
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            info!(target: "sauti::turn", correlation_id = %correlation_id, elapsed_ms, "text completion complete");
            reply
        }
        Err(err) => {
            error!(target: "sauti::turn", correlation_id = %correlation_id, error = %err, "text completion failed");
            return Err(ApiError::internal("Reply generation failed"));
        }
    };

    // Stage 3: speech synthesis. Provider error bodies stay in the log.
    debug!(target: "sauti::turn", correlation_id = %correlation_id, "synthesis request started");
    let started = Instant::now();
    let audio = match state.tts.synthesize(&reply).await {
        Ok(audio) => {
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            info!(target: "sauti::turn", correlation_id = %correlation_id, elapsed_ms, "synthesis request complete");
            audio
        }
        Err(err) => {
            error!(target: "sauti::turn", correlation_id = %correlation_id, error = %err, "synthesis failed");
            return Err(ApiError::internal("Voice synthesis failed"));
        }
    };

    // Stage 4: forward the PCM stream. The streaming measurement can only
    // finish once the last chunk has been handed to the transport, so the
    // end log lives at the tail of the forwarding stream.
    debug!(target: "sauti::turn", correlation_id = %correlation_id, "stream started");
    let stream_started = Instant::now();
    let stream_id = correlation_id.clone();
    let body_stream = async_stream::stream! {
        let mut audio = audio;
        let mut forwarded: usize = 0;
        while let Some(chunk) = audio.next().await {
            match chunk {
                Ok(bytes) => {
                    forwarded += bytes.len();
                    yield Ok::<Bytes, sauti_core::CoreError>(bytes);
                }
                Err(err) => {
                    warn!(target: "sauti::turn", correlation_id = %stream_id, error = %err, "audio stream broke off");
                    yield Err(err);
                    return;
                }
            }
        }
        let elapsed_ms = stream_started.elapsed().as_secs_f64() * 1000.0;
        info!(target: "sauti::turn", correlation_id = %stream_id, elapsed_ms, bytes = forwarded, "stream complete");
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("X-Transcript", encode_header_value(&transcript))
        .header("X-Response", encode_header_value(&reply))
        .body(Body::from_stream(body_stream))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {e}")))
}

async fn parse_turn_request(req: Request) -> Result<ParsedTurnRequest, ApiError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if !content_type.starts_with("multipart/form-data") {
        return Err(ApiError::bad_request("Invalid request"));
    }

    let mut multipart = req
        .extract::<Multipart, _>()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart payload: {e}")))?;

    let mut input: Option<TurnInput> = None;
    let mut history: Vec<ChatMessage> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed reading multipart field: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "input" => {
                if input.is_some() {
                    return Err(ApiError::bad_request(
                        "Invalid request: multiple 'input' fields",
                    ));
                }
                if field.file_name().is_some() {
                    let file_name = field.file_name().map(|v| v.to_string());
                    let mime_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(|e| {
                        ApiError::bad_request(format!("Failed reading 'input' bytes: {e}"))
                    })?;
                    input = Some(TurnInput::Audio {
                        bytes: bytes.to_vec(),
                        mime_type,
                        file_name,
                    });
                } else {
                    let text = field.text().await.map_err(|e| {
                        ApiError::bad_request(format!("Failed reading 'input' field: {e}"))
                    })?;
                    input = Some(TurnInput::Text(text));
                }
            }
            "message" => {
                let raw = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed reading 'message' field: {e}"))
                })?;
                let message: ChatMessage = serde_json::from_str(&raw).map_err(|e| {
                    ApiError::bad_request(format!("Invalid 'message' entry: {e}"))
                })?;
                if message.role == ChatRole::System {
                    return Err(ApiError::bad_request(
                        "Invalid 'message' entry: role must be user or assistant",
                    ));
                }
                history.push(message);
            }
            _ => {}
        }
    }

    let input = input.ok_or_else(|| ApiError::bad_request("Invalid request"))?;
    Ok(ParsedTurnRequest { input, history })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// "City, Region, Country" when all three geographic headers are present,
/// otherwise "unknown".
fn location_from_headers(headers: &HeaderMap) -> String {
    match (
        header_str(headers, CITY_HEADER),
        header_str(headers, REGION_HEADER),
        header_str(headers, COUNTRY_HEADER),
    ) {
        (Some(city), Some(region), Some(country)) => format!("{city}, {region}, {country}"),
        _ => "unknown".to_string(),
    }
}

/// Render `now` in the caller's timezone. An absent or unparseable IANA name
/// falls back to UTC.
fn format_time(now: DateTime<Utc>, timezone: Option<&str>) -> String {
    const TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
    match timezone.and_then(|name| name.parse::<chrono_tz::Tz>().ok()) {
        Some(tz) => now.with_timezone(&tz).format(TIME_FORMAT).to_string(),
        None => now.format(TIME_FORMAT).to_string(),
    }
}

fn encode_header_value(raw: &str) -> String {
    utf8_percent_encode(raw, HEADER_ESCAPE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::TimeZone;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn location_requires_all_three_headers() {
        let full = headers(&[
            (CITY_HEADER, "Nairobi"),
            (REGION_HEADER, "30"),
            (COUNTRY_HEADER, "KE"),
        ]);
        assert_eq!(location_from_headers(&full), "Nairobi, 30, KE");

        let partial = headers(&[(CITY_HEADER, "Nairobi"), (COUNTRY_HEADER, "KE")]);
        assert_eq!(location_from_headers(&partial), "unknown");

        assert_eq!(location_from_headers(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn time_respects_timezone_header() {
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 12, 30, 5).unwrap();
        assert_eq!(format_time(now, None), "8/27/2026, 12:30:05 PM");
        assert_eq!(
            format_time(now, Some("America/New_York")),
            "8/27/2026, 8:30:05 AM"
        );
        // Bad IANA names fall back to UTC rather than failing the turn.
        assert_eq!(format_time(now, Some("Mars/Olympus")), "8/27/2026, 12:30:05 PM");
    }

    #[test]
    fn header_encoding_matches_encode_uri_component() {
        assert_eq!(encode_header_value("Hello"), "Hello");
        assert_eq!(encode_header_value("Hi there"), "Hi%20there");
        assert_eq!(
            encode_header_value("it's ~fine! (really)"),
            "it's%20~fine!%20(really)"
        );
        assert_eq!(encode_header_value("a/b?c=d&e"), "a%2Fb%3Fc%3Dd%26e");
        assert_eq!(encode_header_value("héllo"), "h%C3%A9llo");
    }
}
