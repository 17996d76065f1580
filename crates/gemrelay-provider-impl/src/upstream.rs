use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use gemrelay_protocol::gemini::error::ErrorResponse;
use gemrelay_provider_core::{ErrorKind, ProviderFailure};

pub const LOCATION_UNSUPPORTED_MARKER: &str = "User location is not supported";

const MAX_ERROR_MESSAGE_CHARS: usize = 512;

pub fn network_failure(err: wreq::Error) -> ProviderFailure {
    if err.is_timeout() {
        ProviderFailure::new(ErrorKind::ServerError, format!("upstream timed out: {err}"))
    } else {
        ProviderFailure::new(ErrorKind::ServerError, format!("network error: {err}"))
    }
}

pub async fn handle_response(
    response: wreq::Response,
    location_aware: bool,
) -> Result<Bytes, ProviderFailure> {
    let status = response.status();
    let body = response.bytes().await.map_err(network_failure)?;
    if status.is_success() {
        return Ok(body);
    }
    Err(classify_error(status, &body, location_aware))
}

pub fn classify_error(status: StatusCode, body: &[u8], location_aware: bool) -> ProviderFailure {
    let message = error_message(body);
    let kind = if location_aware && message.contains(LOCATION_UNSUPPORTED_MARKER) {
        ErrorKind::LocationUnsupported
    } else {
        ErrorKind::from_status(status.as_u16())
    };
    ProviderFailure::new(kind, message).with_status(status.as_u16())
}

/// `error.message` of a structured error body, else the raw body text.
pub fn error_message(body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorResponse>(body)
        && let Some(message) = parsed.error.message
    {
        return message;
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return "empty error body".to_string();
    }
    text.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProviderFailure> {
    serde_json::from_slice(body).map_err(|err| {
        ProviderFailure::new(
            ErrorKind::MalformedResponse,
            format!("undecodable response body: {err}"),
        )
    })
}

/// Trimmed generated text, or the matching failure when it is absent or blank.
pub fn require_text(text: Option<&str>, missing: &str) -> Result<String, ProviderFailure> {
    let Some(text) = text else {
        return Err(ProviderFailure::new(ErrorKind::MalformedResponse, missing));
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderFailure::new(
            ErrorKind::EmptyResponse,
            "generated text is empty",
        ));
    }
    Ok(text.to_string())
}
