use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    LocationUnsupported,
    BadRequest,
    InvalidCredential,
    AccessDenied,
    RateLimited,
    ServerError,
    MalformedResponse,
    EmptyResponse,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::LocationUnsupported => "location_unsupported",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::InvalidCredential => "invalid_credential",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::ServerError => "server_error",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::EmptyResponse => "empty_response",
            ErrorKind::Unknown => "unknown",
        }
    }

    pub fn degrades_tier(self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::ServerError | ErrorKind::AccessDenied
        )
    }

    /// Status-code mapping shared by both provider clients. Location
    /// detection happens before this, on the error body.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::InvalidCredential,
            403 => ErrorKind::AccessDenied,
            429 => ErrorKind::RateLimited,
            500 | 502 | 503 | 504 => ErrorKind::ServerError,
            _ => ErrorKind::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed provider attempt, classified at the client boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProviderFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl ProviderFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn deadline_exceeded() -> Self {
        Self::new(ErrorKind::ServerError, "deadline exceeded")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSource {
    Gemini,
    Backup,
}

impl ProviderSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderSource::Gemini => "gemini",
            ProviderSource::Backup => "backup",
        }
    }
}

impl fmt::Display for ProviderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful generation. `key_index` is the 1-based position of the primary
/// credential in the attempt order, absent for the fallback provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub model: String,
    pub source: ProviderSource,
    pub key_index: Option<usize>,
}

impl Generation {
    pub fn new(text: impl Into<String>, model: impl Into<String>, source: ProviderSource) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            source,
            key_index: None,
        }
    }
}
