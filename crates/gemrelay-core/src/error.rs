use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use gemrelay_protocol::api::ErrorBody;
use gemrelay_provider_core::ResolveError;

use crate::gate::GateError;

/// Caller-facing failure rendered as an [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: String,
    pub details: Option<String>,
    pub solution: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
            details: None,
            solution: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_solution(mut self, solution: impl Into<String>) -> Self {
        self.solution = Some(solution.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", message)
    }

    pub fn missing_credentials() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Configuration Error",
            "primary provider API key is not configured",
        )
        .with_details("set GEMINI_API_KEY, GEMINI_API_KEY_1..GEMINI_API_KEY_10 or GEMINI_API_KEYS")
        .with_solution("set the API key and redeploy")
    }

    pub fn missing_challenge_secret() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Configuration Error",
            "human verification secret is not configured",
        )
        .with_details("set TURNSTILE_SECRET_KEY")
        .with_solution("set the verification secret and redeploy")
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "analysis failed, please try again later",
        )
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", "no such resource")
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::ChallengeRequired => Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Turnstile Required",
                "too many requests, human verification required",
            )
            .with_details("include a valid turnstileToken in the request")
            .with_solution("complete the verification widget and retry"),
            GateError::ChallengeInvalid => Self::new(
                StatusCode::BAD_REQUEST,
                "Turnstile Invalid",
                "human verification failed",
            )
            .with_details("complete the verification again")
            .with_solution("refresh the page and verify again"),
            GateError::Store(_) => Self::internal(),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoCredentials => Self::missing_credentials(),
            err if err.is_location() => Self::new(
                StatusCode::BAD_REQUEST,
                "Location Error",
                "the primary provider is not available from this server's region",
            )
            .with_details("the upstream rejected the request based on its origin location")
            .with_solution("configure a fallback provider key or deploy in a supported region"),
            _ => Self::internal(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error.to_string(),
            message: self.message,
            details: self.details,
            solution: self.solution,
            timestamp: now_rfc3339(),
        };
        (self.status, Json(body)).into_response()
    }
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
