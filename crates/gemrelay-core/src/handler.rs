use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderMap, Method, Uri};
use serde_json::{Number, Value};
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use gemrelay_protocol::api::{AnalyzeMetadata, AnalyzeResponse, HealthResponse, RefusalResponse};
use gemrelay_provider_core::{Credential, CredentialPool, keys};

use crate::client_ip::client_key;
use crate::core::CoreState;
use crate::error::{ApiError, now_rfc3339};
use crate::gate::GateError;
use crate::prompt::build_prompt;

pub const SERVICE_NAME: &str = "gemrelay";
pub const REFUSAL_MESSAGE: &str = "这个名字好像不太好分析呢，换个名字吧";

const CHALLENGE_HEADER: &str = "cf-turnstile-response";
const ANALYSIS_CACHE: &str = "public, max-age=300";
const FAVICON_CACHE: &str = "public, max-age=86400";

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: now_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn analyze_handler(
    State(state): State<Arc<CoreState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let client = client_key(&headers);
    let span = info_span!("analyze", trace_id = %Uuid::new_v4(), client = %client);
    async move {
        info!(event = "analyze_request");
        match analyze(&state, &client, &headers, body).await {
            Ok(response) => response,
            Err(err) => {
                info!(event = "analyze_rejected", status = err.status.as_u16(), error = err.error);
                err.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn analyze(
    state: &CoreState,
    client: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: Value = serde_json::from_slice(&body).map_err(|err| {
        debug!(event = "malformed_body", error = %err);
        ApiError::bad_request("request body must be valid JSON")
    })?;

    let name = body
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("name is required and must be a string"))?;

    if state.denylist.matches(name) {
        info!(event = "name_refused");
        let refusal = RefusalResponse {
            success: false,
            message: REFUSAL_MESSAGE.to_string(),
            timestamp: now_rfc3339(),
        };
        return Ok(Json(refusal).into_response());
    }

    let score = body
        .get("score")
        .and_then(valid_score)
        .ok_or_else(|| {
            ApiError::bad_request("score is required and must be a number between 0 and 100")
        })?;

    let pool = CredentialPool::from_source(state.config.as_ref());
    if pool.is_empty() {
        error!(event = "config_missing", key = keys::GEMINI_API_KEY);
        return Err(ApiError::missing_credentials());
    }
    let secret = state
        .config
        .get_non_empty(keys::TURNSTILE_SECRET_KEY)
        .filter(|secret| secret != keys::TURNSTILE_SECRET_PLACEHOLDER)
        .ok_or_else(|| {
            error!(event = "config_missing", key = keys::TURNSTILE_SECRET_KEY);
            ApiError::missing_challenge_secret()
        })?;

    let token = body
        .get("turnstileToken")
        .and_then(Value::as_str)
        .or_else(|| headers.get(CHALLENGE_HEADER).and_then(|v| v.to_str().ok()));
    let admission = state
        .gate
        .admit(client, token, &secret)
        .await
        .map_err(|err| {
            if let GateError::Store(store) = &err {
                error!(event = "throttle_store_failed", error = %store);
            }
            ApiError::from(err)
        })?;
    debug!(event = "admitted", admission = ?admission);

    let prompt = build_prompt(name, &score);
    let fallback = Credential::fallback_from_source(state.config.as_ref());
    let generation = state
        .resolver
        .resolve(&prompt, &pool, fallback.as_ref())
        .await
        .map_err(|err| {
            error!(event = "resolve_failed", kind = ?err.kind(), error = %err);
            ApiError::from(err)
        })?;
    info!(
        event = "analyze_complete",
        model = %generation.model,
        source = generation.source.as_str(),
        key_index = ?generation.key_index
    );

    let response = AnalyzeResponse {
        success: true,
        analysis: generation.text,
        metadata: AnalyzeMetadata {
            name: name.to_string(),
            score,
            timestamp: now_rfc3339(),
            model: generation.model,
            source: generation.source.as_str().to_string(),
        },
    };
    Ok(([(CACHE_CONTROL, ANALYSIS_CACHE)], Json(response)).into_response())
}

fn valid_score(value: &Value) -> Option<Number> {
    let Value::Number(number) = value else {
        return None;
    };
    number
        .as_f64()
        .filter(|score| (0.0..=100.0).contains(score))
        .map(|_| number.clone())
}

pub async fn favicon_handler(State(state): State<Arc<CoreState>>) -> Response {
    let Some(asset) = state
        .assets
        .as_ref()
        .and_then(|assets| assets.get("favicon.svg"))
    else {
        return ApiError::not_found().into_response();
    };
    (
        [(CONTENT_TYPE, asset.mime), (CACHE_CONTROL, FAVICON_CACHE.to_string())],
        asset.body,
    )
        .into_response()
}

pub async fn asset_handler(
    State(state): State<Arc<CoreState>>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return ApiError::not_found().into_response();
    }
    let path = match uri.path().trim_start_matches('/') {
        "" => "index.html",
        path => path,
    };
    match state.assets.as_ref().and_then(|assets| assets.get(path)) {
        Some(asset) => ([(CONTENT_TYPE, asset.mime)], asset.body).into_response(),
        None => ApiError::not_found().into_response(),
    }
}
