use std::time::Instant;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use tracing::{info, warn};

use gemrelay_protocol::gemini::generate_content::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, HarmBlockThreshold,
    HarmCategory, Part, SafetySetting,
};
use gemrelay_provider_core::{
    ErrorKind, Generation, GenerationRequest, PrimaryClient, ProviderFailure, ProviderSource,
};

use crate::upstream::{decode_json, handle_response, network_failure, require_text};

pub const PROVIDER_NAME: &str = "aistudio";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const SAFETY_CATEGORIES: [HarmCategory; 4] = [
    HarmCategory::Harassment,
    HarmCategory::HateSpeech,
    HarmCategory::SexuallyExplicit,
    HarmCategory::DangerousContent,
];

#[derive(Debug, Clone)]
pub struct AistudioClient {
    client: wreq::Client,
    base_url: String,
}

impl AistudioClient {
    pub fn new(client: wreq::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PrimaryClient for AistudioClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate(&self, req: GenerationRequest) -> Result<Generation, ProviderFailure> {
        let model = req.tier.model();
        let path = format!("/v1beta/models/{model}:generateContent");
        let url = build_url(&self.base_url, &path);
        let headers = build_gemini_headers(req.credential.expose())?;
        let body = generate_body(&req.prompt);
        let started_at = Instant::now();
        info!(
            event = "upstream_request",
            provider = %PROVIDER_NAME,
            op = "gemini.generate",
            method = "POST",
            path = %path,
            model = %model,
            credential = %req.credential.masked()
        );
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                warn!(
                    event = "upstream_response",
                    provider = %PROVIDER_NAME,
                    op = "gemini.generate",
                    status = "error",
                    elapsed_ms = started_at.elapsed().as_millis(),
                    error = %err
                );
                network_failure(err)
            })?;
        info!(
            event = "upstream_response",
            provider = %PROVIDER_NAME,
            op = "gemini.generate",
            status = %response.status().as_u16(),
            elapsed_ms = started_at.elapsed().as_millis()
        );

        let body = handle_response(response, true).await?;
        let parsed: GenerateContentResponse = decode_json(&body)?;
        let text = require_text(
            parsed.first_text(),
            "response is missing candidates[0].content.parts[0].text",
        )?;
        Ok(Generation::new(text, model, ProviderSource::Gemini))
    }
}

pub fn generate_body(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: None,
            parts: vec![Part::text(prompt)],
        }],
        generation_config: Some(GenerationConfig {
            temperature: Some(0.8),
            top_k: Some(40),
            top_p: Some(0.95),
            max_output_tokens: Some(300),
        }),
        safety_settings: SAFETY_CATEGORIES
            .into_iter()
            .map(|category| SafetySetting {
                category,
                threshold: HarmBlockThreshold::BlockMediumAndAbove,
            })
            .collect(),
    }
}

fn build_gemini_headers(api_key: &str) -> Result<HeaderMap, ProviderFailure> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-goog-api-key",
        HeaderValue::from_str(api_key).map_err(|err| {
            ProviderFailure::new(
                ErrorKind::InvalidCredential,
                format!("api key is not a valid header value: {err}"),
            )
        })?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let mut path = path.trim_start_matches('/');
    if base.ends_with("/v1beta") && (path == "v1beta" || path.starts_with("v1beta/")) {
        path = path.trim_start_matches("v1beta/").trim_start_matches("v1beta");
    }
    format!("{base}/{path}")
}
