use std::time::Instant;

use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use tracing::{info, warn};

use gemrelay_protocol::openai::create_chat_completions::{
    ChatMessage, CreateChatCompletionRequest, CreateChatCompletionResponse,
};
use gemrelay_provider_core::{
    Credential, ErrorKind, FallbackClient, Generation, ProviderFailure, ProviderSource,
};

use crate::upstream::{decode_json, handle_response, network_failure, require_text};

pub const PROVIDER_NAME: &str = "siliconflow";
pub const DEFAULT_BASE_URL: &str = "https://api.siliconflow.cn";
pub const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-V3";

const MODEL_LABEL: &str = "DeepSeek-V3";

/// OpenAI-compatible chat completions endpoint used as the fallback provider.
#[derive(Debug, Clone)]
pub struct SiliconFlowClient {
    client: wreq::Client,
    base_url: String,
    model: String,
}

impl SiliconFlowClient {
    pub fn new(client: wreq::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl FallbackClient for SiliconFlowClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<Generation, ProviderFailure> {
        let path = "/v1/chat/completions";
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let headers = build_openai_compat_headers(credential.expose())?;
        let body = CreateChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: Some(300),
            temperature: Some(0.8),
            top_p: Some(0.95),
        };
        let started_at = Instant::now();
        info!(
            event = "upstream_request",
            provider = %PROVIDER_NAME,
            op = "openai.chat",
            method = "POST",
            path = %path,
            model = %self.model
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
                    op = "openai.chat",
                    status = "error",
                    elapsed_ms = started_at.elapsed().as_millis(),
                    error = %err
                );
                network_failure(err)
            })?;
        info!(
            event = "upstream_response",
            provider = %PROVIDER_NAME,
            op = "openai.chat",
            status = %response.status().as_u16(),
            elapsed_ms = started_at.elapsed().as_millis()
        );

        let body = handle_response(response, false).await?;
        let parsed: CreateChatCompletionResponse = decode_json(&body)?;
        let text = require_text(
            parsed.first_content(),
            "response is missing choices[0].message.content",
        )?;
        Ok(Generation::new(text, MODEL_LABEL, ProviderSource::Backup))
    }
}

fn build_openai_compat_headers(api_key: &str) -> Result<HeaderMap, ProviderFailure> {
    let mut headers = HeaderMap::new();
    let mut bearer = String::with_capacity(api_key.len() + 7);
    bearer.push_str("Bearer ");
    bearer.push_str(api_key);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&bearer).map_err(|err| {
            ProviderFailure::new(
                ErrorKind::InvalidCredential,
                format!("api key is not a valid header value: {err}"),
            )
        })?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}
