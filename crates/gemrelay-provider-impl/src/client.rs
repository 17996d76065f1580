use std::time::Duration;

use tracing::info;

/// Per-call upstream bound. A timed-out call is classified as a server error.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            proxy: None,
        }
    }
}

/// One client is shared by every provider and the challenge verifier.
pub fn build_client(config: &HttpClientConfig) -> Result<wreq::Client, wreq::Error> {
    let mut builder = wreq::Client::builder().timeout(config.timeout);
    if let Some(proxy) = config.proxy.as_deref().filter(|proxy| !proxy.trim().is_empty()) {
        builder = builder.proxy(wreq::Proxy::all(proxy)?);
        info!(event = "http_client_proxy", proxy = %proxy);
    }
    builder.build()
}
