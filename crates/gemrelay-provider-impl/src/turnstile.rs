use async_trait::async_trait;
use tracing::{info, warn};

use gemrelay_protocol::turnstile::SiteVerifyResponse;
use gemrelay_provider_core::ChallengeVerifier;

pub const DEFAULT_VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

#[derive(Debug, Clone)]
pub struct TurnstileVerifier {
    client: wreq::Client,
    verify_url: String,
}

impl TurnstileVerifier {
    pub fn new(client: wreq::Client) -> Self {
        Self {
            client,
            verify_url: DEFAULT_VERIFY_URL.to_string(),
        }
    }

    pub fn with_verify_url(mut self, verify_url: impl Into<String>) -> Self {
        self.verify_url = verify_url.into();
        self
    }
}

#[async_trait]
impl ChallengeVerifier for TurnstileVerifier {
    async fn verify(&self, secret: &str, token: &str, remote_ip: Option<&str>) -> bool {
        let mut form = vec![("secret", secret), ("response", token)];
        if let Some(remote_ip) = remote_ip {
            form.push(("remoteip", remote_ip));
        }

        let response = match self.client.post(self.verify_url.as_str()).form(&form).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(event = "challenge_verify", status = "error", error = %err);
                return false;
            }
        };
        let status = response.status();
        match response.json::<SiteVerifyResponse>().await {
            Ok(result) => {
                info!(
                    event = "challenge_verify",
                    status = %status.as_u16(),
                    success = result.success,
                    error_codes = ?result.error_codes
                );
                result.success
            }
            Err(err) => {
                warn!(
                    event = "challenge_verify",
                    status = %status.as_u16(),
                    error = %err,
                    "undecodable verification response"
                );
                false
            }
        }
    }
}
