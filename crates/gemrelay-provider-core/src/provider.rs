use async_trait::async_trait;

use crate::credential::Credential;
use crate::outcome::{Generation, ProviderFailure};
use crate::request::GenerationRequest;

/// One generation call against the primary provider for a given credential
/// and model tier. Every failure is classified; nothing is thrown opaquely.
#[async_trait]
pub trait PrimaryClient: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, req: GenerationRequest) -> Result<Generation, ProviderFailure>;
}

/// The secondary provider. Single model, no tiers, no regional restriction.
#[async_trait]
pub trait FallbackClient: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<Generation, ProviderFailure>;
}

/// Human-verification token check. Transport errors count as a failed check.
#[async_trait]
pub trait ChallengeVerifier: Send + Sync {
    async fn verify(&self, secret: &str, token: &str, remote_ip: Option<&str>) -> bool;
}
