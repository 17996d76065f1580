use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::credential::{Credential, CredentialPool};
use crate::outcome::{ErrorKind, Generation, ProviderFailure};
use crate::provider::{FallbackClient, PrimaryClient};
use crate::request::{GenerationRequest, ModelTier};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(45);
pub const DEFAULT_MAX_ATTEMPTS: usize = 24;

/// Order in which primary credentials are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOrder {
    #[default]
    Shuffled,
    /// Shuffle driven by a fixed seed; the same seed yields the same order.
    Seeded(u64),
    AsConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no primary credentials configured")]
    NoCredentials,
    #[error("primary provider unavailable at this location: {0}")]
    LocationUnsupported(ProviderFailure),
    #[error("primary provider unavailable at this location ({location}) and fallback failed: {fallback}")]
    LocationFallbackFailed {
        location: ProviderFailure,
        fallback: ProviderFailure,
    },
    #[error("all primary credentials failed (last: {last_primary}) and fallback failed: {fallback}")]
    FallbackFailed {
        last_primary: ProviderFailure,
        fallback: ProviderFailure,
    },
    #[error("all primary credentials failed and no fallback is configured (last: {last})")]
    AllProvidersExhausted { last: ProviderFailure },
}

impl ResolveError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ResolveError::NoCredentials => None,
            ResolveError::LocationUnsupported(failure) => Some(failure.kind),
            ResolveError::LocationFallbackFailed { fallback, .. }
            | ResolveError::FallbackFailed { fallback, .. } => Some(fallback.kind),
            ResolveError::AllProvidersExhausted { last } => Some(last.kind),
        }
    }

    pub fn is_location(&self) -> bool {
        matches!(
            self,
            ResolveError::LocationUnsupported(_) | ResolveError::LocationFallbackFailed { .. }
        )
    }
}

/// Walks primary credentials and model tiers, then the fallback provider.
pub struct Resolver {
    primary: Arc<dyn PrimaryClient>,
    fallback: Arc<dyn FallbackClient>,
    order: KeyOrder,
    deadline: Duration,
    max_attempts: usize,
}

impl Resolver {
    pub fn new(primary: Arc<dyn PrimaryClient>, fallback: Arc<dyn FallbackClient>) -> Self {
        Self {
            primary,
            fallback,
            order: KeyOrder::default(),
            deadline: DEFAULT_DEADLINE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_order(mut self, order: KeyOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub async fn resolve(
        &self,
        prompt: &str,
        pool: &CredentialPool,
        fallback: Option<&Credential>,
    ) -> Result<Generation, ResolveError> {
        if pool.is_empty() {
            return Err(ResolveError::NoCredentials);
        }

        let started_at = Instant::now();
        let keys = self.ordered(pool);
        info!(
            event = "resolve_start",
            provider = %self.primary.name(),
            credentials = keys.len(),
            has_fallback = fallback.is_some()
        );

        let mut attempts = 0usize;
        let mut location: Option<ProviderFailure> = None;
        let mut last: Option<ProviderFailure> = None;

        'keys: for (index, credential) in keys.iter().enumerate() {
            let key_index = index + 1;
            for tier in [ModelTier::Primary, ModelTier::PrimaryReduced] {
                if attempts >= self.max_attempts {
                    warn!(event = "resolve_attempt_cap", attempts = attempts);
                    break 'keys;
                }
                let Some(remaining) = self.remaining(started_at) else {
                    warn!(
                        event = "resolve_deadline",
                        elapsed_ms = started_at.elapsed().as_millis()
                    );
                    last = Some(ProviderFailure::deadline_exceeded());
                    break 'keys;
                };
                attempts += 1;

                let request = GenerationRequest::new(prompt, credential.clone(), tier);
                let call = self.primary.generate(request);
                let result = match tokio::time::timeout(remaining, call).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderFailure::deadline_exceeded()),
                };

                match result {
                    Ok(mut generation) => {
                        generation.key_index = Some(key_index);
                        info!(
                            event = "resolve_ok",
                            source = %generation.source,
                            model = %generation.model,
                            key_index = key_index,
                            attempts = attempts
                        );
                        return Ok(generation);
                    }
                    Err(failure) if failure.kind == ErrorKind::LocationUnsupported => {
                        warn!(
                            event = "resolve_location_unsupported",
                            key_index = key_index,
                            credential = %credential.masked(),
                            model = %tier,
                            "skipping remaining primary credentials"
                        );
                        location = Some(failure);
                        break 'keys;
                    }
                    Err(failure) => {
                        let degrade = tier == ModelTier::Primary && failure.kind.degrades_tier();
                        warn!(
                            event = "resolve_attempt_failed",
                            key_index = key_index,
                            credential = %credential.masked(),
                            model = %tier,
                            kind = %failure.kind,
                            status = ?failure.status,
                            error = %failure.message,
                            degrade = degrade
                        );
                        last = Some(failure);
                        if !degrade {
                            continue 'keys;
                        }
                    }
                }
            }
        }

        match (location, fallback) {
            (Some(location), Some(credential)) => self
                .call_fallback(prompt, credential, started_at)
                .await
                .map_err(|fallback| ResolveError::LocationFallbackFailed { location, fallback }),
            (Some(location), None) => Err(ResolveError::LocationUnsupported(location)),
            (None, Some(credential)) => {
                let last_primary = last.unwrap_or_else(ProviderFailure::deadline_exceeded);
                self.call_fallback(prompt, credential, started_at)
                    .await
                    .map_err(|fallback| ResolveError::FallbackFailed {
                        last_primary,
                        fallback,
                    })
            }
            (None, None) => Err(ResolveError::AllProvidersExhausted {
                last: last.unwrap_or_else(ProviderFailure::deadline_exceeded),
            }),
        }
    }

    fn ordered(&self, pool: &CredentialPool) -> Vec<Credential> {
        let mut keys = pool.as_slice().to_vec();
        match self.order {
            KeyOrder::Shuffled => keys.shuffle(&mut rand::rng()),
            KeyOrder::Seeded(seed) => keys.shuffle(&mut StdRng::seed_from_u64(seed)),
            KeyOrder::AsConfigured => {}
        }
        keys
    }

    fn remaining(&self, started_at: Instant) -> Option<Duration> {
        self.deadline
            .checked_sub(started_at.elapsed())
            .filter(|remaining| !remaining.is_zero())
    }

    async fn call_fallback(
        &self,
        prompt: &str,
        credential: &Credential,
        started_at: Instant,
    ) -> Result<Generation, ProviderFailure> {
        let Some(remaining) = self.remaining(started_at) else {
            return Err(ProviderFailure::deadline_exceeded());
        };
        info!(
            event = "resolve_fallback",
            provider = %self.fallback.name(),
            model = %self.fallback.model()
        );
        let result = tokio::time::timeout(remaining, self.fallback.generate(prompt, credential))
            .await
            .unwrap_or_else(|_| Err(ProviderFailure::deadline_exceeded()));
        match &result {
            Ok(generation) => info!(
                event = "resolve_ok",
                source = %generation.source,
                model = %generation.model
            ),
            Err(failure) => warn!(
                event = "resolve_fallback_failed",
                kind = %failure.kind,
                error = %failure.message
            ),
        }
        result
    }
}
