use std::sync::Arc;

use tracing::{debug, info, warn};

use gemrelay_provider_core::ChallengeVerifier;
use gemrelay_storage::{StoreError, ThrottleStore};

use crate::client_ip::UNKNOWN_CLIENT;

pub const CHALLENGE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Counted(u32),
    Verified,
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("challenge token required")]
    ChallengeRequired,
    #[error("challenge token rejected")]
    ChallengeInvalid,
    #[error("throttle store: {0}")]
    Store(#[from] StoreError),
}

/// Per-client request counter that demands a human-verification token once
/// the threshold is reached.
#[derive(Clone)]
pub struct ThrottleGate {
    store: Arc<dyn ThrottleStore>,
    verifier: Arc<dyn ChallengeVerifier>,
    threshold: u32,
}

impl ThrottleGate {
    pub fn new(store: Arc<dyn ThrottleStore>, verifier: Arc<dyn ChallengeVerifier>) -> Self {
        Self {
            store,
            verifier,
            threshold: CHALLENGE_THRESHOLD,
        }
    }

    pub async fn admit(
        &self,
        client_key: &str,
        token: Option<&str>,
        secret: &str,
    ) -> Result<Admission, GateError> {
        if let Some(record) = self
            .store
            .increment_below(client_key, self.threshold)
            .await?
        {
            debug!(event = "throttle_count", client = %client_key, count = record.count);
            return Ok(Admission::Counted(record.count));
        }

        let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
            info!(event = "challenge_required", client = %client_key);
            return Err(GateError::ChallengeRequired);
        };

        let remote_ip = (client_key != UNKNOWN_CLIENT).then_some(client_key);
        if !self.verifier.verify(secret, token, remote_ip).await {
            warn!(event = "challenge_rejected", client = %client_key);
            return Err(GateError::ChallengeInvalid);
        }

        self.store.delete(client_key).await?;
        info!(event = "challenge_passed", client = %client_key);
        Ok(Admission::Verified)
    }
}
