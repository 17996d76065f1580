use async_trait::async_trait;
use time::{Duration, OffsetDateTime};

/// How long a client's counter lives, measured from its first increment.
pub const THROTTLE_WINDOW: Duration = Duration::hours(24);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleRecord {
    pub client_key: String,
    pub count: u32,
    pub first_seen_at: OffsetDateTime,
}

impl ThrottleRecord {
    pub fn new(client_key: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            client_key: client_key.into(),
            count: 0,
            first_seen_at: now,
        }
    }

    pub fn is_expired(&self, now: OffsetDateTime, window: Duration) -> bool {
        now - self.first_seen_at > window
    }
}

#[derive(Debug, thiserror::Error)]
#[error("throttle store error: {0}")]
pub struct StoreError(pub String);

/// Per-client request counter with expiry. Implementations treat expired
/// records as absent.
#[async_trait]
pub trait ThrottleStore: Send + Sync {
    async fn get(&self, client_key: &str) -> Result<Option<ThrottleRecord>, StoreError>;

    /// Increments the counter and returns the updated record when the current
    /// count is below `limit`; otherwise leaves it untouched and returns
    /// `None`. The check and the increment must be one atomic step per key.
    async fn increment_below(
        &self,
        client_key: &str,
        limit: u32,
    ) -> Result<Option<ThrottleRecord>, StoreError>;

    async fn delete(&self, client_key: &str) -> Result<(), StoreError>;
}
