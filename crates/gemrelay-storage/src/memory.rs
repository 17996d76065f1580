use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::throttle::{StoreError, THROTTLE_WINDOW, ThrottleRecord, ThrottleStore};

pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Process-local store. Counters are lost on restart and not shared between
/// instances.
pub struct MemoryThrottleStore {
    records: DashMap<String, ThrottleRecord>,
    window: Duration,
    clock: Clock,
}

impl std::fmt::Debug for MemoryThrottleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryThrottleStore")
            .field("records", &self.records.len())
            .field("window", &self.window)
            .finish()
    }
}

impl Default for MemoryThrottleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryThrottleStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(OffsetDateTime::now_utc))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            records: DashMap::new(),
            window: THROTTLE_WINDOW,
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn purge_expired(&self, client_key: &str, now: OffsetDateTime) {
        if self
            .records
            .remove_if(client_key, |_, record| record.is_expired(now, self.window))
            .is_some()
        {
            debug!(event = "throttle_record_expired", client = %client_key);
        }
    }
}

#[async_trait]
impl ThrottleStore for MemoryThrottleStore {
    async fn get(&self, client_key: &str) -> Result<Option<ThrottleRecord>, StoreError> {
        let now = (self.clock)();
        self.purge_expired(client_key, now);
        Ok(self.records.get(client_key).map(|record| record.clone()))
    }

    async fn increment_below(
        &self,
        client_key: &str,
        limit: u32,
    ) -> Result<Option<ThrottleRecord>, StoreError> {
        let now = (self.clock)();
        let mut entry = self
            .records
            .entry(client_key.to_string())
            .or_insert_with(|| ThrottleRecord::new(client_key, now));
        if entry.is_expired(now, self.window) {
            *entry = ThrottleRecord::new(client_key, now);
        }
        if entry.count >= limit {
            return Ok(None);
        }
        entry.count += 1;
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, client_key: &str) -> Result<(), StoreError> {
        self.records.remove(client_key);
        Ok(())
    }
}
