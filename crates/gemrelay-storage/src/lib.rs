#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod throttle;

#[cfg(feature = "storage-memory")]
pub use memory::{Clock, MemoryThrottleStore};
pub use throttle::{StoreError, THROTTLE_WINDOW, ThrottleRecord, ThrottleStore};
