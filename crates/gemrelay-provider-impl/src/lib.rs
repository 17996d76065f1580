pub mod client;
pub mod provider;
pub mod turnstile;
pub mod upstream;

pub use client::{DEFAULT_REQUEST_TIMEOUT, HttpClientConfig, build_client};
pub use provider::{AistudioClient, SiliconFlowClient};
pub use turnstile::TurnstileVerifier;
