pub mod config;
pub mod credential;
pub mod outcome;
pub mod provider;
pub mod request;
pub mod resolve;

pub use config::{ConfigSource, EnvSource, keys};
pub use credential::{Credential, CredentialPool};
pub use outcome::{ErrorKind, Generation, ProviderFailure, ProviderSource};
pub use provider::{ChallengeVerifier, FallbackClient, PrimaryClient};
pub use request::{GenerationRequest, ModelTier};
pub use resolve::{KeyOrder, ResolveError, Resolver};
