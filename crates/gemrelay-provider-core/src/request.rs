use std::fmt;

use crate::credential::Credential;

/// Model variant of the primary provider. `PrimaryReduced` is the in-provider
/// degradation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    Primary,
    PrimaryReduced,
}

impl ModelTier {
    pub fn model(self) -> &'static str {
        match self {
            ModelTier::Primary => "gemini-2.5-flash-lite",
            ModelTier::PrimaryReduced => "gemini-2.0-flash-lite",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model())
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub tier: ModelTier,
    pub credential: Credential,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, credential: Credential, tier: ModelTier) -> Self {
        Self {
            prompt: prompt.into(),
            tier,
            credential,
        }
    }
}
