use std::collections::HashMap;

/// Names of the configuration values read at request time.
pub mod keys {
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const GEMINI_API_KEYS: &str = "GEMINI_API_KEYS";
    pub const GEMINI_NUMBERED_SLOTS: usize = 10;
    pub const SILICONFLOW_API_KEY: &str = "SILICONFLOW_API_KEY";
    pub const TURNSTILE_SECRET_KEY: &str = "TURNSTILE_SECRET_KEY";

    pub const API_KEY_PLACEHOLDER: &str = "your_api_key_here";
    pub const TURNSTILE_SECRET_PLACEHOLDER: &str = "your_turnstile_secret_key_here";

    pub fn gemini_numbered(slot: usize) -> String {
        format!("{GEMINI_API_KEY}_{slot}")
    }
}

pub trait ConfigSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    fn get_non_empty(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Reads the process environment on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}
