use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ConfigSource, keys};

/// Secret identifying one upstream account. Never printed in full.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(Arc<str>);

impl Credential {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("{prefix}...")
    }

    pub fn fallback_from_source(source: &dyn ConfigSource) -> Option<Self> {
        source
            .get_non_empty(keys::SILICONFLOW_API_KEY)
            .filter(|value| value != keys::API_KEY_PLACEHOLDER)
            .map(Self::new)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

/// Ordered, duplicate-free set of primary provider keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
}

impl CredentialPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects keys from the single legacy slot, the numbered slots and the
    /// JSON array slot, in that order.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let mut pool = Self::new();

        if let Some(value) = source.get(keys::GEMINI_API_KEY) {
            pool.push(&value);
        }

        for slot in 1..=keys::GEMINI_NUMBERED_SLOTS {
            if let Some(value) = source.get(&keys::gemini_numbered(slot)) {
                pool.push(&value);
            }
        }

        if let Some(raw) = source.get_non_empty(keys::GEMINI_API_KEYS) {
            match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(serde_json::Value::Array(items)) => {
                    for item in items {
                        if let serde_json::Value::String(value) = item {
                            pool.push(&value);
                        }
                    }
                }
                Ok(_) => warn!(
                    event = "credential_list_ignored",
                    slot = keys::GEMINI_API_KEYS,
                    "value is not a JSON array"
                ),
                Err(err) => warn!(
                    event = "credential_list_ignored",
                    slot = keys::GEMINI_API_KEYS,
                    error = %err,
                    "failed to parse credential list"
                ),
            }
        }

        debug!(event = "credential_pool_built", credentials = pool.len());
        pool
    }

    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pool = Self::new();
        for value in values {
            pool.push(value.as_ref());
        }
        pool
    }

    pub fn push(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || value == keys::API_KEY_PLACEHOLDER {
            return false;
        }
        if self.credentials.iter().any(|cred| cred.expose() == value) {
            return false;
        }
        self.credentials.push(Credential::new(value));
        true
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter()
    }

    pub fn as_slice(&self) -> &[Credential] {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn secrets(pool: &CredentialPool) -> Vec<&str> {
        pool.iter().map(Credential::expose).collect()
    }

    #[test]
    fn collects_all_slots_in_discovery_order() {
        let env = source(&[
            ("GEMINI_API_KEY", "legacy"),
            ("GEMINI_API_KEY_2", "two"),
            ("GEMINI_API_KEY_1", "one"),
            ("GEMINI_API_KEY_10", "ten"),
            ("GEMINI_API_KEYS", r#"["list-a", "list-b"]"#),
        ]);
        let pool = CredentialPool::from_source(&env);
        assert_eq!(
            secrets(&pool),
            vec!["legacy", "one", "two", "ten", "list-a", "list-b"]
        );
    }

    #[test]
    fn drops_duplicates_and_placeholders() {
        let env = source(&[
            ("GEMINI_API_KEY", "same"),
            ("GEMINI_API_KEY_1", "same"),
            ("GEMINI_API_KEY_2", "your_api_key_here"),
            ("GEMINI_API_KEY_3", "  "),
            ("GEMINI_API_KEYS", r#"["same", "your_api_key_here", "", "other", 7]"#),
        ]);
        let pool = CredentialPool::from_source(&env);
        assert_eq!(secrets(&pool), vec!["same", "other"]);
    }

    #[test]
    fn malformed_list_is_ignored() {
        let env = source(&[
            ("GEMINI_API_KEY_4", "four"),
            ("GEMINI_API_KEYS", "[not json"),
        ]);
        let pool = CredentialPool::from_source(&env);
        assert_eq!(secrets(&pool), vec!["four"]);

        let env = source(&[("GEMINI_API_KEYS", r#"{"key": "value"}"#)]);
        assert!(CredentialPool::from_source(&env).is_empty());
    }

    #[test]
    fn empty_source_builds_empty_pool() {
        let pool = CredentialPool::from_source(&HashMap::new());
        assert!(pool.is_empty());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn debug_output_is_masked() {
        let cred = Credential::new("AIzaSyExampleSecretValue");
        let printed = format!("{cred:?}");
        assert!(printed.contains("AIzaSyEx..."));
        assert!(!printed.contains("SecretValue"));
    }

    #[test]
    fn fallback_credential_requires_value() {
        assert!(Credential::fallback_from_source(&HashMap::new()).is_none());
        let env = source(&[("SILICONFLOW_API_KEY", "sk-backup")]);
        let cred = Credential::fallback_from_source(&env).unwrap();
        assert_eq!(cred.expose(), "sk-backup");
    }
}
