use clap::Parser;
use gemrelay_provider_core::KeyOrder;

#[derive(Debug, Clone, Parser)]
#[command(name = "gemrelay", version, about = "Name analysis relay over Gemini with a fallback provider")]
pub(crate) struct Cli {
    #[arg(long, env = "GEMRELAY_HOST", default_value = "0.0.0.0")]
    pub(crate) host: String,
    #[arg(long, env = "GEMRELAY_PORT", default_value_t = 8787)]
    pub(crate) port: u16,
    /// Timeout for a single upstream call.
    #[arg(long, env = "GEMRELAY_REQUEST_TIMEOUT_SECS", default_value_t = 12)]
    pub(crate) request_timeout_secs: u64,
    /// Overall time limit for resolving one analysis across all providers.
    #[arg(long, env = "GEMRELAY_RESOLVE_DEADLINE_SECS", default_value_t = 45)]
    pub(crate) resolve_deadline_secs: u64,
    /// Try primary keys in configuration order instead of shuffling them.
    #[arg(long, env = "GEMRELAY_KEYS_IN_ORDER")]
    pub(crate) keys_in_order: bool,
    #[arg(long, env = "GEMRELAY_KEY_SHUFFLE_SEED")]
    pub(crate) key_shuffle_seed: Option<u64>,
    #[arg(long, env = "GEMRELAY_PROXY")]
    pub(crate) proxy: Option<String>,
    #[arg(long, env = "GEMINI_BASE_URL")]
    pub(crate) gemini_base_url: Option<String>,
    #[arg(long, env = "SILICONFLOW_BASE_URL")]
    pub(crate) siliconflow_base_url: Option<String>,
    #[arg(long, env = "TURNSTILE_VERIFY_URL")]
    pub(crate) turnstile_verify_url: Option<String>,
    #[arg(long, env = "GEMRELAY_LOG_JSON")]
    pub(crate) log_json: bool,
}

impl Cli {
    pub(crate) fn key_order(&self) -> KeyOrder {
        match (self.keys_in_order, self.key_shuffle_seed) {
            (true, _) => KeyOrder::AsConfigured,
            (false, Some(seed)) => KeyOrder::Seeded(seed),
            (false, None) => KeyOrder::Shuffled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["gemrelay"]).unwrap();
        assert_eq!(cli.port, 8787);
        assert_eq!(cli.request_timeout_secs, 12);
        assert_eq!(cli.resolve_deadline_secs, 45);
        assert!(!cli.log_json);
        assert_eq!(cli.key_order(), KeyOrder::Shuffled);
    }

    #[test]
    fn key_order_flags() {
        let cli = Cli::try_parse_from(["gemrelay", "--key-shuffle-seed", "42"]).unwrap();
        assert_eq!(cli.key_order(), KeyOrder::Seeded(42));

        let cli = Cli::try_parse_from(["gemrelay", "--keys-in-order", "--key-shuffle-seed", "42"])
            .unwrap();
        assert_eq!(cli.key_order(), KeyOrder::AsConfigured);
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "gemrelay",
            "--port",
            "9000",
            "--proxy",
            "http://127.0.0.1:7890",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.proxy.as_deref(), Some("http://127.0.0.1:7890"));
        assert!(cli.log_json);
    }
}
