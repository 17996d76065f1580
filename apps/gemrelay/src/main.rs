use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use gemrelay_core::{Core, CoreState, Denylist, ThrottleGate};
use gemrelay_provider_core::{ConfigSource, CredentialPool, EnvSource, Resolver, keys};
use gemrelay_provider_impl::{
    AistudioClient, HttpClientConfig, SiliconFlowClient, TurnstileVerifier, build_client,
};
use gemrelay_storage::MemoryThrottleStore;

mod assets;
mod cli;

use crate::assets::EmbeddedAssets;
use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    if let Err(err) = run(cli).await {
        eprintln!("gemrelay failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = build_client(&HttpClientConfig {
        timeout: Duration::from_secs(cli.request_timeout_secs),
        proxy: cli.proxy.clone(),
    })
    .context("build upstream http client")?;

    let mut primary = AistudioClient::new(client.clone());
    if let Some(base_url) = cli.gemini_base_url.as_deref() {
        primary = primary.with_base_url(base_url);
    }
    let mut fallback = SiliconFlowClient::new(client.clone());
    if let Some(base_url) = cli.siliconflow_base_url.as_deref() {
        fallback = fallback.with_base_url(base_url);
    }
    let mut verifier = TurnstileVerifier::new(client);
    if let Some(verify_url) = cli.turnstile_verify_url.as_deref() {
        verifier = verifier.with_verify_url(verify_url);
    }

    let resolver = Resolver::new(Arc::new(primary), Arc::new(fallback))
        .with_order(cli.key_order())
        .with_deadline(Duration::from_secs(cli.resolve_deadline_secs));
    let gate = ThrottleGate::new(Arc::new(MemoryThrottleStore::new()), Arc::new(verifier));

    let config = EnvSource;
    info!(
        primary_credentials = CredentialPool::from_source(&config).len(),
        fallback_configured = config.get_non_empty(keys::SILICONFLOW_API_KEY).is_some(),
        challenge_configured = config.get_non_empty(keys::TURNSTILE_SECRET_KEY).is_some(),
        request_timeout_secs = cli.request_timeout_secs,
        resolve_deadline_secs = cli.resolve_deadline_secs,
        key_order = ?cli.key_order(),
        "config loaded"
    );

    let core = Core::new(CoreState {
        config: Arc::new(config),
        resolver: Arc::new(resolver),
        gate,
        denylist: Denylist::default(),
        assets: Some(Arc::new(EmbeddedAssets)),
    });
    let app = core.router();

    let bind = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!(addr = %bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    info!("shutdown complete");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gemrelay=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
