use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use gemrelay_provider_core::{ConfigSource, Resolver};

use crate::assets::AssetSource;
use crate::cors::cors;
use crate::denylist::Denylist;
use crate::gate::ThrottleGate;
use crate::handler::{analyze_handler, asset_handler, favicon_handler, health_handler};

pub const MAX_BODY_BYTES: usize = 16 * 1024;

pub struct CoreState {
    pub config: Arc<dyn ConfigSource>,
    pub resolver: Arc<Resolver>,
    pub gate: ThrottleGate,
    pub denylist: Denylist,
    pub assets: Option<Arc<dyn AssetSource>>,
}

pub struct Core {
    state: Arc<CoreState>,
}

impl Core {
    pub fn new(state: CoreState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(health_handler))
            .route("/api/analyze", post(analyze_handler))
            .route("/analyze", post(analyze_handler))
            .route("/favicon.ico", get(favicon_handler))
            .fallback(asset_handler)
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(cors))
            .with_state(self.state.clone())
    }
}
