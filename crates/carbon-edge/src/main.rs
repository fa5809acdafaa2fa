// SPDX-License-Identifier: Apache-2.0
//! CarbonTrace edge API server.
//!
//! Stateless HTTP service converting user-reported activity quantities into
//! kg-CO2e estimates from the fixed `carbon-core` catalog, serving the
//! catalog and a tip sample through a two-key read-through cache, and
//! producing reduction advice with graceful degradation when the optional AI
//! backend is absent or failing. Every response carries a permissive CORS
//! envelope; the browser shell is just another caller.

mod advice;
mod cache;
mod router;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use advice::AdviceResolver;
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use cache::EdgeCache;
use carbon_core::FactorCatalog;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "CarbonTrace edge API server")]
struct Args {
    /// TCP listener for API clients (e.g. 0.0.0.0:8788)
    #[arg(long, default_value = "0.0.0.0:8788")]
    listen: SocketAddr,
    /// Chat-completions endpoint used for personalized advice
    #[arg(long, default_value = advice::DEFAULT_ENDPOINT)]
    ai_endpoint: String,
    /// Model requested from the advice backend
    #[arg(long, default_value = advice::DEFAULT_MODEL)]
    ai_model: String,
    /// Freshness lifetime of the cached factor catalog, in seconds
    #[arg(long, default_value_t = 3600)]
    factors_ttl_secs: u64,
    /// Freshness lifetime of the cached tip sample, in seconds
    #[arg(long, default_value_t = 300)]
    tips_ttl_secs: u64,
}

/// Shared, immutable per-process state: catalog, cache, advice resolver.
pub(crate) struct AppState {
    pub(crate) catalog: FactorCatalog,
    pub(crate) cache: EdgeCache,
    pub(crate) advice: AdviceResolver,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Process-wide credential; a per-request key in the body takes precedence.
    let default_key = std::env::var("QIWEN_API_KEY")
        .ok()
        .filter(|key| !key.is_empty());
    info!(
        keyed = default_key.is_some(),
        "advice backend: {}", args.ai_endpoint
    );

    let state = Arc::new(AppState {
        catalog: FactorCatalog::builtin(),
        cache: EdgeCache::new(
            Duration::from_secs(args.factors_ttl_secs),
            Duration::from_secs(args.tips_ttl_secs),
        ),
        advice: AdviceResolver::new(args.ai_endpoint, args.ai_model, default_key)?,
    });

    // Single fallback handler: arbitrary methods and paths all flow through
    // the dispatch in `router`, so OPTIONS-anywhere and 404s stay uniform.
    let app = Router::new().fallback(serve_request).with_state(state);

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("bind {}", args.listen))?;
    info!("carbon edge listening on {}", args.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn serve_request(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    router::route(&state, &method, uri.path(), &body)
        .await
        .into_response()
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(?err, "failed to install ctrl-c handler");
    }
}
