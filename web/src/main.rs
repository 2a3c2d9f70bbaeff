//! An HTTP service that stores the company's favorite food spots and serves
//! them to the food map.
use anyhow::Result;
use axum::{Router, http::HeaderName};
use clap::Parser;
use config::EnvConfig;
use libfood::{Database, seed};
use state::{AppState, SharedState};
use std::{path::PathBuf, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

mod api;
mod config;
mod error;
mod state;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,
    #[arg(short, long, default_value = "dev")]
    pub env: String,
}

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn app(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    Router::new()
        .merge(api::router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("FOODWEB_LOG"))
        .init();
    let args = Cli::parse();
    let envcfg = EnvConfig::load(&args.config, &args.env).await?;
    debug!("using database '{}'", envcfg.database);

    let db = Database::open(&envcfg.database).await?;
    if envcfg.seed.enabled {
        let outcome = seed::seed_if_empty(&db, envcfg.seed.fixture.as_deref()).await;
        debug!(?outcome, "seeding finished");
    }

    let shared_state = Arc::new(SharedState::new(db));
    let listener =
        tokio::net::TcpListener::bind((envcfg.listen.host.as_str(), envcfg.listen.port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(shared_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
