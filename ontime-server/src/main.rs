use std::process::ExitCode;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use ontime_server::cache::CacheConfig;
use ontime_server::config::AppConfig;
use ontime_server::eta::StaticEtaProvider;
use ontime_server::web::{AppState, create_router};

/// How often to re-read the arrivals file.
const ARRIVALS_RELOAD_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ontime_server=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let route = config.load_route()?;
    match &config.route_file {
        Some(path) => info!(path = %path.display(), segments = route.segments.len(), "loaded route"),
        None => info!(segments = route.segments.len(), "using built-in route"),
    }

    // Without arrivals data every wait is the route's maximum
    let eta = match &config.eta_file {
        Some(path) => {
            let provider = StaticEtaProvider::new(path)?;
            info!(
                path = %path.display(),
                targets = provider.len().await,
                "loaded arrivals"
            );

            // Spawn background task to pick up rewritten arrivals
            let reloading = provider.clone();
            let path = path.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(ARRIVALS_RELOAD_INTERVAL);
                interval.tick().await; // First tick is immediate, skip it
                loop {
                    interval.tick().await;
                    match reloading.reload(&path).await {
                        Ok(count) => debug!(targets = count, "reloaded arrivals"),
                        Err(e) => warn!(error = %e, "failed to reload arrivals; keeping previous data"),
                    }
                }
            });

            Some(provider)
        }
        None => {
            warn!("no arrivals file configured; using max waits only");
            None
        }
    };

    let state = AppState::new(route, config.solver.clone(), eta, &CacheConfig::default());

    let static_dir = config.static_dir.to_string_lossy();
    let app = create_router(state, &static_dir);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Ontime listening on http://{}", config.addr);
    info!("  GET  /health   - Health check");
    info!("  GET  /         - Web interface");
    info!("  POST /compute  - Compute departure time");

    axum::serve(listener, app).await?;
    Ok(())
}
