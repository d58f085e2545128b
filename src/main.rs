/// Data feeds behind the portfolio dashboards
mod clients;
mod config;
mod domain;
mod errors;
mod handlers;
mod repo;
mod routes;
mod services;
mod utils;

use crate::clients::{HttpClient, OpenSkyClient, SpaceXClient, SteamClient, TwitchClient, YouTubeClient};
use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::repo::{init_db, FlightStore, PgFlightStore};
use crate::routes::build_router;
use crate::services::{FlightService, LaunchService, ViewerService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!("Configuration loaded successfully");

    // Optional flight write-through
    let flight_store = connect_flight_store(&config).await?;

    // Initialize clients; every upstream call shares the configured timeout
    let http = HttpClient::new(config.request_timeout)?;
    let opensky = Arc::new(OpenSkyClient::new(http.clone(), config.flights.clone()));
    let twitch = Arc::new(TwitchClient::new(http.clone(), config.twitch.clone()));
    let steam = Arc::new(SteamClient::new(http.clone(), config.steam.clone()));
    let youtube = Arc::new(YouTubeClient::new(http.clone(), config.youtube.clone()));
    let spacex = Arc::new(SpaceXClient::new(http, config.spacex_api_url.clone()));

    // Initialize services
    let flight_service = Arc::new(FlightService::new(
        opensky,
        flight_store,
        config.flights.limit,
    ));
    let viewer_service = Arc::new(ViewerService::new(
        twitch,
        steam,
        youtube,
        config.steam.titles.clone(),
    ));
    let launch_service = Arc::new(LaunchService::new(spacex));

    let state = AppState {
        flight_service,
        viewer_service,
        launch_service,
    };

    // Initial load, repeated when AUTO_REFRESH_SECONDS is set
    start_background_tasks(config.auto_refresh_seconds, state.clone());

    // Build router
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("portfolio_feeds listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn connect_flight_store(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn FlightStore>>> {
    if !config.flights.persist {
        return Ok(None);
    }

    let Some(database_url) = &config.database_url else {
        warn!("FLIGHT_PERSIST is set but DATABASE_URL is missing; write-through disabled");
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    info!("Database connection pool established");

    init_db(&pool).await?;
    info!("Database schema initialized");

    let store: Arc<dyn FlightStore> = Arc::new(PgFlightStore::new(pool));
    Ok(Some(store))
}

/// Run one refresh cycle per dashboard, then repeat every `interval` seconds if non-zero
fn start_background_tasks(interval: u64, state: AppState) {
    {
        let service = state.flight_service.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = service.refresh().await {
                    error!("Flight refresh error: {}", e);
                }
                if interval == 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
        });
    }

    {
        let service = state.viewer_service.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = service.refresh().await {
                    error!("Viewer refresh error: {}", e);
                }
                if interval == 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
        });
    }

    {
        let service = state.launch_service.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = service.refresh().await {
                    error!("Launch refresh error: {}", e);
                }
                if interval == 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
        });
    }

    if interval == 0 {
        info!("Initial load started");
    } else {
        info!("Background refresh started (interval: {}s)", interval);
    }
}
