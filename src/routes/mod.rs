/// Application routes configuration
use crate::handlers::{
    get_latest_flights, get_latest_launches, get_latest_viewers, get_platform_viewers, health,
    refresh_flights, refresh_launches, refresh_viewers, AppState,
};
use axum::{routing::get, Router};

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Flight map
        .route("/flights", get(refresh_flights))
        .route("/flights/latest", get(get_latest_flights))
        // Viewer dashboard
        .route("/viewers", get(refresh_viewers))
        .route("/viewers/latest", get(get_latest_viewers))
        .route("/viewers/:platform", get(get_platform_viewers))
        // Launch dashboard
        .route("/launches", get(refresh_launches))
        .route("/launches/latest", get(get_latest_launches))
        .with_state(state)
}
