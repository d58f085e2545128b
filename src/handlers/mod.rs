/// HTTP request handlers
use crate::domain::{Health, LaunchSummary, Platform, Snapshot};
use crate::errors::ApiError;
use crate::services::{FlightService, LaunchService, ViewerService};
use crate::utils::format_countdown;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub flight_service: Arc<FlightService>,
    pub viewer_service: Arc<ViewerService>,
    pub launch_service: Arc<LaunchService>,
}

/// Successful response wrapper
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

/// Launch summary plus a countdown computed at response time
#[derive(Serialize)]
pub struct LaunchView {
    #[serde(flatten)]
    pub summary: LaunchSummary,
    pub countdown: Option<String>,
}

impl LaunchView {
    fn new(summary: LaunchSummary) -> Self {
        let countdown = summary
            .next_launch
            .as_ref()
            .map(|next| format_countdown(next.date, Utc::now()));
        Self { summary, countdown }
    }
}

fn no_data() -> Json<Value> {
    Json(serde_json::json!(SuccessResponse::new(serde_json::json!({
        "message": "no data"
    }))))
}

/// Health check handler
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        now: Utc::now(),
    })
}

/// Refresh flights
pub async fn refresh_flights(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let flights = state.flight_service.refresh().await?;
    Ok(Json(serde_json::json!(SuccessResponse::new(
        serde_json::json!({
            "flights": flights
        })
    ))))
}

/// Last published flights
pub async fn get_latest_flights(State(state): State<AppState>) -> Json<Value> {
    match state.flight_service.latest().await {
        Some(snapshot) => Json(serde_json::json!(SuccessResponse::new(snapshot))),
        None => no_data(),
    }
}

/// Refresh all viewer platforms
pub async fn refresh_viewers(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let dashboard = state.viewer_service.refresh().await?;
    Ok(Json(serde_json::json!(SuccessResponse::new(dashboard))))
}

/// Last published viewer dashboard
pub async fn get_latest_viewers(State(state): State<AppState>) -> Json<Value> {
    match state.viewer_service.latest().await {
        Some(snapshot) => Json(serde_json::json!(SuccessResponse::new(snapshot))),
        None => no_data(),
    }
}

/// Top titles for a single platform
pub async fn get_platform_viewers(
    Path(platform): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let platform: Platform = platform.parse().map_err(ApiError::NotFound)?;
    let stats = state.viewer_service.fetch_viewer_stats(platform).await?;

    Ok(Json(serde_json::json!(SuccessResponse::new(
        serde_json::json!({
            "platform": platform.as_str(),
            "stats": stats
        })
    ))))
}

/// Refresh launch summary
pub async fn refresh_launches(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<LaunchView>>, ApiError> {
    let summary = state.launch_service.refresh().await?;
    Ok(Json(SuccessResponse::new(LaunchView::new(summary))))
}

/// Last published launch summary with a fresh countdown
pub async fn get_latest_launches(State(state): State<AppState>) -> Json<Value> {
    match state.launch_service.latest().await {
        Some(snapshot) => Json(serde_json::json!(SuccessResponse::new(Snapshot {
            fetched_at: snapshot.fetched_at,
            data: LaunchView::new(snapshot.data),
        }))),
        None => no_data(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{FlightSource, LaunchSource, SteamSource, TwitchSource, YouTubeSource};
    use crate::domain::{RawLaunch, RawRocket, TwitchStream, YouTubeVideo};
    use crate::errors::ApiResult;
    use async_trait::async_trait;

    struct Empty;

    #[async_trait]
    impl FlightSource for Empty {
        async fn state_vectors(&self) -> ApiResult<Vec<Vec<Value>>> {
            Ok(vec![vec![
                Value::from("abc123"),
                Value::from("UAL1  "),
                Value::from("United States"),
                Value::Null,
                Value::Null,
                Value::from(-87.9),
                Value::from(41.9),
                Value::from(3000.0),
                Value::Null,
                Value::from(200.0),
                Value::from(90.0),
            ]])
        }
    }

    #[async_trait]
    impl TwitchSource for Empty {
        async fn live_streams(&self, _first: u32) -> ApiResult<Vec<TwitchStream>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl SteamSource for Empty {
        async fn current_players(&self, _app_id: &str) -> ApiResult<Option<u64>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl YouTubeSource for Empty {
        async fn live_videos(&self) -> ApiResult<Vec<YouTubeVideo>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl LaunchSource for Empty {
        async fn launches(&self) -> ApiResult<Vec<RawLaunch>> {
            Ok(Vec::new())
        }
        async fn rockets(&self) -> ApiResult<Vec<RawRocket>> {
            Ok(Vec::new())
        }
        async fn upcoming(&self) -> ApiResult<Vec<RawLaunch>> {
            Ok(Vec::new())
        }
    }

    fn state() -> AppState {
        let empty = Arc::new(Empty);
        AppState {
            flight_service: Arc::new(FlightService::new(empty.clone(), None, 50)),
            viewer_service: Arc::new(ViewerService::new(
                empty.clone(),
                empty.clone(),
                empty.clone(),
                Vec::new(),
            )),
            launch_service: Arc::new(LaunchService::new(empty)),
        }
    }

    #[tokio::test]
    async fn test_latest_before_refresh_is_no_data() {
        let Json(body) = get_latest_launches(State(state())).await;
        assert_eq!(body, serde_json::json!({"ok": true, "message": "no data"}));
    }

    #[tokio::test]
    async fn test_latest_launches_matches_other_latest_routes() {
        let state = state();
        state.flight_service.refresh().await.unwrap();
        state.launch_service.refresh().await.unwrap();

        let Json(flights) = get_latest_flights(State(state.clone())).await;
        let Json(launches) = get_latest_launches(State(state)).await;

        for body in [&flights, &launches] {
            assert_eq!(body["ok"], true);
            assert!(body["fetched_at"].is_string());
            assert!(!body["data"].is_null());
        }
        assert!(launches.get("summary").is_none());
        assert_eq!(launches["data"]["totalLaunches"], 0);
        assert_eq!(launches["data"]["successRate"], 0.0);
        assert!(launches["data"]["countdown"].is_null());
        assert_eq!(flights["data"][0]["callsign"], "UAL1");
    }
}
