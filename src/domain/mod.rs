/// Domain models for the application
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One aircraft's last-known state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub callsign: String,
    pub origin_country: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    /// Meters
    pub altitude: f64,
    /// Meters per second
    pub velocity: f64,
    /// Degrees clockwise from north
    pub heading: f64,
}

/// Concurrent viewers (or players) for one title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewerStat {
    pub name: String,
    pub viewers: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Twitch,
    Steam,
    YouTube,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitch => "twitch",
            Platform::Steam => "steam",
            Platform::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twitch" => Ok(Platform::Twitch),
            "steam" => Ok(Platform::Steam),
            "youtube" => Ok(Platform::YouTube),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// Top-5 lists for every platform, fetched in one cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerDashboard {
    pub twitch: Vec<ViewerStat>,
    pub steam: Vec<ViewerStat>,
    pub youtube: Vec<ViewerStat>,
}

/// Chart point: label plus count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: u64,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextLaunch {
    pub mission: String,
    pub date: DateTime<Utc>,
    pub webcast: Option<String>,
    pub rocket: Option<String>,
    pub rocket_description: Option<String>,
}

/// Launch-history view built from launches, rockets and upcoming launches
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSummary {
    pub line_data: Vec<NamedValue>,
    pub bar_data: Vec<NamedValue>,
    pub pie_data: Vec<NamedValue>,
    pub total_launches: u64,
    /// Percentage with one decimal; 0.0 when there are no launches
    pub success_rate: f64,
    pub next_launch: Option<NextLaunch>,
}

/// Result slot content: a value and when it was fetched
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<T> {
    pub fetched_at: DateTime<Utc>,
    pub data: T,
}

/// Health check response
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub now: DateTime<Utc>,
}

// Upstream payloads

#[derive(Debug, Clone, Deserialize)]
pub struct TwitchStreams {
    #[serde(default)]
    pub data: Vec<TwitchStream>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitchStream {
    pub game_name: Option<String>,
    pub viewer_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamPlayers {
    pub response: Option<SteamPlayersBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamPlayersBody {
    pub player_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeSearch {
    #[serde(default)]
    pub items: Vec<YouTubeSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeSearchItem {
    pub id: YouTubeSearchId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSearchId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeVideos {
    #[serde(default)]
    pub items: Vec<YouTubeVideo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeVideo {
    pub snippet: Option<YouTubeSnippet>,
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeSnippet {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamingDetails {
    /// Decimal string in the API
    pub concurrent_viewers: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLaunch {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date_utc: String,
    pub rocket: Option<String>,
    pub success: Option<bool>,
    #[serde(default)]
    pub upcoming: bool,
    pub links: Option<LaunchLinks>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchLinks {
    pub webcast: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRocket {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip_names() {
        for platform in [Platform::Twitch, Platform::Steam, Platform::YouTube] {
            assert_eq!(platform.as_str().parse::<Platform>(), Ok(platform));
        }
        assert_eq!("YouTube".parse::<Platform>(), Ok(Platform::YouTube));
        assert!("mixer".parse::<Platform>().is_err());
    }

    #[test]
    fn test_flight_record_serializes_camel_case() {
        let record = FlightRecord {
            callsign: "UAL123".into(),
            origin_country: Some("United States".into()),
            longitude: -80.1,
            latitude: 25.7,
            altitude: 1000.0,
            velocity: 230.0,
            heading: 90.0,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["originCountry"], "United States");
        assert_eq!(json["heading"], 90.0);
    }

    #[test]
    fn test_raw_launch_tolerates_missing_fields() {
        let launch: RawLaunch = serde_json::from_value(serde_json::json!({
            "name": "Crew-9",
            "date_utc": "2024-09-28T17:17:00.000Z",
            "success": null
        }))
        .unwrap();
        assert_eq!(launch.success, None);
        assert!(!launch.upcoming);
        assert!(launch.links.is_none());
    }
}
