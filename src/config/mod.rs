/// Application configuration module
use std::env;
use std::time::Duration;

/// Titles queried on Steam when `STEAM_APP_IDS` is not set
const DEFAULT_STEAM_TITLES: &[(&str, &str)] = &[
    ("570", "Dota 2"),
    ("730", "CS:GO"),
    ("440", "TF2"),
    ("578080", "PUBG"),
    ("1172470", "Apex Legends"),
    ("271590", "GTA V"),
    ("359550", "Rainbow Six"),
    ("252490", "Rust"),
    ("1085660", "Destiny 2"),
    ("1097150", "Sons of the Forest"),
];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub request_timeout: Duration,
    pub auto_refresh_seconds: u64,
    pub database_url: Option<String>,
    pub flights: FlightConfig,
    pub twitch: TwitchConfig,
    pub steam: SteamConfig,
    pub youtube: YouTubeConfig,
    pub spacex_api_url: String,
}

#[derive(Clone, Debug)]
pub struct FlightConfig {
    pub opensky_url: String,
    pub bbox: Option<BoundingBox>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub limit: usize,
    pub persist: bool,
}

/// Geographic filter forwarded to the state-vector feed
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub lamin: f64,
    pub lamax: f64,
    pub lomin: f64,
    pub lomax: f64,
}

#[derive(Clone, Debug)]
pub struct TwitchConfig {
    pub streams_url: String,
    pub client_id: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SteamConfig {
    pub players_url: String,
    pub api_key: Option<String>,
    /// (app id, display name) pairs
    pub titles: Vec<(String, String)>,
}

#[derive(Clone, Debug)]
pub struct YouTubeConfig {
    pub search_url: String,
    pub videos_url: String,
    pub api_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bbox = match env_opt("OPENSKY_BBOX") {
            Some(raw) => Some(
                parse_bbox(&raw)
                    .ok_or_else(|| anyhow::anyhow!("OPENSKY_BBOX must be lamin,lamax,lomin,lomax"))?,
            ),
            None => None,
        };

        let titles = match env_opt("STEAM_APP_IDS") {
            Some(raw) => parse_titles(&raw),
            None => DEFAULT_STEAM_TITLES
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        };

        let flights = FlightConfig {
            opensky_url: env_or(
                "OPENSKY_URL",
                "https://opensky-network.org/api/states/all",
            ),
            bbox,
            username: env_opt("OPENSKY_USERNAME"),
            password: env_opt("OPENSKY_PASSWORD"),
            limit: env_u64("FLIGHT_LIMIT", 50) as usize,
            persist: env_bool("FLIGHT_PERSIST", false),
        };

        let twitch = TwitchConfig {
            streams_url: env_or("TWITCH_STREAMS_URL", "https://api.twitch.tv/helix/streams"),
            client_id: env_opt("TWITCH_CLIENT_ID"),
            access_token: env_opt("TWITCH_ACCESS_TOKEN"),
        };

        let steam = SteamConfig {
            players_url: env_or(
                "STEAM_PLAYERS_URL",
                "https://api.steampowered.com/ISteamUserStats/GetNumberOfCurrentPlayers/v1/",
            ),
            api_key: env_opt("STEAM_API_KEY"),
            titles,
        };

        let youtube = YouTubeConfig {
            search_url: env_or(
                "YOUTUBE_SEARCH_URL",
                "https://www.googleapis.com/youtube/v3/search",
            ),
            videos_url: env_or(
                "YOUTUBE_VIDEOS_URL",
                "https://www.googleapis.com/youtube/v3/videos",
            ),
            api_key: env_opt("YOUTUBE_API_KEY"),
        };

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000"),
            request_timeout: Duration::from_secs(env_u64("REQUEST_TIMEOUT_SECONDS", 10)),
            auto_refresh_seconds: env_u64("AUTO_REFRESH_SECONDS", 0),
            database_url: env_opt("DATABASE_URL"),
            flights,
            twitch,
            steam,
            youtube,
            spacex_api_url: env_or("SPACEX_API_URL", "https://api.spacexdata.com"),
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn parse_bbox(raw: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    match parts.as_slice() {
        [lamin, lamax, lomin, lomax] => Some(BoundingBox {
            lamin: *lamin,
            lamax: *lamax,
            lomin: *lomin,
            lomax: *lomax,
        }),
        _ => None,
    }
}

/// Parse `id:name` pairs; the name may itself contain colons
fn parse_titles(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let mut it = pair.splitn(2, ':');
            let id = it.next()?.trim();
            if id.is_empty() {
                return None;
            }
            let name = it.next().map(str::trim).filter(|n| !n.is_empty()).unwrap_or(id);
            Some((id.to_string(), name.to_string()))
        })
        .collect()
}
