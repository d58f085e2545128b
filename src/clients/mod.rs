/// External API clients module
use crate::config::{FlightConfig, SteamConfig, TwitchConfig, YouTubeConfig};
use crate::domain::{
    RawLaunch, RawRocket, SteamPlayers, TwitchStream, TwitchStreams, YouTubeSearch, YouTubeVideo,
    YouTubeVideos,
};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Aircraft state-vector feed
#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn state_vectors(&self) -> ApiResult<Vec<Vec<Value>>>;
}

/// Stream platform listing live streams with their category
#[async_trait]
pub trait TwitchSource: Send + Sync {
    async fn live_streams(&self, first: u32) -> ApiResult<Vec<TwitchStream>>;
}

/// Game platform reporting current players per title
#[async_trait]
pub trait SteamSource: Send + Sync {
    async fn current_players(&self, app_id: &str) -> ApiResult<Option<u64>>;
}

/// Video platform listing live broadcasts
#[async_trait]
pub trait YouTubeSource: Send + Sync {
    async fn live_videos(&self) -> ApiResult<Vec<YouTubeVideo>>;
}

/// Launch history, rocket catalog and upcoming launches
#[async_trait]
pub trait LaunchSource: Send + Sync {
    async fn launches(&self) -> ApiResult<Vec<RawLaunch>>;
    async fn rockets(&self) -> ApiResult<Vec<RawRocket>>;
    async fn upcoming(&self) -> ApiResult<Vec<RawLaunch>>;
}

/// HTTP client wrapper with common configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("portfolio-feeds/0.1")
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }

    /// Send a request and read the body as JSON, mapping status and decode failures
    pub async fn get_json(&self, source_name: &'static str, req: RequestBuilder) -> ApiResult<Value> {
        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::upstream_http(source_name, status.as_u16(), &body));
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::shape(source_name, e.to_string()))
    }
}

fn decode<T: DeserializeOwned>(source_name: &'static str, value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::shape(source_name, e.to_string()))
}

fn decode_array<T: DeserializeOwned>(source_name: &'static str, value: Value) -> ApiResult<Vec<T>> {
    if !value.is_array() {
        return Err(ApiError::shape(source_name, "expected a JSON array"));
    }
    decode(source_name, value)
}

/// Pull `states` out of a state-vector payload. Null or absent means no aircraft.
pub fn states_from_payload(payload: Value) -> ApiResult<Vec<Vec<Value>>> {
    let Value::Object(mut obj) = payload else {
        return Err(ApiError::shape("opensky", "expected a JSON object"));
    };

    match obj.remove("states") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(states)) => states
            .into_iter()
            .map(|s| match s {
                Value::Array(fields) => Ok(fields),
                _ => Err(ApiError::shape("opensky", "state vector is not an array")),
            })
            .collect(),
        Some(_) => Err(ApiError::shape("opensky", "states is not an array")),
    }
}

/// OpenSky state-vector client
pub struct OpenSkyClient {
    http_client: HttpClient,
    config: FlightConfig,
}

impl OpenSkyClient {
    pub fn new(http_client: HttpClient, config: FlightConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl FlightSource for OpenSkyClient {
    async fn state_vectors(&self) -> ApiResult<Vec<Vec<Value>>> {
        let mut req = self.http_client.get_client().get(&self.config.opensky_url);

        if let Some(bbox) = &self.config.bbox {
            req = req.query(&[
                ("lamin", bbox.lamin),
                ("lamax", bbox.lamax),
                ("lomin", bbox.lomin),
                ("lomax", bbox.lomax),
            ]);
        }

        if let Some(user) = &self.config.username {
            req = req.basic_auth(user, self.config.password.as_ref());
        }

        let payload = self.http_client.get_json("opensky", req).await?;
        states_from_payload(payload)
    }
}

/// Twitch Helix streams client
pub struct TwitchClient {
    http_client: HttpClient,
    config: TwitchConfig,
}

impl TwitchClient {
    pub fn new(http_client: HttpClient, config: TwitchConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl TwitchSource for TwitchClient {
    async fn live_streams(&self, first: u32) -> ApiResult<Vec<TwitchStream>> {
        let client_id = self
            .config
            .client_id
            .as_ref()
            .ok_or(ApiError::MissingCredential("TWITCH_CLIENT_ID"))?;
        let token = self
            .config
            .access_token
            .as_ref()
            .ok_or(ApiError::MissingCredential("TWITCH_ACCESS_TOKEN"))?;

        let req = self
            .http_client
            .get_client()
            .get(&self.config.streams_url)
            .query(&[("first", first)])
            .header("Client-ID", client_id)
            .bearer_auth(token);

        let json = self.http_client.get_json("twitch", req).await?;
        let streams: TwitchStreams = decode("twitch", json)?;
        Ok(streams.data)
    }
}

/// Steam current-players client
pub struct SteamClient {
    http_client: HttpClient,
    config: SteamConfig,
}

impl SteamClient {
    pub fn new(http_client: HttpClient, config: SteamConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl SteamSource for SteamClient {
    async fn current_players(&self, app_id: &str) -> ApiResult<Option<u64>> {
        let key = self
            .config
            .api_key
            .as_ref()
            .ok_or(ApiError::MissingCredential("STEAM_API_KEY"))?;

        let req = self
            .http_client
            .get_client()
            .get(&self.config.players_url)
            .query(&[("key", key.as_str()), ("appid", app_id)]);

        let json = self.http_client.get_json("steam", req).await?;
        let players: SteamPlayers = decode("steam", json)?;
        Ok(players.response.and_then(|r| r.player_count))
    }
}

/// YouTube Data API client for live gaming broadcasts
pub struct YouTubeClient {
    http_client: HttpClient,
    config: YouTubeConfig,
}

impl YouTubeClient {
    pub fn new(http_client: HttpClient, config: YouTubeConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl YouTubeSource for YouTubeClient {
    async fn live_videos(&self) -> ApiResult<Vec<YouTubeVideo>> {
        let key = self
            .config
            .api_key
            .as_ref()
            .ok_or(ApiError::MissingCredential("YOUTUBE_API_KEY"))?;

        // Gaming category, US region
        let search_req = self
            .http_client
            .get_client()
            .get(&self.config.search_url)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("eventType", "live"),
                ("videoCategoryId", "20"),
                ("maxResults", "10"),
                ("regionCode", "US"),
                ("key", key.as_str()),
            ]);

        let json = self.http_client.get_json("youtube", search_req).await?;
        let search: YouTubeSearch = decode("youtube", json)?;

        let ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let details_req = self
            .http_client
            .get_client()
            .get(&self.config.videos_url)
            .query(&[
                ("part", "snippet,liveStreamingDetails"),
                ("id", ids.join(",").as_str()),
                ("key", key.as_str()),
            ]);

        let json = self.http_client.get_json("youtube", details_req).await?;
        let videos: YouTubeVideos = decode("youtube", json)?;
        Ok(videos.items)
    }
}

/// SpaceX API client
pub struct SpaceXClient {
    http_client: HttpClient,
    base_url: String,
}

impl SpaceXClient {
    pub fn new(http_client: HttpClient, base_url: String) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_array<T: DeserializeOwned>(
        &self,
        source_name: &'static str,
        path: &str,
    ) -> ApiResult<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        let req = self.http_client.get_client().get(url);
        let json = self.http_client.get_json(source_name, req).await?;
        decode_array(source_name, json)
    }
}

#[async_trait]
impl LaunchSource for SpaceXClient {
    async fn launches(&self) -> ApiResult<Vec<RawLaunch>> {
        self.fetch_array("launches", "/v5/launches").await
    }

    async fn rockets(&self) -> ApiResult<Vec<RawRocket>> {
        self.fetch_array("rockets", "/v4/rockets").await
    }

    async fn upcoming(&self) -> ApiResult<Vec<RawLaunch>> {
        self.fetch_array("upcoming launches", "/v5/launches/upcoming")
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::stub_server::{serve, Reply};
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_states_from_payload_null_is_empty() {
        let states = states_from_payload(json!({"time": 1, "states": null})).unwrap();
        assert!(states.is_empty());

        let states = states_from_payload(json!({"time": 1})).unwrap();
        assert!(states.is_empty());
    }

    #[test]
    fn test_states_from_payload_reads_vectors() {
        let states = states_from_payload(json!({
            "states": [["abc123", "UAL123 ", "United States"], ["def456", null]]
        }))
        .unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0][1], json!("UAL123 "));
    }

    #[test]
    fn test_states_from_payload_rejects_wrong_shapes() {
        for payload in [
            json!([]),
            json!({"states": "nope"}),
            json!({"states": [["ok"], {"not": "array"}]}),
        ] {
            match states_from_payload(payload) {
                Err(ApiError::UpstreamShape { source_name, .. }) => {
                    assert_eq!(source_name, "opensky")
                }
                other => panic!("expected shape error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_decode_array_requires_array() {
        let err = decode_array::<RawRocket>("rockets", json!({"docs": []})).unwrap_err();
        assert!(matches!(err, ApiError::UpstreamShape { .. }));

        let rockets: Vec<RawRocket> =
            decode_array("rockets", json!([{"id": "r1", "name": "Falcon 9"}])).unwrap();
        assert_eq!(rockets[0].name, "Falcon 9");
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_request() {
        let http = HttpClient::new(Duration::from_secs(1)).unwrap();

        let twitch = TwitchClient::new(
            http.clone(),
            TwitchConfig {
                streams_url: "http://127.0.0.1:9/streams".into(),
                client_id: None,
                access_token: Some("token".into()),
            },
        );
        assert!(matches!(
            twitch.live_streams(100).await,
            Err(ApiError::MissingCredential("TWITCH_CLIENT_ID"))
        ));

        let steam = SteamClient::new(
            http,
            SteamConfig {
                players_url: "http://127.0.0.1:9/players".into(),
                api_key: None,
                titles: Vec::new(),
            },
        );
        assert!(matches!(
            steam.current_players("570").await,
            Err(ApiError::MissingCredential("STEAM_API_KEY"))
        ));
    }

    #[tokio::test]
    async fn test_error_status_keeps_status_and_body() {
        let base = serve(|_| Reply::Status(503, "down for maintenance")).await;
        let http = HttpClient::new(Duration::from_secs(5)).unwrap();

        let err = http
            .get_json("rockets", http.get_client().get(format!("{}/v4/rockets", base)))
            .await
            .unwrap_err();
        match &err {
            ApiError::UpstreamHttp {
                source_name,
                status,
                message,
            } => {
                assert_eq!(*source_name, "rockets");
                assert_eq!(*status, 503);
                assert_eq!(message, "down for maintenance");
            }
            other => panic!("expected upstream http error, got {:?}", other),
        }
        assert_eq!(err.code_and_status(), ("UPSTREAM_5XX", StatusCode::BAD_GATEWAY));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_shape_error() {
        let base = serve(|_| Reply::Status(200, "<html>rate limited</html>")).await;
        let http = HttpClient::new(Duration::from_secs(5)).unwrap();

        let err = http
            .get_json("opensky", http.get_client().get(base))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::UpstreamShape {
                source_name: "opensky",
                ..
            }
        ));
        assert_eq!(err.code_and_status(), ("UPSTREAM_SHAPE", StatusCode::BAD_GATEWAY));
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out() {
        let base = serve(|_| Reply::Hang).await;
        let http = HttpClient::new(Duration::from_secs(1)).unwrap();

        let err = http
            .get_json("twitch", http.get_client().get(base))
            .await
            .unwrap_err();
        match &err {
            ApiError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("expected transport error, got {:?}", other),
        }
        assert_eq!(
            err.code_and_status(),
            ("UPSTREAM_TIMEOUT", StatusCode::GATEWAY_TIMEOUT)
        );
    }

    #[tokio::test]
    async fn test_spacex_client_reads_array_payload() {
        let base = serve(|path| match path {
            "/v4/rockets" => Reply::Status(200, r#"[{"id":"5e9d0d95eda69973a809d1ec","name":"Falcon 9"}]"#),
            _ => Reply::Status(404, "{}"),
        })
        .await;
        let client = SpaceXClient::new(HttpClient::new(Duration::from_secs(5)).unwrap(), base);

        let rockets = client.rockets().await.unwrap();
        assert_eq!(rockets.len(), 1);
        assert_eq!(rockets[0].name, "Falcon 9");
        assert!(matches!(
            client.launches().await,
            Err(ApiError::UpstreamHttp { status: 404, .. })
        ));
    }
}
