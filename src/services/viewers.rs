use super::RefreshSlot;
use crate::clients::{SteamSource, TwitchSource, YouTubeSource};
use crate::domain::{Platform, Snapshot, TwitchStream, ViewerDashboard, ViewerStat, YouTubeVideo};
use crate::errors::{ApiError, ApiResult};
use crate::utils::{top_n, Tally};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

const TOP_N: usize = 5;
const TWITCH_PAGE_SIZE: u32 = 100;

/// Viewer and player counts across the three platforms
pub struct ViewerService {
    twitch: Arc<dyn TwitchSource>,
    steam: Arc<dyn SteamSource>,
    youtube: Arc<dyn YouTubeSource>,
    steam_titles: Vec<(String, String)>,
    slot: RefreshSlot<ViewerDashboard>,
}

impl ViewerService {
    pub fn new(
        twitch: Arc<dyn TwitchSource>,
        steam: Arc<dyn SteamSource>,
        youtube: Arc<dyn YouTubeSource>,
        steam_titles: Vec<(String, String)>,
    ) -> Self {
        Self {
            twitch,
            steam,
            youtube,
            steam_titles,
            slot: RefreshSlot::new("viewers"),
        }
    }

    /// Top titles for one platform
    pub async fn fetch_viewer_stats(&self, platform: Platform) -> ApiResult<Vec<ViewerStat>> {
        let stats = match platform {
            Platform::Twitch => {
                let streams = self.twitch.live_streams(TWITCH_PAGE_SIZE).await?;
                rank_twitch(&streams)
            }
            Platform::Steam => {
                let results = join_all(self.steam_titles.iter().map(|(id, name)| async move {
                    (name.clone(), self.steam.current_players(id).await)
                }))
                .await;
                rank_steam(steam_counts(results)?)
            }
            Platform::YouTube => {
                let videos = self.youtube.live_videos().await?;
                rank_youtube(&videos)
            }
        };

        info!("{}: {} ranked titles", platform, stats.len());
        Ok(stats)
    }

    /// All platforms at once. Any failure fails the whole dashboard, reported in
    /// twitch, steam, youtube order.
    pub async fn fetch_dashboard(&self) -> ApiResult<ViewerDashboard> {
        let (twitch, steam, youtube) = tokio::join!(
            self.fetch_viewer_stats(Platform::Twitch),
            self.fetch_viewer_stats(Platform::Steam),
            self.fetch_viewer_stats(Platform::YouTube),
        );

        Ok(ViewerDashboard {
            twitch: twitch?,
            steam: steam?,
            youtube: youtube?,
        })
    }

    pub async fn refresh(&self) -> ApiResult<ViewerDashboard> {
        let token = self.slot.begin();
        let dashboard = self.fetch_dashboard().await?;
        self.slot.commit(token, dashboard.clone()).await;
        Ok(dashboard)
    }

    pub async fn latest(&self) -> Option<Snapshot<ViewerDashboard>> {
        self.slot.latest().await
    }
}

/// Sum live viewers per game, highest first
pub fn rank_twitch(streams: &[TwitchStream]) -> Vec<ViewerStat> {
    let mut tally = Tally::new();
    for stream in streams {
        let game = stream
            .game_name
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or("Unknown");
        tally.add(game, stream.viewer_count.unwrap_or(0));
    }

    tally
        .into_ranked(TOP_N)
        .into_iter()
        .map(|(name, viewers)| ViewerStat { name, viewers })
        .collect()
}

/// An HTTP error on one title (delisted app, per-app 404) counts as no players.
/// Any other failure, or every title failing, fails the platform.
fn steam_counts(
    results: Vec<(String, ApiResult<Option<u64>>)>,
) -> ApiResult<Vec<(String, Option<u64>)>> {
    let total = results.len();
    let mut counts = Vec::with_capacity(total);
    let mut first_failure = None;
    let mut failures = 0;

    for (name, result) in results {
        match result {
            Ok(players) => counts.push((name, players)),
            Err(err @ ApiError::UpstreamHttp { .. }) => {
                warn!("steam: no player count for {}: {}", name, err);
                failures += 1;
                first_failure.get_or_insert(err);
                counts.push((name, None));
            }
            Err(err) => return Err(err),
        }
    }

    match first_failure {
        Some(err) if failures == total => Err(err),
        _ => Ok(counts),
    }
}

/// Player counts per title; a missing count is 0
pub fn rank_steam(counts: Vec<(String, Option<u64>)>) -> Vec<ViewerStat> {
    let stats = counts
        .into_iter()
        .map(|(name, players)| ViewerStat {
            name,
            viewers: players.unwrap_or(0),
        })
        .collect();
    top_n(stats, TOP_N, |s| s.viewers)
}

/// Only broadcasts that report concurrent viewers are ranked
pub fn rank_youtube(videos: &[YouTubeVideo]) -> Vec<ViewerStat> {
    let stats = videos
        .iter()
        .filter_map(|video| {
            let raw = video
                .live_streaming_details
                .as_ref()?
                .concurrent_viewers
                .as_deref()?;
            let name = video
                .snippet
                .as_ref()
                .map(|s| s.title.clone())
                .unwrap_or_default();
            Some(ViewerStat {
                name,
                viewers: raw.trim().parse().unwrap_or(0),
            })
        })
        .collect();
    top_n(stats, TOP_N, |s| s.viewers)
}
