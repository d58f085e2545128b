use super::RefreshSlot;
use crate::clients::LaunchSource;
use crate::domain::{LaunchSummary, NamedValue, NextLaunch, RawLaunch, RawRocket, Snapshot};
use crate::errors::ApiResult;
use crate::utils::{parse_utc, round1, Tally};
use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;

const TOP_ROCKETS: usize = 5;

/// Launch history aggregation service
pub struct LaunchService {
    source: Arc<dyn LaunchSource>,
    slot: RefreshSlot<LaunchSummary>,
}

impl LaunchService {
    pub fn new(source: Arc<dyn LaunchSource>) -> Self {
        Self {
            source,
            slot: RefreshSlot::new("launches"),
        }
    }

    /// Fetch launches, rockets and upcoming launches together; any failure aborts
    pub async fn fetch_launch_summary(&self) -> ApiResult<LaunchSummary> {
        let (launches, rockets, upcoming) = tokio::try_join!(
            self.source.launches(),
            self.source.rockets(),
            self.source.upcoming(),
        )?;
        info!(
            "Launches: {}, rockets: {}, upcoming: {}",
            launches.len(),
            rockets.len(),
            upcoming.len()
        );

        Ok(summarize_launches(&launches, &rockets, &upcoming, Utc::now()))
    }

    pub async fn refresh(&self) -> ApiResult<LaunchSummary> {
        let token = self.slot.begin();
        let summary = self.fetch_launch_summary().await?;
        self.slot.commit(token, summary.clone()).await;
        Ok(summary)
    }

    pub async fn latest(&self) -> Option<Snapshot<LaunchSummary>> {
        self.slot.latest().await
    }
}

/// Build the launch-history view in a single pass over `launches`
pub fn summarize_launches(
    launches: &[RawLaunch],
    rockets: &[RawRocket],
    upcoming: &[RawLaunch],
    now: DateTime<Utc>,
) -> LaunchSummary {
    let rockets_by_id: HashMap<&str, &RawRocket> =
        rockets.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut per_year: BTreeMap<i32, u64> = BTreeMap::new();
    let mut per_rocket = Tally::new();
    let (mut successful, mut failed, mut pending) = (0u64, 0u64, 0u64);

    for launch in launches {
        if let Some(date) = parse_utc(&launch.date_utc) {
            *per_year.entry(date.year()).or_insert(0) += 1;
        }

        let rocket_name = launch
            .rocket
            .as_deref()
            .and_then(|id| rockets_by_id.get(id))
            .map(|r| r.name.as_str())
            .filter(|name| !name.is_empty() && *name != "Unknown");
        if let Some(name) = rocket_name {
            per_rocket.add(name, 1);
        }

        match launch.success {
            Some(true) => successful += 1,
            Some(false) => failed += 1,
            None => {}
        }
        if launch.upcoming {
            pending += 1;
        }
    }

    let total = launches.len() as u64;
    let success_rate = if total == 0 {
        0.0
    } else {
        round1(successful as f64 / total as f64 * 100.0)
    };

    let next_launch = upcoming
        .iter()
        .filter_map(|l| parse_utc(&l.date_utc).map(|date| (date, l)))
        .filter(|(date, _)| *date > now)
        .min_by_key(|(date, _)| *date)
        .map(|(date, l)| {
            let rocket = l.rocket.as_deref().and_then(|id| rockets_by_id.get(id));
            NextLaunch {
                mission: l.name.clone(),
                date,
                webcast: l.links.as_ref().and_then(|links| links.webcast.clone()),
                rocket: rocket.map(|r| r.name.clone()),
                rocket_description: rocket.and_then(|r| r.description.clone()),
            }
        });

    LaunchSummary {
        line_data: per_year
            .into_iter()
            .map(|(year, count)| NamedValue::new(year.to_string(), count))
            .collect(),
        bar_data: per_rocket
            .into_ranked(TOP_ROCKETS)
            .into_iter()
            .map(|(name, count)| NamedValue::new(name, count))
            .collect(),
        pie_data: vec![
            NamedValue::new("Success", successful),
            NamedValue::new("Failed", failed),
            NamedValue::new("Upcoming", pending),
        ],
        total_launches: total,
        success_rate,
        next_launch,
    }
}
