use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::{ApiTransport, SleeperEndpoints};
use crate::error::FetchError;
use crate::models::{PlayerWeeks, StatBlock, WeekEntry};
use crate::rate_limiter::RateLimiter;

/// Which per-player series a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Stats,
    Projections,
}

impl Series {
    fn label(self) -> &'static str {
        match self {
            Series::Stats => "stats",
            Series::Projections => "projections",
        }
    }
}

/// Retrieves a player's weekly stats and projections for one season
pub struct PlayerTimeSeriesFetcher {
    transport: Arc<dyn ApiTransport>,
    limiter: Arc<RateLimiter>,
    endpoints: SleeperEndpoints,
}

impl PlayerTimeSeriesFetcher {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        limiter: Arc<RateLimiter>,
        endpoints: SleeperEndpoints,
    ) -> Self {
        Self { transport, limiter, endpoints }
    }

    /// Weeks with recorded stats, with projections attached where published.
    ///
    /// Returns `None` when no week has stats. A failed or non-200 request only
    /// removes its own series from the result.
    pub async fn fetch_player_data(&self, player_id: &str, season: u32) -> Option<PlayerWeeks> {
        let stats = self.fetch_series(Series::Stats, player_id, season).await;
        let projections = self.fetch_series(Series::Projections, player_id, season).await;

        let weeks = combine(stats, projections);
        if weeks.is_empty() {
            debug!("No weekly stats for player {} in {}", player_id, season);
            None
        } else {
            Some(weeks)
        }
    }

    /// Fetch one series and decode it into week -> payload
    async fn fetch_series(
        &self,
        series: Series,
        player_id: &str,
        season: u32,
    ) -> Option<HashMap<String, Option<StatBlock>>> {
        let url = match series {
            Series::Stats => self.endpoints.stats(player_id, season),
            Series::Projections => self.endpoints.projections(player_id, season),
        };

        self.limiter.acquire().await;
        match self.request(&url).await {
            Ok(weeks) => weeks,
            Err(e) => {
                warn!("No {} for player {}: {}", series.label(), player_id, e);
                None
            }
        }
    }

    async fn request(
        &self,
        url: &str,
    ) -> Result<Option<HashMap<String, Option<StatBlock>>>, FetchError> {
        let response = self.transport.get(url).await?;
        if !response.is_ok() {
            return Err(FetchError::Status { url: url.to_string(), status: response.status });
        }

        serde_json::from_str(&response.body).map_err(|e| FetchError::decode(url, e))
    }
}

/// Align the two series by week.
///
/// A week gains stats when its payload has a non-empty `stats` object; it gains
/// projections under the same rule, but only if it already has stats.
pub fn combine(
    stats: Option<HashMap<String, Option<StatBlock>>>,
    projections: Option<HashMap<String, Option<StatBlock>>>,
) -> PlayerWeeks {
    let mut weeks = PlayerWeeks::new();

    for (week, block) in stats.unwrap_or_default() {
        let Some(week) = parse_week(&week) else {
            continue;
        };
        if let Some(block) = block.filter(StatBlock::has_stats) {
            weeks.insert(week, WeekEntry { stats: Some(block), projections: None });
        }
    }

    for (week, block) in projections.unwrap_or_default() {
        let Some(week) = parse_week(&week) else {
            continue;
        };
        match (weeks.get_mut(&week), block.filter(StatBlock::has_stats)) {
            (Some(entry), Some(block)) => entry.projections = Some(block),
            (None, Some(_)) => debug!("Dropping projection-only week {}", week),
            _ => {}
        }
    }

    weeks
}

fn parse_week(raw: &str) -> Option<u32> {
    let week = raw.trim().parse().ok();
    if week.is_none() {
        debug!("Skipping non-numeric week key {:?}", raw);
    }
    week
}
