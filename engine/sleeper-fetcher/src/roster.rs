//! Roster cache with time-based expiry

use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::{ApiTransport, SleeperEndpoints};
use crate::error::{CacheReadError, FetchError, PipelineError, Result};
use crate::models::{RawPlayer, RosterSnapshot};
use crate::rate_limiter::RateLimiter;
use crate::table;

/// Source of "today" for expiry decisions
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Loads the roster from disk when fresh, otherwise refetches and rewrites it
pub struct RosterCache {
    transport: Arc<dyn ApiTransport>,
    limiter: Arc<RateLimiter>,
    endpoints: SleeperEndpoints,
    expiry_days: i64,
    clock: Arc<dyn Clock>,
}

impl RosterCache {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        limiter: Arc<RateLimiter>,
        endpoints: SleeperEndpoints,
        expiry_days: i64,
    ) -> Self {
        Self { transport, limiter, endpoints, expiry_days, clock: Arc::new(SystemClock) }
    }

    /// Replace the clock used for expiry and stamping
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// A snapshot is fresh while `today - fetched_on < expiry_days`
    pub fn is_fresh(&self, snapshot: &RosterSnapshot, today: NaiveDate) -> bool {
        (today - snapshot.fetched_on()).num_days() < self.expiry_days
    }

    /// Return the cached roster at `path` if fresh, else fetch, persist and return a new one
    pub async fn load_roster(&self, path: &Path, force_refresh: bool) -> Result<RosterSnapshot> {
        let today = self.clock.today();

        // Try the cache first
        if !force_refresh {
            match table::read_roster(path) {
                Ok(snapshot) if self.is_fresh(&snapshot, today) => {
                    info!(
                        "Using cached player data from {} ({} players, fetched {})",
                        path.display(),
                        snapshot.len(),
                        snapshot.fetched_on()
                    );
                    return Ok(snapshot);
                }
                Ok(snapshot) => {
                    info!(
                        "Player cache fetched {} is older than {} days, refreshing",
                        snapshot.fetched_on(),
                        self.expiry_days
                    );
                }
                Err(CacheReadError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("No player cache at {}", path.display());
                }
                Err(e) => {
                    warn!("Ignoring unusable player cache {}: {}", path.display(), e);
                }
            }
        }

        // Miss, stale or forced: refetch and overwrite
        let snapshot = self.fetch_roster(today).await?;
        table::write_roster(path, &snapshot).map_err(PipelineError::CacheWrite)?;
        Ok(snapshot)
    }

    /// Fetch the full roster and stamp every record with `today`
    async fn fetch_roster(&self, today: NaiveDate) -> Result<RosterSnapshot> {
        let url = self.endpoints.roster();
        info!("Fetching fresh player data from {}", url);

        self.limiter.acquire().await;
        let response = self.transport.get(url).await?;
        if !response.is_ok() {
            return Err(FetchError::Status { url: url.to_string(), status: response.status }.into());
        }

        // Map keeps the API's key order
        let players: Map<String, Value> =
            serde_json::from_str(&response.body).map_err(|e| FetchError::decode(url, e))?;

        let mut records = Vec::with_capacity(players.len());
        for (player_id, value) in players {
            if player_id.trim().is_empty() {
                continue;
            }
            let raw: RawPlayer =
                serde_json::from_value(value).map_err(|e| FetchError::decode(url, e))?;
            records.push(raw.into_record(player_id, today));
        }

        let snapshot = RosterSnapshot::new(today, records);
        info!("Fetched {} players", snapshot.len());
        Ok(snapshot)
    }
}
