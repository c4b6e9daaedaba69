//! Batch orchestration: roster -> filter -> fetch -> merge

use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::fetcher::PlayerTimeSeriesFetcher;
use crate::merger::merge;
use crate::models::{MergedRecord, PlayerRecord, RosterSnapshot};
use crate::roster::RosterCache;

/// Players worth fetching: active, on a team, at a fantasy position
pub fn filter_active_players(snapshot: &RosterSnapshot) -> Vec<&PlayerRecord> {
    snapshot.records().iter().filter(|p| p.is_fantasy_relevant()).collect()
}

/// Result of one batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub records: Vec<MergedRecord>,
    pub players_considered: usize,
    pub players_with_data: usize,
    pub players_without_data: usize,
    pub players_missing: usize,
}

impl BatchReport {
    /// Players that produced no rows, for whatever reason
    pub fn players_skipped(&self) -> usize {
        self.players_without_data + self.players_missing
    }
}

/// Drives the pipeline for a season
pub struct BatchOrchestrator {
    roster: RosterCache,
    fetcher: PlayerTimeSeriesFetcher,
    roster_path: PathBuf,
    force_refresh: bool,
}

impl BatchOrchestrator {
    pub fn new(
        roster: RosterCache,
        fetcher: PlayerTimeSeriesFetcher,
        roster_path: impl Into<PathBuf>,
        force_refresh: bool,
    ) -> Self {
        Self { roster, fetcher, roster_path: roster_path.into(), force_refresh }
    }

    /// Every week of every active player
    pub async fn run_batch(&self, season: u32) -> Result<BatchReport> {
        self.run_filtered(season, None).await
    }

    /// Same as [`run_batch`](Self::run_batch), keeping only `week`
    pub async fn run_week(&self, season: u32, week: u32) -> Result<BatchReport> {
        self.run_filtered(season, Some(week)).await
    }

    /// Run for an explicit id list, bypassing the activity filter
    pub async fn run_players(&self, season: u32, player_ids: &[String]) -> Result<BatchReport> {
        let snapshot = self.load_roster().await?;
        let mut report = BatchReport::default();

        info!("Processing {} requested players for season {}", player_ids.len(), season);
        for player_id in player_ids {
            report.players_considered += 1;
            match snapshot.require(player_id) {
                Ok(player) => self.process_player(player, season, None, &mut report).await,
                Err(e) if !e.is_fatal() => {
                    warn!("Skipping player: {}", e);
                    report.players_missing += 1;
                }
                Err(e) => return Err(e),
            }
        }

        log_summary(season, &report);
        Ok(report)
    }

    async fn run_filtered(&self, season: u32, week: Option<u32>) -> Result<BatchReport> {
        let snapshot = self.load_roster().await?;
        let players = filter_active_players(&snapshot);
        let mut report = BatchReport::default();

        info!(
            "Processing {} active players out of {} for season {}",
            players.len(),
            snapshot.len(),
            season
        );
        for player in players {
            report.players_considered += 1;
            self.process_player(player, season, week, &mut report).await;
        }

        log_summary(season, &report);
        Ok(report)
    }

    async fn load_roster(&self) -> Result<RosterSnapshot> {
        self.roster.load_roster(&self.roster_path, self.force_refresh).await
    }

    /// Fetch and merge one player, appending rows and updating counters
    async fn process_player(
        &self,
        player: &PlayerRecord,
        season: u32,
        week: Option<u32>,
        report: &mut BatchReport,
    ) {
        let player_id = player.player_id.as_str();
        let name = player.full_name.as_deref().unwrap_or(player_id);

        let Some(weeks) = self.fetcher.fetch_player_data(player_id, season).await else {
            info!("No data for {} ({})", name, player_id);
            report.players_without_data += 1;
            return;
        };

        let before = report.records.len();
        for (&week_number, entry) in &weeks {
            if week.is_some_and(|wanted| wanted != week_number) {
                continue;
            }
            if entry.projections.is_none() {
                debug!("No projection for {} week {}", player_id, week_number);
            }
            report.records.push(merge(player_id, player, entry, week_number));
        }

        let added = report.records.len() - before;
        if added == 0 {
            info!("No data for {} ({}) in the requested week", name, player_id);
            report.players_without_data += 1;
        } else {
            debug!("Merged {} weeks for {} ({})", added, name, player_id);
            report.players_with_data += 1;
        }
    }
}

fn log_summary(season: u32, report: &BatchReport) {
    info!(
        "Season {}: {} rows from {} players ({} without data, {} missing from roster)",
        season,
        report.records.len(),
        report.players_with_data,
        report.players_without_data,
        report.players_missing
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawPlayer;
    use chrono::NaiveDate;

    fn player(id: &str, active: Option<bool>, team: Option<&str>, position: Option<&str>) -> PlayerRecord {
        RawPlayer {
            full_name: Some(format!("Player {id}")),
            active,
            team: team.map(str::to_string),
            position: position.map(str::to_string),
            ..Default::default()
        }
        .into_record(id.to_string(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    #[test]
    fn test_filter_active_players_over_mixed_roster() {
        let snapshot = RosterSnapshot::new(
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            vec![
                player("1", Some(true), Some("KC"), Some("QB")),
                player("2", Some(false), Some("KC"), Some("RB")),
                player("3", Some(true), None, Some("WR")),
                player("4", Some(true), Some(""), Some("TE")),
                player("5", Some(true), Some("BUF"), Some("OL")),
                player("6", None, Some("BUF"), Some("K")),
                player("7", Some(true), Some("SF"), Some("DEF")),
                player("8", Some(true), Some("SF"), None),
                player("9", Some(true), Some("DAL"), Some("TE")),
            ],
        );

        let ids: Vec<&str> =
            filter_active_players(&snapshot).iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "7", "9"]);
    }

    #[test]
    fn test_report_skipped_total() {
        let report = BatchReport { players_without_data: 2, players_missing: 1, ..Default::default() };
        assert_eq!(report.players_skipped(), 3);
    }
}
