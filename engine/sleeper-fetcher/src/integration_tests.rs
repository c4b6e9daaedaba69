//! End-to-end pipeline tests against an in-memory transport

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use crate::batch::BatchOrchestrator;
use crate::client::mock::MockTransport;
use crate::client::SleeperEndpoints;
use crate::config::{ApiConfig, CACHE_EXPIRY_DAYS};
use crate::fetcher::PlayerTimeSeriesFetcher;
use crate::models::{ProjectedValue, StatCode};
use crate::rate_limiter::RateLimiter;
use crate::roster::{FixedClock, RosterCache};
use crate::table;

const ROSTER_URL: &str = "https://api.sleeper.app/v1/players/nfl";

fn series_url(kind: &str, player_id: &str) -> String {
    format!(
        "https://api.sleeper.com/{kind}/nfl/player/{player_id}?season_type=regular&season=2023&grouping=week"
    )
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn roster_json() -> &'static str {
    r#"{
        "4046": {"full_name": "Patrick Mahomes", "age": 28, "position": "QB", "team": "KC",
                 "depth_chart_order": 1, "fantasy_positions": ["QB"], "active": true},
        "4034": {"full_name": "Christian McCaffrey", "age": "27", "position": "RB", "team": "SF",
                 "fantasy_positions": ["RB"], "active": true},
        "1234": {"full_name": "Retired Lineman", "position": "OT", "team": "KC", "active": true},
        "5555": {"full_name": "Free Agent", "position": "WR", "team": null, "active": true},
        "6666": {"full_name": "Inactive Kicker", "position": "K", "team": "DAL", "active": false}
    }"#
}

fn orchestrator(transport: Arc<MockTransport>, dir: &TempDir) -> BatchOrchestrator {
    let limiter = Arc::new(RateLimiter::with_interval(Duration::ZERO));
    let endpoints = SleeperEndpoints::new(&ApiConfig::default());

    let roster =
        RosterCache::new(transport.clone(), limiter.clone(), endpoints.clone(), CACHE_EXPIRY_DAYS)
            .with_clock(Arc::new(FixedClock(today())));
    let fetcher = PlayerTimeSeriesFetcher::new(transport, limiter, endpoints);

    BatchOrchestrator::new(roster, fetcher, dir.path().join("nfl_players_cache.csv"), false)
}

fn seeded_transport() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    transport.respond(ROSTER_URL, 200, roster_json());

    transport.respond(
        series_url("stats", "4046"),
        200,
        r#"{"1": {"stats": {"pass_yd": 300, "pass_td": 3, "pts_half_ppr": 24.0},
                  "team": "KC", "opponent": "DET", "date": "2023-09-07"},
            "2": {"stats": {"pass_yd": 226, "pass_td": 2, "rush_yd": 30},
                  "team": "KC", "opponent": "JAX", "date": "2023-09-17"}}"#,
    );
    transport.respond(
        series_url("projections", "4046"),
        200,
        r#"{"1": {"stats": {"pass_yd": 275}, "team": "KC", "opponent": "DET"},
            "18": {"stats": {"pass_yd": 260}}}"#,
    );

    // McCaffrey: stats 404, projections present but empty
    transport.respond(series_url("projections", "4034"), 200, r#"{"1": {"stats": {}}}"#);

    transport
}

#[tokio::test]
async fn test_run_batch_end_to_end() {
    let dir = TempDir::new().unwrap();
    let transport = seeded_transport();

    let report = orchestrator(transport.clone(), &dir).run_batch(2023).await.unwrap();

    assert_eq!(report.players_considered, 2);
    assert_eq!(report.players_with_data, 1);
    assert_eq!(report.players_without_data, 1);
    assert_eq!(report.players_missing, 0);
    assert_eq!(report.records.len(), 2);

    let week1 = &report.records[0];
    assert_eq!(week1.player_id, "4046");
    assert_eq!(week1.player_name.as_deref(), Some("Patrick Mahomes"));
    assert_eq!(week1.week, 1);
    assert_eq!(week1.opponent.as_deref(), Some("DET"));
    assert_eq!(week1.actual(StatCode::PassYd), 300.0);
    assert_eq!(week1.projected(StatCode::PassYd), ProjectedValue::Value(275.0));
    assert_eq!(week1.actual(StatCode::PassTd), 3.0);
    assert_eq!(week1.projected(StatCode::PassTd), ProjectedValue::NotAvailable);

    let week2 = &report.records[1];
    assert_eq!(week2.week, 2);
    assert_eq!(week2.actual(StatCode::RushYd), 30.0);
    assert_eq!(week2.projected(StatCode::PassYd), ProjectedValue::NotAvailable);

    // roster first, then stats + projections per active player in API order
    assert_eq!(
        transport.calls(),
        vec![
            ROSTER_URL.to_string(),
            series_url("stats", "4046"),
            series_url("projections", "4046"),
            series_url("stats", "4034"),
            series_url("projections", "4034"),
        ]
    );

    let out = table::output_path(dir.path(), 2023, None);
    assert_eq!(table::write_merged(&out, &report.records).unwrap(), 2);
    let content = std::fs::read_to_string(&out).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("player_id,player_name,age,position,depth_chart_order,week,team,opponent,date,"));
    assert!(header.contains("projected_pass_yd,actual_pass_yd"));
    assert_eq!(lines.count(), 2);
}

#[tokio::test]
async fn test_second_run_uses_cached_roster() {
    let dir = TempDir::new().unwrap();
    let transport = seeded_transport();

    orchestrator(transport.clone(), &dir).run_batch(2023).await.unwrap();
    orchestrator(transport.clone(), &dir).run_batch(2023).await.unwrap();

    let roster_calls = transport.calls().iter().filter(|url| *url == ROSTER_URL).count();
    assert_eq!(roster_calls, 1);
}

#[tokio::test]
async fn test_run_week_keeps_only_that_week() {
    let dir = TempDir::new().unwrap();

    let report = orchestrator(seeded_transport(), &dir).run_week(2023, 2).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].week, 2);
    assert_eq!(report.records[0].opponent.as_deref(), Some("JAX"));

    let report = orchestrator(seeded_transport(), &dir).run_week(2023, 9).await.unwrap();
    assert!(report.records.is_empty());
    assert_eq!(report.players_with_data, 0);
    assert_eq!(report.players_without_data, 2);
}

#[tokio::test]
async fn test_run_players_reports_missing_ids() {
    let dir = TempDir::new().unwrap();
    let transport = seeded_transport();

    let ids = vec!["4046".to_string(), "9999".to_string(), "1234".to_string()];
    let report = orchestrator(transport.clone(), &dir).run_players(2023, &ids).await.unwrap();

    assert_eq!(report.players_considered, 3);
    assert_eq!(report.players_missing, 1);
    assert_eq!(report.players_with_data, 1);
    // explicit ids bypass the position filter; the lineman just has no data
    assert_eq!(report.players_without_data, 1);
    assert_eq!(report.records.len(), 2);
    assert!(!transport.calls().contains(&series_url("stats", "9999")));
}

#[tokio::test]
async fn test_roster_failure_fails_the_batch() {
    let dir = TempDir::new().unwrap();
    let transport = Arc::new(MockTransport::new());
    transport.respond(ROSTER_URL, 500, "oops");

    let err = orchestrator(transport.clone(), &dir).run_batch(2023).await.unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(transport.calls(), vec![ROSTER_URL.to_string()]);
}
