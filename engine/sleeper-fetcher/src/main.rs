//! Sleeper Fetcher CLI
//!
//! Runs the weekly player data pipeline, refreshes the roster cache, or
//! scrapes the FantasyPros projection table.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use player_scraper::FantasyProsScraper;
use sleeper_fetcher::{
    initialize_logging, table, ApiTransport, BatchOrchestrator, FetcherConfig,
    PlayerTimeSeriesFetcher, RateLimiter, ReqwestTransport, RosterCache, SleeperEndpoints,
};

/// Sleeper NFL player data pipeline
#[derive(Parser)]
#[command(name = "sleeper-fetcher")]
#[command(about = "Fetch and merge weekly NFL stats and projections from Sleeper")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch stats and projections for a season and write the merged CSV
    Batch {
        /// Season year
        #[arg(long)]
        season: u32,
        /// Keep a single week
        #[arg(long)]
        week: Option<u32>,
        /// Only these player ids (repeatable)
        #[arg(long = "player")]
        players: Vec<String>,
        /// Ignore the roster cache
        #[arg(long)]
        force_refresh: bool,
    },
    /// Load the roster, refreshing the cache if it has expired
    Roster {
        #[arg(long)]
        force_refresh: bool,
    },
    /// Scrape the FantasyPros weekly projection table
    Fantasypros {
        #[arg(long)]
        week: u32,
        #[arg(long, default_value = "qb")]
        position: String,
    },
}

struct Pipeline {
    transport: Arc<dyn ApiTransport>,
    limiter: Arc<RateLimiter>,
    endpoints: SleeperEndpoints,
}

impl Pipeline {
    fn new(config: &FetcherConfig) -> Result<Self> {
        let transport =
            ReqwestTransport::new(&config.api).context("Failed to create HTTP client")?;
        Ok(Self {
            transport: Arc::new(transport),
            limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
            endpoints: SleeperEndpoints::new(&config.api),
        })
    }

    fn roster_cache(&self, config: &FetcherConfig) -> RosterCache {
        RosterCache::new(
            self.transport.clone(),
            self.limiter.clone(),
            self.endpoints.clone(),
            config.cache.expiry_days,
        )
    }

    fn fetcher(&self) -> PlayerTimeSeriesFetcher {
        PlayerTimeSeriesFetcher::new(
            self.transport.clone(),
            self.limiter.clone(),
            self.endpoints.clone(),
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any overrides
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = FetcherConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    initialize_logging(&config.logging)?;

    info!("Starting Sleeper Fetcher v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Batch { season, week, players, force_refresh } => {
            let pipeline = Pipeline::new(&config)?;
            let orchestrator = BatchOrchestrator::new(
                pipeline.roster_cache(&config),
                pipeline.fetcher(),
                &config.cache.roster_file,
                force_refresh || config.cache.force_refresh,
            );

            let mut report = if players.is_empty() {
                match week {
                    Some(week) => orchestrator.run_week(season, week).await?,
                    None => orchestrator.run_batch(season).await?,
                }
            } else {
                orchestrator.run_players(season, &players).await?
            };
            if let Some(week) = week {
                report.records.retain(|record| record.week == week);
            }

            // Persist the merged table
            let path = table::output_path(&config.output.dir, season, week);
            let rows = table::write_merged(&path, &report.records)?;
            info!(
                "Wrote {} rows to {} ({} players with data, {} without, {} missing from roster)",
                rows,
                path.display(),
                report.players_with_data,
                report.players_without_data,
                report.players_missing
            );
        }
        Commands::Roster { force_refresh } => {
            let pipeline = Pipeline::new(&config)?;
            let snapshot = pipeline
                .roster_cache(&config)
                .load_roster(&config.cache.roster_file, force_refresh || config.cache.force_refresh)
                .await?;
            info!(
                "Roster ready: {} players, fetched {}, cached at {}",
                snapshot.len(),
                snapshot.fetched_on(),
                config.cache.roster_file.display()
            );
        }
        Commands::Fantasypros { week, position } => {
            let scraper = FantasyProsScraper::new()?;
            let sheet = scraper.scrape_week(&position, week).await?;
            if let Some(top) = sheet.ranked().first() {
                info!(
                    "Top {} projection for week {}: {} ({})",
                    sheet.position,
                    week,
                    top.player,
                    top.projected_points.map_or("N/A".to_string(), |p| p.to_string())
                );
            }

            let path = table::projection_sheet_path(&config.output.dir, &sheet);
            let rows = table::write_projection_sheet(&path, &sheet)?;
            info!(
                "Wrote {} {} rows to {} (scraped {})",
                rows,
                sheet.source,
                path.display(),
                sheet.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    Ok(())
}
