//! Sleeper Fetcher
//!
//! Pulls NFL roster metadata, weekly stats and weekly projections from the
//! Sleeper API and flattens them into one CSV row per player per week.
//!
//! The roster is cached on disk and refetched once it is older than the
//! configured expiry. Per-player requests share a single rate limiter, and a
//! player whose stats or projections cannot be fetched is skipped rather than
//! failing the batch.

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod merger;
pub mod models;
pub mod rate_limiter;
pub mod roster;
pub mod table;

pub use batch::{filter_active_players, BatchOrchestrator, BatchReport};
pub use client::{ApiTransport, HttpResponse, ReqwestTransport, SleeperEndpoints};
pub use config::FetcherConfig;
pub use error::{CacheReadError, FetchError, PipelineError, Result, TableError};
pub use fetcher::PlayerTimeSeriesFetcher;
pub use logging::initialize_logging;
pub use merger::merge;
pub use models::*;
pub use rate_limiter::RateLimiter;
pub use roster::{Clock, FixedClock, RosterCache, SystemClock};

#[cfg(test)]
mod integration_tests;
