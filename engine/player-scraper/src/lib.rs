//! Secondary projection scraper
//!
//! Pulls the weekly projection table for a position from FantasyPros and
//! returns it as a [`ProjectionSheet`] of player / projected points rows.

pub mod scraper;
pub mod types;

pub use crate::scraper::{parse_projection_table, FantasyProsScraper};
pub use types::{ProjectionSheet, SecondaryProjection};
