use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

use crate::types::{ProjectionSheet, SecondaryProjection};

const SOURCE: &str = "FantasyPros";

/// FantasyPros weekly projections scraper
pub struct FantasyProsScraper {
    client: Client,
    base_url: String,
}

impl FantasyProsScraper {
    /// Create a new scraper against fantasypros.com
    pub fn new() -> Result<Self> {
        Self::with_base_url("https://www.fantasypros.com")
    }

    /// Create a scraper against another host serving the same pages
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    /// Projection page for a position and week
    pub fn projections_url(&self, position: &str, week: u32) -> String {
        format!("{}/nfl/projections/{}.php?week={}", self.base_url, position.to_lowercase(), week)
    }

    /// Scrape the weekly projection table for one position
    pub async fn scrape_week(&self, position: &str, week: u32) -> Result<ProjectionSheet> {
        let url = self.projections_url(position, week);
        info!("Fetching {} projections from: {}", SOURCE, url);

        let response =
            self.client.get(&url).send().await.context("Failed to fetch FantasyPros page")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP request failed with status: {}", response.status());
        }

        let html = response.text().await.context("Failed to read response body")?;
        info!("Successfully fetched HTML ({} bytes)", html.len());

        let mut sheet = ProjectionSheet::new(SOURCE, position.to_uppercase(), week);
        sheet.rows = parse_projection_table(&html)?;

        info!("Parsed {} {} rows for week {}", sheet.len(), sheet.position, week);
        Ok(sheet)
    }
}

/// Parse `table#data`: skip the first row, ignore rows without cells, take the
/// first cell as the player and the last cell as projected points.
pub fn parse_projection_table(html: &str) -> Result<Vec<SecondaryProjection>> {
    let document = Html::parse_document(html);

    let table_selector = Selector::parse("table#data")
        .map_err(|e| anyhow::anyhow!("Failed to create table selector: {}", e))?;
    let row_selector = Selector::parse("tr")
        .map_err(|e| anyhow::anyhow!("Failed to create row selector: {}", e))?;
    let cell_selector = Selector::parse("td")
        .map_err(|e| anyhow::anyhow!("Failed to create cell selector: {}", e))?;

    let table = document
        .select(&table_selector)
        .next()
        .context("Could not find projections table")?;

    let rows = table
        .select(&row_selector)
        .skip(1)
        .filter_map(|row| parse_row(&row, &cell_selector))
        .collect();

    Ok(rows)
}

fn parse_row(row: &ElementRef, cell_selector: &Selector) -> Option<SecondaryProjection> {
    let cells: Vec<ElementRef> = row.select(cell_selector).collect();
    let (first, last) = (cells.first()?, cells.last()?);

    let player = cell_text(first);
    let points = cell_text(last);
    let projected_points = points.replace(',', "").parse::<f64>().ok();
    if projected_points.is_none() {
        debug!("Unparsed projected points {:?} for {}", points, player);
    }

    Some(SecondaryProjection { player, projected_points })
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table id="other"><tr><td>Ignore me</td><td>99.9</td></tr></table>
        <table id="data">
          <thead>
            <tr><th>Player</th><th>ATT</th><th>FPTS</th></tr>
          </thead>
          <tbody>
            <tr><td><a href="/nfl/players/josh-allen.php">Josh Allen</a> BUF</td><td>33.1</td><td>24.3</td></tr>
            <tr></tr>
            <tr><td>Patrick Mahomes KC</td><td>36.0</td><td>22.8</td></tr>
            <tr><td>Backup Quarterback NYJ</td><td>-</td><td> </td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_projection_table() {
        let rows = parse_projection_table(PAGE).unwrap();

        assert_eq!(
            rows,
            vec![
                SecondaryProjection {
                    player: "Josh Allen BUF".to_string(),
                    projected_points: Some(24.3)
                },
                SecondaryProjection {
                    player: "Patrick Mahomes KC".to_string(),
                    projected_points: Some(22.8)
                },
                SecondaryProjection {
                    player: "Backup Quarterback NYJ".to_string(),
                    projected_points: None
                },
            ]
        );
    }

    #[test]
    fn test_first_row_is_skipped_even_without_thead() {
        let html = r#"<table id="data">
            <tr><td>Player</td><td>FPTS</td></tr>
            <tr><td>Lamar Jackson BAL</td><td>1,024.5</td></tr>
        </table>"#;

        let rows = parse_projection_table(html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player, "Lamar Jackson BAL");
        assert_eq!(rows[0].projected_points, Some(1024.5));
    }

    #[test]
    fn test_missing_table_is_an_error() {
        assert!(parse_projection_table("<html><body><p>maintenance</p></body></html>").is_err());
    }

    #[test]
    fn test_projections_url() {
        let scraper = FantasyProsScraper::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(
            scraper.projections_url("QB", 3),
            "http://localhost:8080/nfl/projections/qb.php?week=3"
        );
    }

    #[test]
    fn test_ranked_orders_by_points() {
        let mut sheet = ProjectionSheet::new(SOURCE, "QB", 1);
        for (player, points) in [("A", Some(10.0)), ("B", None), ("C", Some(20.5))] {
            sheet.rows.push(SecondaryProjection {
                player: player.to_string(),
                projected_points: points,
            });
        }

        let order: Vec<&str> = sheet.ranked().iter().map(|r| r.player.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }
}
