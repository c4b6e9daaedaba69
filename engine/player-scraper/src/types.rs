use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a secondary projection table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryProjection {
    /// Player cell as displayed (e.g., "Josh Allen BUF")
    pub player: String,
    /// Projected fantasy points; `None` when the cell was blank or not a number
    pub projected_points: Option<f64>,
}

/// A scraped projection table for one position and week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSheet {
    /// Site the table came from (e.g., "FantasyPros")
    pub source: String,
    /// Position the table covers (e.g., "QB")
    pub position: String,
    /// Week number
    pub week: u32,
    /// When this sheet was scraped
    pub last_updated: DateTime<Utc>,
    /// Rows in page order
    pub rows: Vec<SecondaryProjection>,
}

impl ProjectionSheet {
    /// Create an empty sheet
    pub fn new(source: impl Into<String>, position: impl Into<String>, week: u32) -> Self {
        Self {
            source: source.into(),
            position: position.into(),
            week,
            last_updated: Utc::now(),
            rows: Vec::new(),
        }
    }

    /// Rows sorted by projected points, highest first; unparsed points last
    pub fn ranked(&self) -> Vec<&SecondaryProjection> {
        let mut rows: Vec<&SecondaryProjection> = self.rows.iter().collect();
        rows.sort_by(|a, b| match (a.projected_points, b.projected_points) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
