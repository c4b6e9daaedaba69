//! CSV persistence for roster snapshots, merged batch output and secondary projections

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use player_scraper::ProjectionSheet;
use tracing::info;

use crate::error::{CacheReadError, TableError};
use crate::models::{MergedRecord, PlayerRecord, RosterSnapshot};

/// Output file for a batch run
pub fn output_path(dir: &Path, season: u32, week: Option<u32>) -> PathBuf {
    match week {
        Some(week) => dir.join(format!("sleeper_season_{season}_week_{week}.csv")),
        None => dir.join(format!("sleeper_season_{season}.csv")),
    }
}

/// Output file for a scraped projection sheet
pub fn projection_sheet_path(dir: &Path, sheet: &ProjectionSheet) -> PathBuf {
    dir.join(format!(
        "{}_{}_week_{}.csv",
        sheet.source.to_lowercase(),
        sheet.position.to_lowercase(),
        sheet.week
    ))
}

/// Read a roster snapshot written by [`write_roster`]
pub fn read_roster(path: &Path) -> Result<RosterSnapshot, CacheReadError> {
    let file = File::open(path)?;
    read_roster_from_reader(file)
}

fn read_roster_from_reader<R: Read>(rdr: R) -> Result<RosterSnapshot, CacheReadError> {
    let mut reader = csv::Reader::from_reader(rdr);

    if !reader.headers()?.iter().any(|h| h == "cache_date") {
        return Err(CacheReadError::MissingCacheDate);
    }

    let records = reader
        .deserialize::<PlayerRecord>()
        .collect::<Result<Vec<_>, csv::Error>>()?;

    let fetched_on = records.first().map(|r| r.cache_date).ok_or(CacheReadError::Empty)?;
    Ok(RosterSnapshot::new(fetched_on, records))
}

/// Overwrite `path` with the snapshot, via a temporary file in the same directory
pub fn write_roster(path: &Path, snapshot: &RosterSnapshot) -> Result<(), TableError> {
    ensure_parent(path)?;

    // Write to a sibling file, then swap it in
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp).map_err(|e| TableError::csv(&tmp, e))?;
        for record in snapshot.records() {
            writer.serialize(record).map_err(|e| TableError::csv(&tmp, e))?;
        }
        writer.flush().map_err(|e| TableError::io(&tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| TableError::io(path, e))?;

    info!("Player data cached to {} ({} players)", path.display(), snapshot.len());
    Ok(())
}

/// Write merged records, returning the number of data rows
pub fn write_merged(path: &Path, records: &[MergedRecord]) -> Result<usize, TableError> {
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path).map_err(|e| TableError::csv(path, e))?;
    writer.write_record(MergedRecord::csv_headers()).map_err(|e| TableError::csv(path, e))?;
    for record in records {
        writer.write_record(record.to_csv_row()).map_err(|e| TableError::csv(path, e))?;
    }
    writer.flush().map_err(|e| TableError::io(path, e))?;

    Ok(records.len())
}

/// Write the rows of a scraped projection sheet
pub fn write_projection_sheet(path: &Path, sheet: &ProjectionSheet) -> Result<usize, TableError> {
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path).map_err(|e| TableError::csv(path, e))?;
    for row in &sheet.rows {
        writer.serialize(row).map_err(|e| TableError::csv(path, e))?;
    }
    writer.flush().map_err(|e| TableError::io(path, e))?;

    Ok(sheet.rows.len())
}

fn ensure_parent(path: &Path) -> Result<(), TableError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| TableError::io(dir, e))
        }
        _ => Ok(()),
    }
}
