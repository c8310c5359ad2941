//! Billing snapshot store
//!
//! One JSON file per calendar day, named `YYYY-MM-DD.json` under the billing
//! data directory. The file schema is a nested mapping
//! `{date: {hour: {region: {instance_id: snapshot}}}}`, kept self-describing
//! so day files stay human-inspectable and diffable.
//!
//! Writes are read-modify-write over the whole day's structure: merging a new
//! hour must never drop entries already recorded for other hours of the same
//! day. The updated file replaces the old one via temp-file-then-rename, so a
//! crash mid-write cannot leave a torn file behind. Single-writer per
//! process invocation; there is no cross-process locking.

use crate::error::{CostwatchError, Result};
use crate::sampler::RegionAggregate;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One recorded observation of an instance's billing-relevant attributes.
/// Immutable once written; a later pass for the same instance replaces the
/// entry for its (day, hour) slot only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSnapshot {
    pub id: String,
    pub instance_type: String,
    pub region: String,
    pub availability_zone: String,
    pub state: String,
    pub tags: String,
    pub hours_up: f64,
    pub cost_per_hour: f64,
    pub current_cost: f64,
    pub owner_profile: Option<String>,
}

/// Full contents of one day file: date -> day record.
/// Normally holds exactly one date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySeries(pub BTreeMap<String, DayRecord>);

/// All snapshots recorded for one calendar day, keyed by hour-of-day (0-23)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayRecord(pub BTreeMap<u8, HourRecord>);

/// Snapshots for one hour, keyed by region
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourRecord(pub BTreeMap<String, RegionRecord>);

/// Snapshots for one region within an hour, keyed by instance id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionRecord(pub BTreeMap<String, BillingSnapshot>);

impl DailySeries {
    pub fn day(&self, date: &str) -> Option<&DayRecord> {
        self.0.get(date)
    }

    pub fn day_mut(&mut self, date: &str) -> &mut DayRecord {
        self.0.entry(date.to_string()).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl DayRecord {
    /// Merge one hour's region-keyed snapshots into the day.
    ///
    /// Operates on the whole-day structure by construction: only the given
    /// hour slot is touched, and within it instances union per region with
    /// last-write-wins per instance id.
    pub fn merge_hour<I>(&mut self, hour: u8, regions: I)
    where
        I: IntoIterator<Item = (String, Vec<BillingSnapshot>)>,
    {
        let hour_record = self.0.entry(hour).or_default();
        for (region, snapshots) in regions {
            let region_record = hour_record.0.entry(region).or_default();
            for snap in snapshots {
                region_record.0.insert(snap.id.clone(), snap);
            }
        }
    }

    pub fn hour(&self, hour: u8) -> Option<&HourRecord> {
        self.0.get(&hour)
    }
}

/// Path of the day file for a given date key
pub fn snapshot_path(dir: &Path, date: &str) -> PathBuf {
    dir.join(format!("{}.json", date))
}

/// Date key (`YYYY-MM-DD`) and hour-of-day slot for a sampling time
pub fn day_and_hour(as_of: DateTime<Utc>) -> (String, u8) {
    (as_of.format("%Y-%m-%d").to_string(), as_of.hour() as u8)
}

/// Read a day file. A missing file is an empty structure, not an error;
/// unparseable content is fatal.
pub fn read_daily(path: &Path) -> Result<DailySeries> {
    if !path.exists() {
        return Ok(DailySeries::default());
    }
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(DailySeries::default());
    }
    serde_json::from_str(&contents).map_err(|e| CostwatchError::Storage {
        path: path.to_path_buf(),
        message: format!("Malformed snapshot file: {}", e),
    })
}

/// Atomically replace a day file: write to a temp file in the same
/// directory, then rename over the target.
fn write_daily(path: &Path, series: &DailySeries) -> Result<()> {
    let json = serde_json::to_string_pretty(series)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path).map_err(|e| CostwatchError::Storage {
        path: path.to_path_buf(),
        message: format!("Failed to replace snapshot file: {}", e),
    })
}

/// Merge a pass's region aggregates into the day file for `as_of`.
///
/// Read-modify-write over the whole day: previously recorded hours are
/// carried forward untouched. Returns the day file path.
pub fn merge(aggregates: &[RegionAggregate], dir: &Path, as_of: DateTime<Utc>) -> Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }

    let (date, hour) = day_and_hour(as_of);
    let path = snapshot_path(dir, &date);
    let mut series = read_daily(&path)?;

    let payload = aggregates
        .iter()
        .map(|a| (a.region.clone(), a.snapshots.clone()));
    series.day_mut(&date).merge_hour(hour, payload);

    write_daily(&path, &series)?;
    Ok(path)
}

/// Day files under the billing directory, most recent first.
/// Names are `YYYY-MM-DD.json`, so reverse-lexicographic order is
/// reverse-chronological.
pub fn list_snapshot_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(CostwatchError::Storage {
            path: dir.to_path_buf(),
            message: "Billing directory does not exist".to_string(),
        });
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(files)
}
