//! Report engine
//!
//! Reduces one day's hour-bucketed snapshots into a cost/usage summary per
//! region and instance type. Every recorded hourly sample counts as exactly
//! one billable hour at the type's current rate, independent of the
//! instance's fractional uptime at sample time; an instance seen in five
//! different hours contributes five hours but one unique instance.

use crate::pricing::PricingTable;
use crate::snapshot::{DailySeries, DayRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

/// Usage bucket for one instance type within a region
#[derive(Debug, Clone, Default)]
pub struct ClassUsage {
    pub instance_type: String,
    /// Count of hourly samples, not wall-clock uptime
    pub hours: u64,
    pub cost: f64,
    pub unique_instances: BTreeSet<String>,
}

/// Summary for one region across the day
#[derive(Debug, Clone, Default)]
pub struct RegionReport {
    pub region: String,
    pub cost: f64,
    pub classes: BTreeMap<String, ClassUsage>,
}

/// Cost/usage summary derived from one day's snapshots
#[derive(Debug, Clone)]
pub struct DailyReport {
    pub date: String,
    pub cost: f64,
    pub regions: BTreeMap<String, RegionReport>,
}

/// Fold a day record into a report.
///
/// Deterministic: the containers iterate in key order, so the same input
/// structure always reduces to the same report. An instance type with no
/// known rate contributes its hours and identities but zero cost.
pub fn reduce(date: &str, day: &DayRecord, pricing: &PricingTable) -> DailyReport {
    let mut regions: BTreeMap<String, RegionReport> = BTreeMap::new();

    for hour_record in day.0.values() {
        for (region, region_record) in &hour_record.0 {
            let region_report = regions
                .entry(region.clone())
                .or_insert_with(|| RegionReport {
                    region: region.clone(),
                    ..Default::default()
                });
            for snapshot in region_record.0.values() {
                let class = region_report
                    .classes
                    .entry(snapshot.instance_type.clone())
                    .or_insert_with(|| ClassUsage {
                        instance_type: snapshot.instance_type.clone(),
                        ..Default::default()
                    });
                class.hours += 1;
                class.unique_instances.insert(snapshot.id.clone());
                match pricing.rate(&snapshot.instance_type) {
                    Ok(rate) => class.cost = class.hours as f64 * rate,
                    Err(e) => warn!("Unpriced instance type in {} report: {}", date, e),
                }
            }
        }
    }

    for region_report in regions.values_mut() {
        region_report.cost = region_report.classes.values().map(|c| c.cost).sum();
    }
    let cost = regions.values().map(|r| r.cost).sum();

    DailyReport {
        date: date.to_string(),
        cost,
        regions,
    }
}

/// Reduce every day recorded in a file (normally exactly one)
pub fn reduce_series(series: &DailySeries, pricing: &PricingTable) -> Vec<DailyReport> {
    series
        .0
        .iter()
        .map(|(date, day)| reduce(date, day, pricing))
        .collect()
}

impl DailyReport {
    /// Render regions sorted by descending cost, omitting zero-cost regions.
    /// The computed totals always include every region; only the rendering
    /// filters.
    pub fn format_by_cost(&self) -> String {
        let mut s = format!("{}, Cost:{:.2}", self.date, self.cost);

        let mut regions: Vec<&RegionReport> =
            self.regions.values().filter(|r| r.cost > 0.0).collect();
        regions.sort_by(|a, b| b.cost.partial_cmp(&a.cost).unwrap_or(std::cmp::Ordering::Equal));

        for region in regions {
            s.push_str(&format!("\n\t{}, Cost: {:.2}", region.region, region.cost));
            for class in region.classes.values() {
                s.push_str(&format!(
                    "\n\t\t{}: Cost: {:.2}, Hours:{}, UniqueInstances:{}",
                    class.instance_type,
                    class.cost,
                    class.hours,
                    class.unique_instances.len()
                ));
            }
        }
        s
    }
}

impl fmt::Display for DailyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Cost:{:.2}", self.date, self.cost)?;
        for region in self.regions.values() {
            write!(f, "\n\t{}, Cost: {:.2}", region.region, region.cost)?;
            for class in region.classes.values() {
                write!(
                    f,
                    "\n\t\t{}: Cost: {:.2}, Hours:{}",
                    class.instance_type, class.cost, class.hours
                )?;
            }
        }
        Ok(())
    }
}
