//! Region sampler
//!
//! One invocation inspects a single region: keeps the running instances,
//! computes fractional uptime and accrued cost, summarizes by instance type,
//! and derives the billing snapshots the store persists. Instances whose
//! type has no known rate stay in the listing with zero cost but are
//! excluded from cost totals and snapshots.

use crate::error::Result;
use crate::pricing::PricingTable;
use crate::provider::{InstanceProvider, ProviderInstance};
use crate::snapshot::BillingSnapshot;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::warn;

/// One observed running instance, ephemeral to the current pass
#[derive(Debug, Clone)]
pub struct InstanceSample {
    pub id: String,
    pub instance_type: String,
    pub region: String,
    pub availability_zone: String,
    pub state: String,
    /// Rendered `key:value` pairs joined by spaces
    pub tags: String,
    pub hours_up: f64,
    pub cost: f64,
    pub owner_profile: Option<String>,
}

/// Aggregate usage for one instance type within a region
#[derive(Debug, Clone, Default)]
pub struct TypeSummary {
    pub instance_type: String,
    pub instance_count: usize,
    pub total_hours: f64,
    pub cost: f64,
}

/// One sampling pass's output for a single region
#[derive(Debug, Clone)]
pub struct RegionAggregate {
    pub region: String,
    pub instances: Vec<InstanceSample>,
    pub cost: f64,
    pub type_summary: BTreeMap<String, TypeSummary>,
    pub snapshots: Vec<BillingSnapshot>,
}

fn hours_since(launch_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match launch_time {
        Some(lt) => {
            let duration = now.signed_duration_since(lt);
            duration.num_seconds().max(0) as f64 / 3600.0
        }
        None => 0.0,
    }
}

fn render_tags(tags: &[(String, String)]) -> String {
    tags.iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sample one region: list instances, keep running ones, compute uptime and
/// cost estimates, and build the derived summaries.
pub async fn sample_region<P: InstanceProvider + ?Sized>(
    provider: &P,
    region: &str,
    pricing: &PricingTable,
    now: DateTime<Utc>,
) -> Result<RegionAggregate> {
    let reported = provider.list_instances(region).await?;
    Ok(aggregate_region(region, reported, pricing, now))
}

/// Fold provider-reported instances into a `RegionAggregate`.
///
/// Split from `sample_region` so the math is testable without a provider.
pub fn aggregate_region(
    region: &str,
    reported: Vec<ProviderInstance>,
    pricing: &PricingTable,
    now: DateTime<Utc>,
) -> RegionAggregate {
    let mut instances = Vec::new();
    for inst in reported {
        if inst.state != "running" {
            continue;
        }
        let hours_up = hours_since(inst.launch_time, now);
        let cost = match pricing.rate(&inst.instance_type) {
            Ok(rate) => rate * hours_up,
            Err(e) => {
                warn!(
                    "Skipping cost for instance {} in {}: {}",
                    inst.id, region, e
                );
                0.0
            }
        };
        instances.push(InstanceSample {
            id: inst.id,
            instance_type: inst.instance_type,
            region: region.to_string(),
            availability_zone: inst.availability_zone,
            state: inst.state,
            tags: render_tags(&inst.tags),
            hours_up,
            cost,
            owner_profile: inst.owner_profile,
        });
    }

    // Longest-running first; presentational only
    instances.sort_by(|a, b| {
        b.hours_up
            .partial_cmp(&a.hours_up)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cost: f64 = instances
        .iter()
        .filter(|i| pricing.contains(&i.instance_type))
        .map(|i| i.cost)
        .sum();
    let type_summary = summarize_types(&instances, pricing);
    let snapshots = build_snapshots(&instances, pricing);

    RegionAggregate {
        region: region.to_string(),
        instances,
        cost,
        type_summary,
        snapshots,
    }
}

/// Aggregate per-type counts, hours, and cost across a region's samples.
/// Unpriced types keep their count and hours; their cost stays zero.
pub fn summarize_types(
    instances: &[InstanceSample],
    pricing: &PricingTable,
) -> BTreeMap<String, TypeSummary> {
    let mut summary: BTreeMap<String, TypeSummary> = BTreeMap::new();
    for inst in instances {
        let entry = summary
            .entry(inst.instance_type.clone())
            .or_insert_with(|| TypeSummary {
                instance_type: inst.instance_type.clone(),
                ..Default::default()
            });
        entry.instance_count += 1;
        entry.total_hours += inst.hours_up;
        if pricing.contains(&inst.instance_type) {
            entry.cost += inst.cost;
        }
    }
    summary
}

/// Derive the persisted form of each priced sample
pub fn build_snapshots(
    instances: &[InstanceSample],
    pricing: &PricingTable,
) -> Vec<BillingSnapshot> {
    let mut snapshots = Vec::new();
    for inst in instances {
        let rate = match pricing.rate(&inst.instance_type) {
            Ok(rate) => rate,
            Err(e) => {
                warn!("Skipping snapshot for instance {}: {}", inst.id, e);
                continue;
            }
        };
        snapshots.push(BillingSnapshot {
            id: inst.id.clone(),
            instance_type: inst.instance_type.clone(),
            region: inst.region.clone(),
            availability_zone: inst.availability_zone.clone(),
            state: inst.state.clone(),
            tags: inst.tags.clone(),
            hours_up: inst.hours_up,
            cost_per_hour: rate,
            current_cost: inst.cost,
            owner_profile: inst.owner_profile.clone(),
        });
    }
    snapshots
}
