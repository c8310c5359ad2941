//! Shared test fixtures: an in-memory `InstanceProvider`

#![allow(dead_code)] // Not every test binary uses every fixture

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use costwatch::error::{CostwatchError, Result};
use costwatch::provider::{InstanceProvider, ProviderInstance};
use std::collections::BTreeMap;

/// Provider serving canned instance listings per region, with optional
/// per-region delays (to vary producer completion order) and injected
/// failures.
#[derive(Default)]
pub struct StaticProvider {
    pub regions: BTreeMap<String, Vec<ProviderInstance>>,
    pub delays_ms: BTreeMap<String, u64>,
    pub fail_region_listing: bool,
    pub fail_region: Option<String>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: &str, instances: Vec<ProviderInstance>) -> Self {
        self.regions.insert(region.to_string(), instances);
        self
    }

    pub fn with_delay(mut self, region: &str, millis: u64) -> Self {
        self.delays_ms.insert(region.to_string(), millis);
        self
    }
}

#[async_trait]
impl InstanceProvider for StaticProvider {
    async fn list_regions(&self) -> Result<Vec<String>> {
        if self.fail_region_listing {
            return Err(CostwatchError::Provider {
                region: "global".to_string(),
                message: "injected region listing failure".to_string(),
            });
        }
        Ok(self.regions.keys().cloned().collect())
    }

    async fn list_instances(&self, region: &str) -> Result<Vec<ProviderInstance>> {
        if let Some(millis) = self.delays_ms.get(region) {
            tokio::time::sleep(tokio::time::Duration::from_millis(*millis)).await;
        }
        if self.fail_region.as_deref() == Some(region) {
            return Err(CostwatchError::Provider {
                region: region.to_string(),
                message: "injected instance listing failure".to_string(),
            });
        }
        self.regions
            .get(region)
            .cloned()
            .ok_or_else(|| CostwatchError::Provider {
                region: region.to_string(),
                message: "unknown region".to_string(),
            })
    }
}

pub fn instance(
    id: &str,
    instance_type: &str,
    state: &str,
    launch_time: Option<DateTime<Utc>>,
) -> ProviderInstance {
    ProviderInstance {
        id: id.to_string(),
        instance_type: instance_type.to_string(),
        launch_time,
        availability_zone: "zone-a".to_string(),
        state: state.to_string(),
        tags: vec![("Name".to_string(), id.to_string())],
        owner_profile: None,
    }
}

pub fn running_for_hours(id: &str, instance_type: &str, hours: i64) -> ProviderInstance {
    instance(
        id,
        instance_type,
        "running",
        Some(Utc::now() - Duration::hours(hours)),
    )
}
