//! Provider client boundary
//!
//! `InstanceProvider` is the seam between the sampling pipeline and the cloud
//! API. The EC2 implementation lives here; tests substitute an in-memory
//! provider. Listing failures propagate as `CostwatchError::Provider` and are
//! fatal to the enclosing pass.

use crate::error::{CostwatchError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::Client as Ec2Client;
use chrono::{DateTime, Utc};

/// One instance as reported by the provider, all lifecycle states included
#[derive(Debug, Clone)]
pub struct ProviderInstance {
    pub id: String,
    pub instance_type: String,
    pub launch_time: Option<DateTime<Utc>>,
    pub availability_zone: String,
    pub state: String,
    pub tags: Vec<(String, String)>,
    /// IAM instance profile ARN when one is attached
    pub owner_profile: Option<String>,
}

/// Trait abstracting region and instance listing
#[async_trait]
pub trait InstanceProvider: Send + Sync {
    /// All regions available to the account
    async fn list_regions(&self) -> Result<Vec<String>>;

    /// All instances in a region, regardless of lifecycle state.
    /// The sampler filters to running instances.
    async fn list_instances(&self, region: &str) -> Result<Vec<ProviderInstance>>;
}

/// EC2-backed provider using the shared AWS config chain
pub struct Ec2Provider {
    base_config: aws_config::SdkConfig,
}

impl Ec2Provider {
    pub async fn new() -> Self {
        let base_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self { base_config }
    }

    fn client_for(&self, region: &str) -> Ec2Client {
        let config = aws_sdk_ec2::config::Builder::from(&self.base_config)
            .region(Region::new(region.to_string()))
            .build();
        Ec2Client::from_conf(config)
    }
}

#[async_trait]
impl InstanceProvider for Ec2Provider {
    async fn list_regions(&self) -> Result<Vec<String>> {
        let client = Ec2Client::new(&self.base_config);
        let response = client
            .describe_regions()
            .send()
            .await
            .map_err(|e| CostwatchError::Provider {
                region: "global".to_string(),
                message: format!("Failed to list regions: {}", e),
            })?;

        let mut regions: Vec<String> = response
            .regions()
            .iter()
            .filter_map(|r| r.region_name().map(|n| n.to_string()))
            .collect();
        regions.sort();
        Ok(regions)
    }

    async fn list_instances(&self, region: &str) -> Result<Vec<ProviderInstance>> {
        let client = self.client_for(region);
        let response = client
            .describe_instances()
            .send()
            .await
            .map_err(|e| CostwatchError::Provider {
                region: region.to_string(),
                message: format!("Failed to list EC2 instances: {}", e),
            })?;

        let mut instances = Vec::new();
        for reservation in response.reservations() {
            for instance in reservation.instances() {
                let id = match instance.instance_id() {
                    Some(id) => id.to_string(),
                    None => continue,
                };
                let instance_type = instance
                    .instance_type()
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let state = instance
                    .state()
                    .and_then(|s| s.name())
                    .map(|n| n.as_str().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let launch_time = instance
                    .launch_time()
                    .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), 0));
                let availability_zone = instance
                    .placement()
                    .and_then(|p| p.availability_zone())
                    .unwrap_or_default()
                    .to_string();

                let mut tags = Vec::new();
                for tag in instance.tags() {
                    if let (Some(key), Some(value)) = (tag.key(), tag.value()) {
                        tags.push((key.to_string(), value.to_string()));
                    }
                }

                let owner_profile = instance
                    .iam_instance_profile()
                    .and_then(|p| p.arn())
                    .map(|a| a.to_string());

                instances.push(ProviderInstance {
                    id,
                    instance_type,
                    launch_time,
                    availability_zone,
                    state,
                    tags,
                    owner_profile,
                });
            }
        }
        Ok(instances)
    }
}
