//! Sampling orchestrator
//!
//! Fans one sampler task out per region and fans the results back in through
//! a bounded channel with a single consumer. The channel is the only
//! synchronization point: producers never read it, and its small capacity
//! applies backpressure against a slow consumer. Completion ordering is
//! join-producers, close-channel, then drain-consumer, so a pass can never
//! report a partial total.
//!
//! Any provider failure in any region is fatal to the whole pass: a partial,
//! under-counted snapshot must never be persisted.

use crate::error::{CostwatchError, Result};
use crate::pricing::PricingTable;
use crate::provider::InstanceProvider;
use crate::sampler::{sample_region, RegionAggregate};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Channel capacity; independent of the number of regions since the single
/// consumer drains continuously.
const RESULT_CHANNEL_CAPACITY: usize = 3;

/// Everything one sampling pass produced
#[derive(Debug)]
pub struct PassSummary {
    pub aggregates: Vec<RegionAggregate>,
    pub total_cost: f64,
}

/// Run one sampling pass over the requested region, or over every region the
/// provider reports when none is given.
pub async fn run_pass<P>(
    provider: Arc<P>,
    pricing: Arc<PricingTable>,
    region: Option<String>,
) -> Result<PassSummary>
where
    P: InstanceProvider + ?Sized + 'static,
{
    let regions = match region {
        Some(r) => vec![r],
        None => provider.list_regions().await?,
    };
    info!("Sampling {} regions: {:?}", regions.len(), regions);

    let expected = regions.len();
    let as_of = Utc::now();
    let (tx, mut rx) = mpsc::channel::<RegionAggregate>(RESULT_CHANNEL_CAPACITY);

    // Single consumer drains the channel until every sender is gone
    let consumer = tokio::spawn(async move {
        let mut aggregates = Vec::new();
        let mut total_cost = 0.0;
        while let Some(aggregate) = rx.recv().await {
            total_cost += aggregate.cost;
            aggregates.push(aggregate);
        }
        (aggregates, total_cost)
    });

    // One producer per region
    let mut producers = Vec::with_capacity(expected);
    for region in regions {
        let provider = Arc::clone(&provider);
        let pricing = Arc::clone(&pricing);
        let tx = tx.clone();
        producers.push((
            region.clone(),
            tokio::spawn(async move {
                debug!("Processing region {}", region);
                let aggregate = sample_region(provider.as_ref(), &region, &pricing, as_of).await?;
                debug!("Completed processing region {}", region);
                tx.send(aggregate).await.map_err(|_| CostwatchError::Provider {
                    region: region.clone(),
                    message: "Result channel closed before pass completed".to_string(),
                })
            }),
        ));
    }
    // The producers hold the remaining senders; dropping ours lets the
    // channel close once they all finish.
    drop(tx);

    let mut first_error: Option<CostwatchError> = None;
    for (region, handle) in producers {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(join_err) => {
                if first_error.is_none() {
                    first_error = Some(CostwatchError::Provider {
                        region,
                        message: format!("Sampler task failed: {}", join_err),
                    });
                }
            }
        }
    }

    // All senders are dropped by now, so the consumer terminates
    let (aggregates, total_cost) = consumer.await.map_err(|e| CostwatchError::Provider {
        region: "all".to_string(),
        message: format!("Aggregation task failed: {}", e),
    })?;

    if let Some(e) = first_error {
        return Err(e);
    }
    if aggregates.len() != expected {
        return Err(CostwatchError::IncompletePass {
            expected,
            received: aggregates.len(),
        });
    }

    Ok(PassSummary {
        aggregates,
        total_cost,
    })
}
