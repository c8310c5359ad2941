//! Periodic sampling mode

use crate::config::Config;
use crate::display::display_pass;
use crate::error::Result;
use crate::orchestrator::run_pass;
use crate::pricing::PricingTable;
use crate::provider::InstanceProvider;
use crate::snapshot;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Run sampling passes forever, persisting each one, sleeping `interval`
/// seconds between passes. A provider or storage failure aborts the loop;
/// the process exits non-zero rather than recording a partial pass.
pub async fn watch<P>(
    provider: Arc<P>,
    pricing: Arc<PricingTable>,
    config: &Config,
    region: Option<String>,
    interval: u64,
) -> Result<()>
where
    P: InstanceProvider + ?Sized + 'static,
{
    loop {
        println!(
            "Sampling at {} | refreshing every {}s | [Ctrl+C] to stop",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            interval
        );

        let summary = run_pass(Arc::clone(&provider), Arc::clone(&pricing), region.clone()).await?;
        display_pass(&summary);
        let path = snapshot::merge(&summary.aggregates, &config.billing.data_dir, Utc::now())?;
        info!("Recorded snapshots to {}", path.display());

        tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
    }
}
