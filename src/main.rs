use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use costwatch::config::{self, Config};
use costwatch::display::display_pass;
use costwatch::email::email_report;
use costwatch::export::export_reports;
use costwatch::orchestrator::run_pass;
use costwatch::pricing::PricingTable;
use costwatch::provider::Ec2Provider;
use costwatch::report::{reduce_series, DailyReport};
use costwatch::{snapshot, watch};

#[derive(Parser)]
#[command(name = "costwatch")]
#[command(
    about = "Samples EC2 usage and creates reports of usage and costs",
    long_about = "costwatch samples EC2 usage for scenarios where users lack rights to see billing information from AWS.\n\nA sampling pass inspects all regions concurrently and records usage at that point in time. The recorded samples are reduced into daily reports of usage and estimated cost, which can be printed, emailed, or exported."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sampling pass and record the snapshots
    Sample {
        /// Restrict to a single region (default: all regions)
        #[arg(short, long)]
        region: Option<String>,
    },
    /// Sample periodically, recording usage at each interval
    Watch {
        /// Restrict to a single region (default: all regions)
        #[arg(short, long)]
        region: Option<String>,
        /// Seconds between sampling passes
        #[arg(long, default_value = "3600")]
        interval: u64,
    },
    /// Reduce stored snapshots into daily cost reports
    Report {
        /// Only the most recent N days
        #[arg(long)]
        days: Option<usize>,
    },
    /// Email the daily cost reports
    Email,
    /// Export reports to a spreadsheet-friendly format
    Export {
        /// Export format (csv, html)
        #[arg(long, default_value = "csv")]
        format: String,
        /// Output file (stdout when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Only the most recent N days
        #[arg(long)]
        days: Option<usize>,
    },
    /// Write a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".costwatch.toml")]
        output: PathBuf,
    },
}

/// Read stored day files (newest first) and reduce them into reports
fn load_reports(config: &Config, days: Option<usize>) -> Result<Vec<DailyReport>> {
    let pricing = PricingTable::default();
    let files = snapshot::list_snapshot_files(&config.billing.data_dir)?;
    let limit = days.unwrap_or(files.len());

    let mut reports = Vec::new();
    for path in files.iter().take(limit) {
        let series = snapshot::read_daily(path)?;
        reports.extend(reduce_series(&series, &pricing));
    }
    Ok(reports)
}

async fn run_sample(config: &Config, region: Option<String>) -> Result<()> {
    let provider = Arc::new(Ec2Provider::new().await);
    let pricing = Arc::new(PricingTable::default());
    let region = region.or_else(|| config.aws.region.clone());

    let summary = run_pass(provider, pricing, region).await?;
    display_pass(&summary);
    let path = snapshot::merge(&summary.aggregates, &config.billing.data_dir, chrono::Utc::now())?;
    println!("Recorded snapshots to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging - suppress INFO by default, only show warnings and errors
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config
    let config = Config::load(cli.config.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Sample { region } => {
            run_sample(&config, region).await?;
        }
        Commands::Watch { region, interval } => {
            let provider = Arc::new(Ec2Provider::new().await);
            let pricing = Arc::new(PricingTable::default());
            let region = region.or_else(|| config.aws.region.clone());
            watch::watch(provider, pricing, &config, region, interval).await?;
        }
        Commands::Report { days } => {
            let reports = load_reports(&config, days)?;
            for report in &reports {
                println!("{}", report.format_by_cost());
            }
        }
        Commands::Email => {
            let Some(email) = config.email.as_ref() else {
                bail!("No [email] section in config; run `costwatch init` and fill in sender/recipient");
            };
            let reports = load_reports(&config, None)?;
            email_report(&reports, email).await?;
        }
        Commands::Export { format, file, days } => {
            let reports = load_reports(&config, days)?;
            export_reports(&reports, &format, file.as_deref())?;
        }
        Commands::Init { output } => {
            config::init_config(&output)?;
        }
    }

    Ok(())
}
