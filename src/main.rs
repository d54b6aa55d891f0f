//! ZelHash Miner - Main Application
//!
//! Connects to the pool, keeps work state current and runs the selected
//! built-in worker until interrupted or the pool refuses the worker.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use zelhash_miner::{
    config::Config,
    logging::init_logging,
    stratum::{ShareStats, StratumClient, TcpConnector},
    worker::WorkerFactory,
    Result, StratumMiner, WorkState, APP_DESCRIPTION, APP_NAME, APP_VERSION,
};

use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Handle special commands
    if config.info {
        print_info();
        return Ok(());
    }

    let config = config.resolve().await?;
    init_logging(config.effective_log_level(), config.log_json);

    if config.print_config {
        print_configuration(&config)?;
        return Ok(());
    }

    run(config).await
}

async fn run(config: Config) -> Result<()> {
    let address = config.pool_address()?;
    info!("Starting {} v{}", APP_NAME, APP_VERSION);
    info!(
        pool = %address,
        user = %config.user(),
        worker = %config.worker(),
        "Configuration"
    );

    let work = Arc::new(WorkState::new());
    let stats = Arc::new(ShareStats::new());
    let client = StratumClient::new(
        TcpConnector::new(address),
        config.session_config()?,
        Arc::clone(&work),
        Arc::clone(&stats),
    );
    let miner = Arc::new(StratumMiner::new(Arc::clone(&work), client.submit_handle()));

    let cancellation = CancellationToken::new();
    let worker_handle = WorkerFactory::create(config.worker(), config.simulation_interval()?)
        .map(|mut worker| {
            let miner = Arc::clone(&miner);
            let cancellation = cancellation.clone();
            tokio::spawn(async move { worker.mine(miner, cancellation).await })
        });

    let result = tokio::select! {
        result = client.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    };

    cancellation.cancel();
    if let Some(handle) = worker_handle {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Worker stopped with an error"),
            Err(e) => error!(error = %e, "Worker task failed"),
        }
    }

    info!(
        accepted = stats.accepted(),
        rejected = stats.rejected(),
        uptime = %stats.uptime_display(),
        "Final share statistics"
    );

    if let Err(e) = &result {
        error!(error = %e, "Stopping");
    }
    result
}

/// Print basic program information
fn print_info() {
    println!("{} v{}", APP_NAME, APP_VERSION);
    println!("{}", APP_DESCRIPTION);
}

/// Print current configuration
fn print_configuration(config: &Config) -> Result<()> {
    let config_yaml = serde_yaml::to_string(config)?;
    println!("{}", config_yaml);
    Ok(())
}
