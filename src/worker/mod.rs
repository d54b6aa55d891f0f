//! Compute engine workers
//!
//! The real Equihash solver runs outside this crate. Workers here drive the
//! [`StratumMiner`] boundary the same way such an engine would.

use crate::config::WorkerType;
use crate::miner::StratumMiner;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Span;

pub mod simulation;

pub use simulation::SimulationWorker;

/// Counters kept by a worker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiningStats {
    /// Work units drawn from the miner
    pub attempts: u64,
    /// Candidate index sets handed to the verifier
    pub candidates: u64,
    /// Candidates that became shares
    pub shares_found: u64,
}

/// Mining worker trait
///
/// Workers pull work from the miner until the cancellation token fires.
#[async_trait]
pub trait MiningWorker: Send + Sync {
    /// Get the worker type name for logging
    fn worker_type(&self) -> &'static str;

    /// Mine until cancelled
    async fn mine(&mut self, miner: Arc<StratumMiner>, cancellation: CancellationToken)
        -> Result<()>;

    /// Get current mining statistics
    fn stats(&self) -> MiningStats {
        MiningStats::default()
    }
}

/// Worker factory for creating mining workers
pub struct WorkerFactory;

impl WorkerFactory {
    /// Create the worker for `worker_type`, if it has one
    pub fn create(
        worker_type: WorkerType,
        simulation_interval: Duration,
    ) -> Option<Box<dyn MiningWorker>> {
        match worker_type {
            WorkerType::None => None,
            WorkerType::Simulation => Some(Box::new(SimulationWorker::new(simulation_interval))),
        }
    }
}

/// Create a tracing span for mining operations
pub fn mining_span(worker_type: &str) -> Span {
    tracing::info_span!("mining", worker_type = worker_type)
}
