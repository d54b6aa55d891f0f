//! Simulation worker for testing and development
//!
//! Produces random index sets at a fixed interval and pushes them through
//! the normal verify-and-submit path. Useful for checking a pool connection
//! without a solver; with real targets almost nothing it finds is a share.

use super::{mining_span, MiningStats, MiningWorker};
use crate::core::constants::{COLLISION_BIT_LENGTH, SOLUTION_INDICES};
use crate::crypto::MIDSTATE_LEN;
use crate::miner::StratumMiner;
use crate::Result;
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Instrument};

/// Simulation worker that mimics a solver without computing anything
pub struct SimulationWorker {
    interval: Duration,
    stats: MiningStats,
}

impl SimulationWorker {
    /// Create a worker producing one candidate per `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            stats: MiningStats::default(),
        }
    }

    fn random_indices() -> Vec<u32> {
        let mut rng = rand::rng();
        let limit = 1u32 << (COLLISION_BIT_LENGTH + 1);
        (0..SOLUTION_INDICES).map(|_| rng.random_range(0..limit)).collect()
    }

    fn attempt(&mut self, miner: &StratumMiner) {
        if !miner.has_work() {
            return;
        }

        let mut midstate = [0u8; MIDSTATE_LEN];
        let work = miner.get_work(&mut midstate);
        self.stats.attempts += 1;

        let indices = Self::random_indices();
        self.stats.candidates += 1;
        if miner.handle_solution(&indices, &work).is_some() {
            self.stats.shares_found += 1;
            info!(
                job_id = %work.job_id,
                shares = self.stats.shares_found,
                "Simulation found a share"
            );
        } else {
            debug!(job_id = %work.job_id, nonce = work.nonce, "Simulated candidate missed");
        }
    }
}

#[async_trait]
impl MiningWorker for SimulationWorker {
    fn worker_type(&self) -> &'static str {
        "simulation"
    }

    async fn mine(&mut self, miner: Arc<StratumMiner>, cancellation: CancellationToken) -> Result<()> {
        let span = mining_span(self.worker_type());
        async {
            info!(interval = ?self.interval, "Starting simulation worker");
            self.stats = MiningStats::default();

            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => self.attempt(&miner),
                    _ = cancellation.cancelled() => break,
                }
            }

            info!(
                attempts = self.stats.attempts,
                shares = self.stats.shares_found,
                "Simulation worker stopped"
            );
            Ok(())
        }
        .instrument(span)
        .await
    }

    fn stats(&self) -> MiningStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Target, WorkState};
    use crate::stratum::SubmitHandle;

    #[test]
    fn test_random_indices_fit_bit_length() {
        let indices = SimulationWorker::random_indices();
        assert_eq!(indices.len(), 32);
        assert!(indices.iter().all(|&i| i < (1 << 26)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idles_without_work() {
        let work = Arc::new(WorkState::new());
        let (submit, _rx) = SubmitHandle::detached("bob");
        let miner = Arc::new(StratumMiner::new(work, submit));

        let mut worker = SimulationWorker::new(Duration::from_millis(10));
        let cancellation = CancellationToken::new();
        let stopper = cancellation.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            stopper.cancel();
        });

        worker.mine(miner, cancellation).await.unwrap();
        assert_eq!(worker.stats().attempts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submits_shares_against_max_target() {
        let work = Arc::new(WorkState::new());
        work.set_job(vec![0; 108], vec![0; 4], "5d000000", "sim").unwrap();
        work.set_target(Target::from_bytes([0xFF; 32]));
        let (submit, mut rx) = SubmitHandle::detached("bob");
        let miner = Arc::new(StratumMiner::new(work, submit));

        let mut worker = SimulationWorker::new(Duration::from_millis(10));
        let cancellation = CancellationToken::new();
        let stopper = cancellation.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(55)).await;
            stopper.cancel();
        });

        worker.mine(miner, cancellation).await.unwrap();

        let stats = worker.stats();
        assert!(stats.attempts >= 5);
        assert_eq!(stats.attempts, stats.shares_found);

        let mut queued = 0;
        while let Ok(line) = rx.try_recv() {
            assert!(line.starts_with(r#"{"id":4,"method":"mining.submit","params":["bob","sim","5d000000""#));
            queued += 1;
        }
        assert_eq!(queued, stats.shares_found);
    }
}
