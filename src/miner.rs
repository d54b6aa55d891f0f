//! Boundary between compute engines and the stratum session
//!
//! Engines poll [`StratumMiner::has_work`], draw work with
//! [`StratumMiner::get_work`] and report every candidate index set through
//! [`StratumMiner::handle_solution`]. Verification runs on the caller's
//! thread; only verified shares reach the session.

use crate::core::{WorkDescriptor, WorkState};
use crate::crypto::MIDSTATE_LEN;
use crate::equihash::{Share, SolutionVerifier};
use crate::stratum::SubmitHandle;
use std::sync::Arc;
use tracing::{info, warn};

/// Work source and share sink for compute engines
#[derive(Debug, Clone)]
pub struct StratumMiner {
    work: Arc<WorkState>,
    verifier: SolutionVerifier,
    submit: SubmitHandle,
}

impl StratumMiner {
    /// Create a miner over the session's work state and submit queue
    pub fn new(work: Arc<WorkState>, submit: SubmitHandle) -> Self {
        Self {
            work,
            verifier: SolutionVerifier::new(),
            submit,
        }
    }

    /// Whether a job is available
    pub fn has_work(&self) -> bool {
        self.work.has_job()
    }

    /// Issue work for one engine call; fills `midstate` with the job's
    /// BLAKE2b state
    pub fn get_work(&self, midstate: &mut [u8; MIDSTATE_LEN]) -> WorkDescriptor {
        self.work.issue_work(midstate)
    }

    /// Verify a candidate and submit it if it is a share.
    ///
    /// Returns the submitted share, or `None` if the candidate was stale,
    /// missed the target or could not be queued.
    pub fn handle_solution(&self, indices: &[u32], work: &WorkDescriptor) -> Option<Share> {
        let snapshot = self.work.snapshot();
        let share = self.verifier.check(indices, work, &snapshot)?;

        if let Err(e) = self.submit.submit(
            &share.job_id,
            &share.time,
            &share.client_nonce,
            &share.solution,
        ) {
            warn!(job_id = %share.job_id, error = %e, "Failed to queue share");
            return None;
        }

        info!(job_id = %share.job_id, nonce = work.nonce, "Submitting share");
        Some(share)
    }
}
