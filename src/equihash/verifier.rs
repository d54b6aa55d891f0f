//! Share verification against the current job and target
//!
//! A candidate index set from the compute engine becomes a share only if it
//! belongs to the current job and the double SHA-256 of the full block
//! (header, length marker, minimal solution) is below the pool target. Most
//! candidates fail; that is a normal outcome, not an error.

use crate::core::constants::{SOLUTION_INDICES, SOLUTION_LENGTH_MARKER};
use crate::core::{WorkDescriptor, WorkSnapshot};
use crate::crypto::double_sha256;
use crate::equihash::solution::{
    build_candidate_header, client_nonce, encode_solution, with_length_marker,
};
use tracing::{debug, trace};

/// A verified share, ready for `mining.submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    /// Job the share solves
    pub job_id: String,
    /// Time field of that job
    pub time: String,
    /// Free nonce bytes following the pool nonce in the header
    pub client_nonce: Vec<u8>,
    /// Length marker followed by the minimal solution
    pub solution: Vec<u8>,
}

/// Checks candidate solutions before they are submitted
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionVerifier;

impl SolutionVerifier {
    /// Create a verifier
    pub fn new() -> Self {
        Self
    }

    /// Check a candidate index set.
    ///
    /// Returns the share to submit, or `None` when the work is stale, the
    /// index set is malformed or the hash misses the target.
    pub fn check(
        &self,
        indices: &[u32],
        descriptor: &WorkDescriptor,
        snapshot: &WorkSnapshot,
    ) -> Option<Share> {
        let job = &snapshot.job;
        if descriptor.job_id != job.job_id {
            trace!(
                work_job = %descriptor.job_id,
                current_job = %job.job_id,
                "Discarding stale solution"
            );
            return None;
        }

        if indices.len() != SOLUTION_INDICES {
            debug!(count = indices.len(), "Discarding solution with wrong index count");
            return None;
        }

        let solution = match encode_solution(indices) {
            Ok(solution) => solution,
            Err(e) => {
                debug!(error = %e, "Failed to encode solution");
                return None;
            }
        };

        let header = match build_candidate_header(job, descriptor.nonce) {
            Ok(header) => header,
            Err(e) => {
                debug!(error = %e, "Failed to build candidate header");
                return None;
            }
        };

        let mut block = Vec::with_capacity(header.len() + 1 + solution.len());
        block.extend_from_slice(&header);
        block.push(SOLUTION_LENGTH_MARKER);
        block.extend_from_slice(&solution);

        let hash = double_sha256(&block);
        if !snapshot.target.is_met_by(&hash) {
            return None;
        }

        debug!(job_id = %job.job_id, nonce = descriptor.nonce, "Solution meets target");

        Some(Share {
            job_id: job.job_id.clone(),
            time: job.time.clone(),
            client_nonce: client_nonce(job, &header).to_vec(),
            solution: with_length_marker(&solution),
        })
    }
}
