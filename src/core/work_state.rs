//! Shared job/target state between the stratum session and compute workers
//!
//! One writer (the session) replaces the job or the target wholesale; any
//! number of workers read snapshots and draw nonces. Job and target sit behind
//! a single mutex so a reader never sees half of an update. The nonce counter
//! is a separate atomic and never touches the lock.

use crate::core::nonce::NonceCounter;
use crate::core::work::{Job, WorkDescriptor, WorkSnapshot};
use crate::core::Target;
use crate::crypto::MIDSTATE_LEN;
use crate::error::Result;
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    job: Job,
    target: Target,
}

/// Authoritative store for the active job and target
#[derive(Debug)]
pub struct WorkState {
    inner: Mutex<Inner>,
    nonce: NonceCounter,
}

impl WorkState {
    /// Create an empty work state with a random nonce start
    pub fn new() -> Self {
        Self::with_nonce_counter(NonceCounter::random())
    }

    /// Create an empty work state with the given nonce counter
    pub fn with_nonce_counter(nonce: NonceCounter) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            nonce,
        }
    }

    /// Replace the current job.
    ///
    /// The mid-state is derived before the lock is taken and swapped in
    /// together with the rest of the job.
    pub fn set_job(
        &self,
        header_prefix: Vec<u8>,
        pool_nonce: Vec<u8>,
        time: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Result<()> {
        let job = Job::new(job_id, header_prefix, pool_nonce, time)?;
        debug!(job_id = %job.job_id, fixed_len = job.fixed_len(), "Installing job");
        self.inner.lock().job = job;
        Ok(())
    }

    /// Drop the current job; workers pause until the next one arrives
    pub fn clear_job(&self) {
        self.inner.lock().job = Job::none();
    }

    /// Replace the current target
    pub fn set_target(&self, target: Target) {
        self.inner.lock().target = target;
    }

    /// Whether a job is available
    pub fn has_job(&self) -> bool {
        self.inner.lock().job.is_active()
    }

    /// Issue work for one compute-engine call.
    ///
    /// Draws a fresh nonce without locking, then copies the current job id and
    /// mid-state under the lock.
    pub fn issue_work(&self, midstate_out: &mut [u8; MIDSTATE_LEN]) -> WorkDescriptor {
        let nonce = self.nonce.next();

        let inner = self.inner.lock();
        midstate_out.copy_from_slice(&inner.job.midstate);
        WorkDescriptor {
            job_id: inner.job.job_id.clone(),
            nonce,
        }
    }

    /// Copy of the current job and target
    pub fn snapshot(&self) -> WorkSnapshot {
        let inner = self.inner.lock();
        WorkSnapshot {
            job: inner.job.clone(),
            target: inner.target,
        }
    }

    /// Id of the current job
    pub fn current_job_id(&self) -> String {
        self.inner.lock().job.job_id.clone()
    }

    /// Current target
    pub fn target(&self) -> Target {
        self.inner.lock().target
    }
}

impl Default for WorkState {
    fn default() -> Self {
        Self::new()
    }
}
