//! Job and work descriptors exchanged with the compute engine

use crate::core::constants::HEADER_SIZE;
use crate::core::Target;
use crate::crypto::{zelproof_midstate, MIDSTATE_LEN};
use crate::error::{Error, Result};
use std::fmt;

/// Job id carried while no job has been received
pub const NO_JOB_ID: &str = "-1";

/// One unit of work from the pool
#[derive(Clone, PartialEq, Eq)]
pub struct Job {
    /// Opaque pool job id
    pub job_id: String,
    /// Variable part of the block header (six `mining.notify` fields)
    pub header_prefix: Vec<u8>,
    /// Pool-assigned nonce prefix from the subscribe reply
    pub pool_nonce: Vec<u8>,
    /// Time field, echoed verbatim on submit
    pub time: String,
    /// BLAKE2b chaining value after the first 128 header bytes
    pub midstate: [u8; MIDSTATE_LEN],
}

impl Job {
    /// Build a job and derive its mid-state.
    ///
    /// Fails when header prefix and pool nonce together do not fit in the
    /// candidate header.
    pub fn new(
        job_id: impl Into<String>,
        header_prefix: Vec<u8>,
        pool_nonce: Vec<u8>,
        time: impl Into<String>,
    ) -> Result<Self> {
        let fixed_len = header_prefix.len() + pool_nonce.len();
        if fixed_len > HEADER_SIZE {
            return Err(Error::invalid_work(format!(
                "header prefix ({} bytes) and pool nonce ({} bytes) exceed the {}-byte header",
                header_prefix.len(),
                pool_nonce.len(),
                HEADER_SIZE
            )));
        }

        let mut first_block = Vec::with_capacity(fixed_len);
        first_block.extend_from_slice(&header_prefix);
        first_block.extend_from_slice(&pool_nonce);
        let midstate = zelproof_midstate(&first_block);

        Ok(Self {
            job_id: job_id.into(),
            header_prefix,
            pool_nonce,
            time: time.into(),
            midstate,
        })
    }

    /// The placeholder job present before the first `mining.notify`
    pub fn none() -> Self {
        Self {
            job_id: NO_JOB_ID.to_string(),
            header_prefix: Vec::new(),
            pool_nonce: Vec::new(),
            time: String::new(),
            midstate: [0u8; MIDSTATE_LEN],
        }
    }

    /// Whether this is a real job
    pub fn is_active(&self) -> bool {
        self.job_id != NO_JOB_ID
    }

    /// Number of header bytes fixed by the job (prefix plus pool nonce)
    pub fn fixed_len(&self) -> usize {
        self.header_prefix.len() + self.pool_nonce.len()
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("job_id", &self.job_id)
            .field("header_prefix", &hex::encode(&self.header_prefix))
            .field("pool_nonce", &hex::encode(&self.pool_nonce))
            .field("time", &self.time)
            .finish()
    }
}

/// Work handed to one compute-engine call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDescriptor {
    /// Job id current when the work was issued
    pub job_id: String,
    /// Client nonce for this attempt
    pub nonce: u32,
}

/// Consistent copy of the job and target taken under the work lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSnapshot {
    /// Current job
    pub job: Job,
    /// Current share target
    pub target: Target,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_none() {
        let job = Job::none();
        assert_eq!(job.job_id, "-1");
        assert!(!job.is_active());
        assert_eq!(job.fixed_len(), 0);
    }

    #[test]
    fn test_job_midstate_covers_prefix_and_pool_nonce() {
        let job = Job::new("1", vec![0x11; 108], vec![0x22; 4], "5d000000").unwrap();
        assert!(job.is_active());
        assert_eq!(job.fixed_len(), 112);

        let mut joined = vec![0x11; 108];
        joined.extend([0x22; 4]);
        assert_eq!(job.midstate, zelproof_midstate(&joined));
    }

    #[test]
    fn test_job_rejects_oversized_header() {
        let result = Job::new("1", vec![0; 130], vec![0; 11], "00");
        assert!(matches!(result, Err(Error::InvalidWork { .. })));

        // Exactly filling the header is allowed
        assert!(Job::new("1", vec![0; 130], vec![0; 10], "00").is_ok());
    }

    #[test]
    fn test_job_debug_is_hex() {
        let job = Job::new("7", vec![0xAB], vec![0xCD], "t").unwrap();
        let debug = format!("{:?}", job);
        assert!(debug.contains("\"ab\""));
        assert!(debug.contains("\"cd\""));
    }
}
