//! Core types shared by the session, the verifier and compute workers
//!
//! Job/target state, the client nonce counter and the share target.

mod nonce;
mod target;
mod work;
mod work_state;

pub use nonce::NonceCounter;
pub use target::{Target, TARGET_SIZE};
pub use work::{Job, WorkDescriptor, WorkSnapshot, NO_JOB_ID};
pub use work_state::WorkState;

/// Constants for the ZelHash header and solution layout
pub mod constants {
    /// Size of the candidate block header in bytes
    pub const HEADER_SIZE: usize = 140;

    /// Size of the client nonce written at the end of the header
    pub const CLIENT_NONCE_SIZE: usize = 4;

    /// Offset of the client nonce in the header
    pub const CLIENT_NONCE_OFFSET: usize = HEADER_SIZE - CLIENT_NONCE_SIZE;

    /// Collision bit length of ZelHash (Equihash 125,4)
    pub const COLLISION_BIT_LENGTH: usize = 25;

    /// Number of indices in a solution (2^k)
    pub const SOLUTION_INDICES: usize = 32;

    /// Size of the minimal solution encoding in bytes
    pub const SOLUTION_SIZE: usize = (COLLISION_BIT_LENGTH + 1) * SOLUTION_INDICES / 8;

    /// Length marker preceding the solution, carried verbatim on the wire
    pub const SOLUTION_LENGTH_MARKER: u8 = 52;
}
