//! Equihash (125,4) solution handling
//!
//! Bit packing of index sets, the minimal solution encoding, candidate header
//! construction and share verification.

pub mod bit_packer;
pub mod solution;
pub mod verifier;

pub use solution::{build_candidate_header, encode_solution, minimal_from_indices};
pub use verifier::{Share, SolutionVerifier};
