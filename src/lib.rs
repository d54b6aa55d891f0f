//! ZelHash Stratum Mining Client
//!
//! Stratum client for ZelHash (Equihash 125,4) pools:
//! - Reconnecting pool session (subscribe, authorize, notify, submit)
//! - Shared job/target state with lock-free nonce issuance for compute engines
//! - BLAKE2b mid-state precomputation per job
//! - Minimal solution encoding and double SHA-256 share verification

#![forbid(unsafe_code)]

pub mod config;
pub mod core;
pub mod crypto;
pub mod equihash;
pub mod error;
pub mod logging;
pub mod miner;
pub mod stratum;
pub mod worker;

pub use config::Config;
pub use crate::core::{Target, WorkDescriptor, WorkState};
pub use equihash::{Share, SolutionVerifier};
pub use error::{Error, Result};
pub use miner::StratumMiner;

/// Application information
pub const APP_NAME: &str = "zelhash-miner";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
