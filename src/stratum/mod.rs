//! Stratum pool client
//!
//! Line-delimited JSON-RPC over TCP. The session subscribes, authorizes,
//! feeds jobs and targets into [`WorkState`](crate::core::WorkState) and
//! submits shares queued through a [`SubmitHandle`].

pub mod connection;
pub mod hex;
pub mod protocol;
pub mod session;
pub mod stats;

pub use connection::{Connector, PoolAddress, TcpConnector};
pub use protocol::{StratumMessage, StratumMethod, StratumRequest};
pub use session::{
    SessionConfig, SessionState, StratumClient, SubmitHandle, DEFAULT_RECONNECT_DELAY,
};
pub use stats::ShareStats;
