//! Block processing for the Volt state machine
//!
//! The top of the core: consumes blocks and transactions from the consensus
//! engine, drives the entity state through the begin/deliver/end/commit
//! lifecycle, and answers queries against committed snapshots.
//!
//! - [`app`] - the phase-checked block processor and engine boundary
//! - [`abi`] - the request/response types of that boundary
//! - [`rewards`] - emission and pro-rata distribution
//! - [`validators`] - stake repricing and validator-set diffs
//! - [`slashing`] - byzantine punishment at begin-block
//! - [`estimator`] - read-only pricing for the RPC layer

pub mod abi;
pub mod app;
pub mod estimator;
pub mod rewards;
pub mod slashing;
pub mod validators;

pub use abi::{
    BeginBlockRequest, CommitResponse, EndBlockResponse, Evidence, InfoResponse, ValidatorUpdate,
};
pub use app::{App, APP_VERSION};
