//! Consensus-Engine Boundary Types
//!
//! The request/response structures exchanged with the BFT consensus engine.
//! They mirror the engine's ABI shape but stay engine-agnostic: the serving
//! layer maps them onto the concrete protocol.

use lib_types::{BlockHeight, PublicKey};

/// Answer to the engine's handshake probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoResponse {
    pub last_block_height: BlockHeight,
    /// Merkle root of the last committed state
    pub app_hash: [u8; 32],
    /// Protocol version; a mismatch on replay is a hard error
    pub app_version: u64,
}

/// Byzantine-fault evidence delivered at begin-block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    /// Consensus key of the offending validator
    pub pubkey: PublicKey,
}

/// Opens one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginBlockRequest {
    pub height: BlockHeight,
    /// Consensus key of the block proposer
    pub proposer: Option<PublicKey>,
    pub evidence: Vec<Evidence>,
}

/// One change to the active validator set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorUpdate {
    pub pubkey: PublicKey,
    /// Voting power; zero removes the validator
    pub power: u64,
}

/// Closes one block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndBlockResponse {
    pub validator_updates: Vec<ValidatorUpdate>,
}

/// Result of committing one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResponse {
    pub app_hash: [u8; 32],
    pub version: u64,
}
