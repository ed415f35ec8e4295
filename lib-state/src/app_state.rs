//! Genesis Application State
//!
//! The JSON document the consensus engine hands to `init_chain`. All numeric
//! amounts are decimal strings and all identifiers are hex strings: genesis
//! files are written and audited by humans, so the format favors readability
//! over compactness. Parsing into state types happens exactly once, at
//! seeding.

use serde::{Deserialize, Serialize};

/// Everything needed to seed state at height 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Height the chain starts at (0 unless restarting from an export)
    #[serde(default)]
    pub start_height: u64,
    /// Block gas limit announced to the consensus engine
    pub max_gas: u64,
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
    #[serde(default)]
    pub coins: Vec<GenesisCoin>,
    #[serde(default)]
    pub candidates: Vec<GenesisCandidate>,
    #[serde(default)]
    pub frozen_funds: Vec<GenesisFrozenFund>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    /// 20-byte address, hex
    pub address: String,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub balances: Vec<GenesisBalance>,
    #[serde(default)]
    pub multisig: Option<GenesisMultisig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub coin: String,
    /// Decimal string in indivisible units
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMultisig {
    pub threshold: u32,
    pub weights: Vec<u32>,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisCoin {
    pub symbol: String,
    pub name: String,
    pub volume: String,
    pub reserve: String,
    pub crr: u32,
    pub max_supply: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisCandidate {
    /// 32-byte consensus key, hex
    pub pubkey: String,
    pub owner: String,
    pub reward_address: String,
    pub commission: u32,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub stakes: Vec<GenesisStake>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisStake {
    pub owner: String,
    pub coin: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisFrozenFund {
    pub height: u64,
    pub owner: String,
    #[serde(default)]
    pub candidate: Option<String>,
    pub coin: String,
    pub value: String,
}
