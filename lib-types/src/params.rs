//! Chain Parameters
//!
//! Every network constant the state machine depends on lives here and is
//! threaded through construction explicitly. There are no process-wide
//! globals and no init-time side effects: two `ChainParams` values can drive
//! two independent states in one process (the replay tests rely on this).

use crate::coin_symbol::CoinSymbol;
use crate::primitives::BlockHeight;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Network identifier carried in every transaction envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChainId {
    Mainnet = 0x01,
    Testnet = 0x02,
    Dev = 0x03,
}

impl ChainId {
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(ChainId::Mainnet),
            0x02 => Some(ChainId::Testnet),
            0x03 => Some(ChainId::Dev),
            _ => None,
        }
    }
}

/// One step of the block-reward emission schedule
///
/// The reward applies to every height up to and including `until_height`.
/// Steps are kept sorted; heights beyond the last step emit nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionStep {
    pub until_height: BlockHeight,
    pub reward: BigUint,
}

/// Complete configuration of one chain instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Network this state machine validates for
    pub chain_id: ChainId,
    /// The distinguished coin every reserve is denominated in
    pub base_coin: CoinSymbol,
    /// Blocks between an unbond request and the release of the funds
    pub unbond_period: u64,
    /// Size of the active validator set
    pub max_validators: usize,
    /// Stakes ranked into the active prefix of one candidate
    pub max_candidate_stakes: usize,
    /// Committed tree versions retained for historical queries (>= 1)
    pub keep_last_states: u64,
    /// Upper bound on the envelope gas price
    pub max_gas_price: u32,
    /// Upper bound on the encoded transaction, bytes
    pub max_tx_size: usize,
    /// Upper bound on the free-form payload field, bytes
    pub max_payload_size: usize,
    /// Block-reward schedule, sorted by `until_height`
    pub emission: Vec<EmissionStep>,
}

impl ChainParams {
    /// One whole base coin in indivisible units (10^18)
    pub fn unit() -> BigUint {
        BigUint::from(10u32).pow(18)
    }

    /// Multiplier turning a gas constant into indivisible base-coin units
    /// (gas is priced in 0.001 base coin)
    pub fn commission_multiplier() -> BigUint {
        BigUint::from(10u32).pow(15)
    }

    /// Block reward emitted at `height`, before commission accounting
    pub fn emission_at(&self, height: BlockHeight) -> BigUint {
        for step in &self.emission {
            if height <= step.until_height {
                return step.reward.clone();
            }
        }
        BigUint::default()
    }

    /// Mainnet configuration
    pub fn mainnet() -> Self {
        Self::with_chain_id(ChainId::Mainnet)
    }

    /// Small-window configuration for tests: dev chain, short retention
    pub fn for_testing() -> Self {
        let mut params = Self::with_chain_id(ChainId::Dev);
        params.keep_last_states = 8;
        params
    }

    fn with_chain_id(chain_id: ChainId) -> Self {
        let unit = Self::unit();
        ChainParams {
            chain_id,
            base_coin: CoinSymbol::parse("VOLT").expect("static symbol"),
            unbond_period: 518_400,
            max_validators: 100,
            max_candidate_stakes: 1024,
            keep_last_states: 120,
            max_gas_price: 500,
            max_tx_size: 10_240,
            max_payload_size: 1_024,
            emission: vec![
                EmissionStep {
                    until_height: 8_000_000,
                    reward: &unit * 333u32,
                },
                EmissionStep {
                    until_height: 16_000_000,
                    reward: &unit * 166u32,
                },
                EmissionStep {
                    until_height: 32_000_000,
                    reward: &unit * 83u32,
                },
                EmissionStep {
                    until_height: 64_000_000,
                    reward: &unit * 41u32,
                },
            ],
        }
    }
}
