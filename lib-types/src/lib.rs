//! Canonical types for the Volt state machine
//!
//! Everything in this crate is consensus-critical: the byte layout, ordering,
//! and validation rules of these types are part of the protocol. Higher
//! layers (state, transactions, block processing) build exclusively on the
//! types defined here.

pub mod coin_symbol;
pub mod params;
pub mod primitives;
pub mod transaction_type;

pub use coin_symbol::{CoinSymbol, CoinSymbolError, MAX_COIN_SYMBOL_LEN, MIN_COIN_SYMBOL_LEN};
pub use params::{ChainId, ChainParams, EmissionStep};
pub use primitives::{Address, BlockHeight, Nonce, PublicKey, TxHash};
pub use transaction_type::TransactionType;
