//! Key Encoding Helpers
//!
//! Key encoding is PROTOCOL. These functions define the canonical byte layout
//! for all state-tree keys. Never inline key construction in business logic.
//!
//! # Key Design Principles
//!
//! 1. **Deterministic** - Same input always produces same key
//! 2. **Sortable** - Keys sort in useful order (e.g., frozen funds by height)
//! 3. **Prefix-free across types** - The first byte is a type tag, so range
//!    scans stay inside one entity family
//! 4. **Fixed-width fields** - No delimiters needed
//!
//! # Format Conventions
//!
//! - Heights are big-endian u64 (sorts numerically)
//! - Addresses are 20 raw bytes, public keys 32, coin symbols 10 (padded)

use lib_types::{Address, CoinSymbol, PublicKey};

/// Type tag of account records
pub const PREFIX_ACCOUNT: u8 = b'a';
/// Type tag of coin records
pub const PREFIX_COIN: u8 = b'b';
/// Type tag of candidate records
pub const PREFIX_CANDIDATE: u8 = b'c';
/// Type tag of stake records
pub const PREFIX_STAKE: u8 = b'd';
/// Type tag of frozen-fund buckets
pub const PREFIX_FROZEN: u8 = b'f';
/// Type tag of spent-check markers
pub const PREFIX_USED_CHECK: u8 = b'u';
/// Key of the persisted validator set
pub const PREFIX_VALIDATOR_SET: u8 = b'v';

/// Key for an account record: `a` + address
#[inline]
pub fn account_key(addr: &Address) -> [u8; 21] {
    let mut key = [0u8; 21];
    key[0] = PREFIX_ACCOUNT;
    key[1..].copy_from_slice(addr.as_bytes());
    key
}

/// Key for a coin record: `b` + padded symbol
#[inline]
pub fn coin_key(symbol: &CoinSymbol) -> [u8; 11] {
    let mut key = [0u8; 11];
    key[0] = PREFIX_COIN;
    key[1..].copy_from_slice(symbol.as_padded());
    key
}

/// Key for a candidate record: `c` + pubkey
#[inline]
pub fn candidate_key(pubkey: &PublicKey) -> [u8; 33] {
    let mut key = [0u8; 33];
    key[0] = PREFIX_CANDIDATE;
    key[1..].copy_from_slice(pubkey.as_bytes());
    key
}

/// Key for one stake record: `d` + pubkey + owner + coin
///
/// Layout: [tag: 1][pubkey: 32][owner: 20][coin: 10] = 63 bytes total.
/// The pubkey comes first so one candidate's stakes form one contiguous range.
#[inline]
pub fn stake_key(pubkey: &PublicKey, owner: &Address, coin: &CoinSymbol) -> [u8; 63] {
    let mut key = [0u8; 63];
    key[0] = PREFIX_STAKE;
    key[1..33].copy_from_slice(pubkey.as_bytes());
    key[33..53].copy_from_slice(owner.as_bytes());
    key[53..].copy_from_slice(coin.as_padded());
    key
}

/// Prefix for scanning all stakes of one candidate
#[inline]
pub fn stakes_prefix(pubkey: &PublicKey) -> [u8; 33] {
    let mut key = [0u8; 33];
    key[0] = PREFIX_STAKE;
    key[1..].copy_from_slice(pubkey.as_bytes());
    key
}

/// Parse owner and coin back out of a stake key
#[inline]
pub fn parse_stake_key(key: &[u8]) -> Option<(PublicKey, Address, CoinSymbol)> {
    if key.len() != 63 || key[0] != PREFIX_STAKE {
        return None;
    }
    let mut pk = [0u8; 32];
    pk.copy_from_slice(&key[1..33]);
    let mut owner = [0u8; 20];
    owner.copy_from_slice(&key[33..53]);
    let mut sym = [0u8; 10];
    sym.copy_from_slice(&key[53..]);
    let coin = CoinSymbol::from_padded(sym).ok()?;
    Some((PublicKey::new(pk), Address::new(owner), coin))
}

/// Key for the frozen-fund bucket releasing at `height`: `f` + height BE
#[inline]
pub fn frozen_key(height: u64) -> [u8; 9] {
    let mut key = [0u8; 9];
    key[0] = PREFIX_FROZEN;
    key[1..].copy_from_slice(&height.to_be_bytes());
    key
}

/// Parse the release height out of a frozen-fund key
#[inline]
pub fn parse_frozen_key(key: &[u8]) -> Option<u64> {
    if key.len() != 9 || key[0] != PREFIX_FROZEN {
        return None;
    }
    let mut be = [0u8; 8];
    be.copy_from_slice(&key[1..]);
    Some(u64::from_be_bytes(be))
}

/// Key marking a spent check: `u` + check hash
#[inline]
pub fn used_check_key(hash: &[u8; 32]) -> [u8; 33] {
    let mut key = [0u8; 33];
    key[0] = PREFIX_USED_CHECK;
    key[1..].copy_from_slice(hash);
    key
}

/// Key of the persisted validator set record
#[inline]
pub fn validator_set_key() -> [u8; 1] {
    [PREFIX_VALIDATOR_SET]
}
