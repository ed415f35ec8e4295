//! Coin Symbol Type
//!
//! A coin symbol is 3 to 10 uppercase ASCII alphanumeric bytes, stored
//! zero-padded to a fixed 10-byte array. The padded form is PROTOCOL: it is
//! what goes over the wire, into storage keys, and under the state hash.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum symbol length in bytes
pub const MAX_COIN_SYMBOL_LEN: usize = 10;

/// Minimum symbol length in bytes
pub const MIN_COIN_SYMBOL_LEN: usize = 3;

/// Validation failure for a coin symbol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinSymbolError {
    #[error("invalid symbol length {0}: must be {MIN_COIN_SYMBOL_LEN}..={MAX_COIN_SYMBOL_LEN} bytes")]
    InvalidLength(usize),
    #[error("invalid symbol byte {0:#04x}: must be uppercase ASCII alphanumeric")]
    InvalidByte(u8),
}

/// Fixed-width coin symbol, zero-padded to 10 bytes
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default)]
pub struct CoinSymbol(pub [u8; MAX_COIN_SYMBOL_LEN]);

impl CoinSymbol {
    /// Parse and validate a symbol from its string form
    pub fn parse(s: &str) -> Result<Self, CoinSymbolError> {
        Self::from_slice(s.as_bytes())
    }

    /// Parse and validate a symbol from raw unpadded bytes
    pub fn from_slice(raw: &[u8]) -> Result<Self, CoinSymbolError> {
        if raw.len() < MIN_COIN_SYMBOL_LEN || raw.len() > MAX_COIN_SYMBOL_LEN {
            return Err(CoinSymbolError::InvalidLength(raw.len()));
        }
        for &b in raw {
            if !(b.is_ascii_uppercase() || b.is_ascii_digit()) {
                return Err(CoinSymbolError::InvalidByte(b));
            }
        }
        let mut bytes = [0u8; MAX_COIN_SYMBOL_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// Reconstruct from the padded 10-byte wire form, re-validating contents
    pub fn from_padded(bytes: [u8; MAX_COIN_SYMBOL_LEN]) -> Result<Self, CoinSymbolError> {
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(MAX_COIN_SYMBOL_LEN);
        // padding must be all zero after the first zero byte
        if bytes[len..].iter().any(|&b| b != 0) {
            return Err(CoinSymbolError::InvalidByte(0));
        }
        Self::from_slice(&bytes[..len])
    }

    /// Padded 10-byte form (wire and storage layout)
    pub const fn as_padded(&self) -> &[u8; MAX_COIN_SYMBOL_LEN] {
        &self.0
    }

    /// Unpadded symbol bytes
    pub fn as_symbol_bytes(&self) -> &[u8] {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(MAX_COIN_SYMBOL_LEN);
        &self.0[..len]
    }

    /// Length of the symbol without padding
    pub fn symbol_len(&self) -> usize {
        self.as_symbol_bytes().len()
    }
}

impl fmt::Debug for CoinSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoinSymbol({})", self)
    }
}

impl fmt::Display for CoinSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // symbols are validated ASCII
        write!(f, "{}", String::from_utf8_lossy(self.as_symbol_bytes()))
    }
}
