//! Canonical Wire Codec
//!
//! The byte layout here is PROTOCOL: two nodes must serialize any transaction
//! to identical bytes, because hashes and signatures run over the encoding.
//!
//! # Format Conventions
//!
//! - Fixed-width integers are big-endian
//! - Variable-length fields carry a u32 big-endian byte length
//! - Big integers are minimal big-endian magnitudes (no leading zero byte;
//!   zero encodes as the empty string); a non-minimal encoding is rejected,
//!   so every value has exactly one valid byte form
//! - Addresses, public keys, and coin symbols are raw fixed-width bytes
//!
//! Decoding is strict: truncation, oversized lengths, non-minimal integers
//! and malformed symbols all fail. `decode(encode(x)) == x` for every
//! well-formed value, and `encode(decode(b)) == b` for every accepted `b`.

use lib_types::{Address, CoinSymbol, PublicKey};
use num_bigint::BigUint;
use num_traits::Zero;
use thiserror::Error;

/// Longest accepted variable-length field (decoder hardening)
const MAX_FIELD_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("{0} trailing bytes after the envelope")]
    TrailingBytes(usize),
    #[error("field length {0} exceeds the decoder limit")]
    FieldTooLong(usize),
    #[error("big integer is not minimally encoded")]
    NonMinimalInteger,
    #[error("malformed coin symbol")]
    InvalidSymbol,
    #[error("unknown tag {0:#04x}")]
    UnknownTag(u8),
}

// ============================================================================
// WRITER
// ============================================================================

/// Append-only canonical encoder
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Length-prefixed byte string
    pub fn put_bytes(&mut self, v: &[u8]) {
        self.put_u32(v.len() as u32);
        self.buf.extend_from_slice(v);
    }

    /// Length-prefixed minimal big-endian magnitude
    pub fn put_biguint(&mut self, v: &BigUint) {
        if v.is_zero() {
            self.put_u32(0);
        } else {
            self.put_bytes(&v.to_bytes_be());
        }
    }

    pub fn put_address(&mut self, v: &Address) {
        self.buf.extend_from_slice(v.as_bytes());
    }

    pub fn put_pubkey(&mut self, v: &PublicKey) {
        self.buf.extend_from_slice(v.as_bytes());
    }

    pub fn put_symbol(&mut self, v: &CoinSymbol) {
        self.buf.extend_from_slice(v.as_padded());
    }

    pub fn put_raw(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }
}

// ============================================================================
// READER
// ============================================================================

/// Strict canonical decoder
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.data.len() - self.pos < n {
            return Err(CodecError::UnexpectedEnd(self.pos));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> Result<u32, CodecError> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn u64(&mut self) -> Result<u64, CodecError> {
        let raw = self.take(8)?;
        let mut be = [0u8; 8];
        be.copy_from_slice(raw);
        Ok(u64::from_be_bytes(be))
    }

    /// Length-prefixed byte string
    pub fn bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.u32()? as usize;
        if len > MAX_FIELD_LEN {
            return Err(CodecError::FieldTooLong(len));
        }
        Ok(self.take(len)?.to_vec())
    }

    /// Length-prefixed minimal big-endian magnitude
    pub fn biguint(&mut self) -> Result<BigUint, CodecError> {
        let raw = self.bytes()?;
        if raw.first() == Some(&0) {
            return Err(CodecError::NonMinimalInteger);
        }
        Ok(BigUint::from_bytes_be(&raw))
    }

    pub fn address(&mut self) -> Result<Address, CodecError> {
        let raw = self.take(Address::LEN)?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(raw);
        Ok(Address::new(bytes))
    }

    pub fn pubkey(&mut self) -> Result<PublicKey, CodecError> {
        let raw = self.take(PublicKey::LEN)?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(raw);
        Ok(PublicKey::new(bytes))
    }

    pub fn symbol(&mut self) -> Result<CoinSymbol, CodecError> {
        let raw = self.take(10)?;
        let mut bytes = [0u8; 10];
        bytes.copy_from_slice(raw);
        CoinSymbol::from_padded(bytes).map_err(|_| CodecError::InvalidSymbol)
    }

    pub fn fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let raw = self.take(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(raw);
        Ok(bytes)
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Assert the whole input was consumed
    pub fn finish(self) -> Result<(), CodecError> {
        let rest = self.data.len() - self.pos;
        if rest > 0 {
            return Err(CodecError::TrailingBytes(rest));
        }
        Ok(())
    }
}
