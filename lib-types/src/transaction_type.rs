//! Transaction type classification
//!
//! Every transaction kind has a stable u8 tag. Tags are PROTOCOL: they appear
//! in the wire envelope and in the `tx.type` tag emitted to the indexer.

use serde::{Deserialize, Serialize};

/// Transaction kind tag, carried in byte 0 of the envelope's type field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    /// Single transfer of one coin
    Send = 0x01,
    /// Convert one coin into another through the bonding curve
    SellCoin = 0x02,
    /// Convert the sender's entire balance of one coin into another
    SellAllCoin = 0x03,
    /// Convert with the target amount fixed instead of the source amount
    BuyCoin = 0x04,
    /// Register a new bonding-curve coin
    CreateCoin = 0x05,
    /// Declare a validator candidacy
    DeclareCandidacy = 0x06,
    /// Delegate stake to a candidate
    Delegate = 0x07,
    /// Withdraw stake from a candidate (30-day freeze)
    Unbond = 0x08,
    /// Redeem an off-chain issued check
    RedeemCheck = 0x09,
    /// Switch a candidate into the validating set computation
    SetCandidateOnline = 0x0A,
    /// Switch a candidate out of the validating set computation
    SetCandidateOffline = 0x0B,
    /// Create a multi-signature account
    CreateMultisig = 0x0C,
    /// Transfer to many recipients in one transaction
    Multisend = 0x0D,
    /// Rotate a candidate's owner/reward addresses
    EditCandidate = 0x0E,
}

impl TransactionType {
    /// All transaction kinds in tag order (for dispatch tables and tests)
    pub const ALL: &'static [TransactionType] = &[
        TransactionType::Send,
        TransactionType::SellCoin,
        TransactionType::SellAllCoin,
        TransactionType::BuyCoin,
        TransactionType::CreateCoin,
        TransactionType::DeclareCandidacy,
        TransactionType::Delegate,
        TransactionType::Unbond,
        TransactionType::RedeemCheck,
        TransactionType::SetCandidateOnline,
        TransactionType::SetCandidateOffline,
        TransactionType::CreateMultisig,
        TransactionType::Multisend,
        TransactionType::EditCandidate,
    ];

    /// Wire tag of this kind
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parse a wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.tag() == tag)
    }
}
