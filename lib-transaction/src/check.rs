//! Check Vouchers
//!
//! A check is an off-chain promissory note: the issuer signs an amount, a
//! coin, a due block, and a `lock` key derived from a passphrase, then hands
//! the bytes to someone else. Whoever knows the passphrase can redeem the
//! check on-chain once, before it expires. The redeemer proves knowledge of
//! the passphrase by signing their own address with the lock key, which
//! binds the redemption to a single sender and makes the check useless if
//! intercepted.

use crate::codec::{CodecError, Reader, Writer};
use crate::envelope::address_of_key;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use lib_types::{Address, ChainId, CoinSymbol};
use num_bigint::BigUint;
use sha3::{Digest, Sha3_256};

/// Longest accepted check nonce, bytes
pub const MAX_CHECK_NONCE_LEN: usize = 16;

/// A decoded check voucher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Issuer-chosen uniqueness tag (so one issuer can write many otherwise
    /// identical checks)
    pub nonce: Vec<u8>,
    pub chain_id: ChainId,
    /// Last block height at which the check may be redeemed
    pub due_block: u64,
    pub coin: CoinSymbol,
    pub value: BigUint,
    /// Passphrase-derived public key gating redemption
    pub lock: [u8; 32],
    pub issuer_pubkey: [u8; 32],
    /// Issuer's signature over the check body
    pub signature: [u8; 64],
}

impl Check {
    /// Issue and sign a check
    pub fn issue(
        nonce: Vec<u8>,
        chain_id: ChainId,
        due_block: u64,
        coin: CoinSymbol,
        value: BigUint,
        passphrase: &str,
        issuer_key: &SigningKey,
    ) -> Self {
        let mut check = Check {
            nonce,
            chain_id,
            due_block,
            coin,
            value,
            lock: lock_key(passphrase).verifying_key().to_bytes(),
            issuer_pubkey: issuer_key.verifying_key().to_bytes(),
            signature: [0u8; 64],
        };
        check.signature = issuer_key.sign(&check.signing_hash()).to_bytes();
        check
    }

    fn body_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_bytes(&self.nonce);
        w.put_u8(self.chain_id.tag());
        w.put_u64(self.due_block);
        w.put_symbol(&self.coin);
        w.put_biguint(&self.value);
        w.put_raw(&self.lock);
        w.put_raw(&self.issuer_pubkey);
        w.into_bytes()
    }

    fn signing_hash(&self) -> [u8; 32] {
        Sha3_256::digest(self.body_bytes()).into()
    }

    /// Canonical wire encoding
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = self.body_bytes();
        bytes.extend_from_slice(&self.signature);
        bytes
    }

    /// Strict decode of the wire encoding
    pub fn decode(raw: &[u8]) -> Result<Check, CodecError> {
        let mut r = Reader::new(raw);
        let check = Check {
            nonce: r.bytes()?,
            chain_id: {
                let tag = r.u8()?;
                ChainId::from_tag(tag).ok_or(CodecError::UnknownTag(tag))?
            },
            due_block: r.u64()?,
            coin: r.symbol()?,
            value: r.biguint()?,
            lock: r.fixed::<32>()?,
            issuer_pubkey: r.fixed::<32>()?,
            signature: r.fixed::<64>()?,
        };
        r.finish()?;
        Ok(check)
    }

    /// Hash identifying this check in the spent registry
    pub fn hash(&self) -> [u8; 32] {
        Sha3_256::digest(self.encode()).into()
    }

    /// Address of the account the check draws from
    pub fn issuer(&self) -> Address {
        address_of_key(&self.issuer_pubkey)
    }

    /// True when the issuer's signature matches the body
    pub fn verify_issuer_signature(&self) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&self.issuer_pubkey) else {
            return false;
        };
        let signature = Signature::from_bytes(&self.signature);
        key.verify(&self.signing_hash(), &signature).is_ok()
    }

    /// True when `proof` was made with the lock passphrase for `sender`
    pub fn verify_proof(&self, sender: &Address, proof: &[u8; 64]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&self.lock) else {
            return false;
        };
        let signature = Signature::from_bytes(proof);
        key.verify(&proof_hash(sender), &signature).is_ok()
    }
}

/// The redemption proof: the lock key's signature over the redeemer address
pub fn make_proof(passphrase: &str, sender: &Address) -> [u8; 64] {
    lock_key(passphrase).sign(&proof_hash(sender)).to_bytes()
}

fn lock_key(passphrase: &str) -> SigningKey {
    let seed: [u8; 32] = Sha3_256::digest(passphrase.as_bytes()).into();
    SigningKey::from_bytes(&seed)
}

fn proof_hash(sender: &Address) -> [u8; 32] {
    Sha3_256::digest(sender.as_bytes()).into()
}
