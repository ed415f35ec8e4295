//! Transaction Envelope
//!
//! The outer wire structure every transaction shares:
//!
//! ```text
//! nonce | chain_id | gas_price | gas_coin | type_tag | data
//! | payload | service_data | signature_section
//! ```
//!
//! Signatures run over the SHA3-256 of the envelope with the signature
//! section omitted; the transaction hash runs over the full encoding. The
//! signer embeds its ed25519 public key, and the sender address is the last
//! 20 bytes of SHA3-256 of that key. Multisig envelopes name the wallet
//! address explicitly and carry one (key, signature) pair per signer.

use crate::code;
use crate::codec::{CodecError, Reader, Writer};
use crate::commissions;
use crate::response::Response;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use lib_types::{
    Address, ChainId, ChainParams, CoinSymbol, Nonce, PublicKey, TransactionType, TxHash,
};
use num_bigint::BigUint;
use sha3::{Digest, Sha3_256};

const SIG_SINGLE: u8 = 0x01;
const SIG_MULTI: u8 = 0x02;

/// Address of an ed25519 public key: last 20 bytes of SHA3-256(key)
pub fn address_of_key(pubkey: &[u8; 32]) -> Address {
    let digest: [u8; 32] = Sha3_256::digest(pubkey).into();
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address::new(out)
}

// ============================================================================
// PER-KIND DATA
// ============================================================================

/// One transfer leg, used by send and multisend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendData {
    pub coin: CoinSymbol,
    pub to: Address,
    pub value: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisendData {
    pub items: Vec<SendData>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellCoinData {
    pub coin_to_sell: CoinSymbol,
    pub value_to_sell: BigUint,
    pub coin_to_buy: CoinSymbol,
    pub min_value_to_buy: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellAllCoinData {
    pub coin_to_sell: CoinSymbol,
    pub coin_to_buy: CoinSymbol,
    pub min_value_to_buy: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyCoinData {
    pub coin_to_buy: CoinSymbol,
    pub value_to_buy: BigUint,
    pub coin_to_sell: CoinSymbol,
    pub max_value_to_sell: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCoinData {
    pub name: String,
    pub symbol: CoinSymbol,
    pub initial_amount: BigUint,
    pub initial_reserve: BigUint,
    pub crr: u32,
    pub max_supply: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareCandidacyData {
    /// Where this candidate's reward share is paid
    pub reward_address: Address,
    pub pubkey: PublicKey,
    pub commission: u32,
    pub coin: CoinSymbol,
    pub stake: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateData {
    pub pubkey: PublicKey,
    pub coin: CoinSymbol,
    pub value: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbondData {
    pub pubkey: PublicKey,
    pub coin: CoinSymbol,
    pub value: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemCheckData {
    /// Encoded check voucher (see [`crate::check`])
    pub raw_check: Vec<u8>,
    /// Signature by the check's lock key over the redeemer's address hash
    pub proof: [u8; 64],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCandidateOnData {
    pub pubkey: PublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCandidateOffData {
    pub pubkey: PublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCandidateData {
    pub pubkey: PublicKey,
    pub reward_address: Address,
    pub owner_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMultisigData {
    pub threshold: u32,
    pub weights: Vec<u32>,
    pub addresses: Vec<Address>,
}

/// Tagged per-kind payload of the envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxData {
    Send(SendData),
    Multisend(MultisendData),
    SellCoin(SellCoinData),
    SellAllCoin(SellAllCoinData),
    BuyCoin(BuyCoinData),
    CreateCoin(CreateCoinData),
    DeclareCandidacy(DeclareCandidacyData),
    Delegate(DelegateData),
    Unbond(UnbondData),
    RedeemCheck(RedeemCheckData),
    SetCandidateOn(SetCandidateOnData),
    SetCandidateOff(SetCandidateOffData),
    EditCandidate(EditCandidateData),
    CreateMultisig(CreateMultisigData),
}

impl TxData {
    /// The wire tag of this kind
    pub fn tx_type(&self) -> TransactionType {
        match self {
            TxData::Send(_) => TransactionType::Send,
            TxData::Multisend(_) => TransactionType::Multisend,
            TxData::SellCoin(_) => TransactionType::SellCoin,
            TxData::SellAllCoin(_) => TransactionType::SellAllCoin,
            TxData::BuyCoin(_) => TransactionType::BuyCoin,
            TxData::CreateCoin(_) => TransactionType::CreateCoin,
            TxData::DeclareCandidacy(_) => TransactionType::DeclareCandidacy,
            TxData::Delegate(_) => TransactionType::Delegate,
            TxData::Unbond(_) => TransactionType::Unbond,
            TxData::RedeemCheck(_) => TransactionType::RedeemCheck,
            TxData::SetCandidateOn(_) => TransactionType::SetCandidateOnline,
            TxData::SetCandidateOff(_) => TransactionType::SetCandidateOffline,
            TxData::EditCandidate(_) => TransactionType::EditCandidate,
            TxData::CreateMultisig(_) => TransactionType::CreateMultisig,
        }
    }

    /// Gas constant of this kind (before payload surcharges)
    pub fn gas(&self) -> i64 {
        crate::executors::executor_of(self).gas()
    }

    fn encode_into(&self, w: &mut Writer) {
        match self {
            TxData::Send(d) => {
                w.put_symbol(&d.coin);
                w.put_address(&d.to);
                w.put_biguint(&d.value);
            }
            TxData::Multisend(d) => {
                w.put_u32(d.items.len() as u32);
                for item in &d.items {
                    w.put_symbol(&item.coin);
                    w.put_address(&item.to);
                    w.put_biguint(&item.value);
                }
            }
            TxData::SellCoin(d) => {
                w.put_symbol(&d.coin_to_sell);
                w.put_biguint(&d.value_to_sell);
                w.put_symbol(&d.coin_to_buy);
                w.put_biguint(&d.min_value_to_buy);
            }
            TxData::SellAllCoin(d) => {
                w.put_symbol(&d.coin_to_sell);
                w.put_symbol(&d.coin_to_buy);
                w.put_biguint(&d.min_value_to_buy);
            }
            TxData::BuyCoin(d) => {
                w.put_symbol(&d.coin_to_buy);
                w.put_biguint(&d.value_to_buy);
                w.put_symbol(&d.coin_to_sell);
                w.put_biguint(&d.max_value_to_sell);
            }
            TxData::CreateCoin(d) => {
                w.put_bytes(d.name.as_bytes());
                w.put_symbol(&d.symbol);
                w.put_biguint(&d.initial_amount);
                w.put_biguint(&d.initial_reserve);
                w.put_u32(d.crr);
                w.put_biguint(&d.max_supply);
            }
            TxData::DeclareCandidacy(d) => {
                w.put_address(&d.reward_address);
                w.put_pubkey(&d.pubkey);
                w.put_u32(d.commission);
                w.put_symbol(&d.coin);
                w.put_biguint(&d.stake);
            }
            TxData::Delegate(d) => {
                w.put_pubkey(&d.pubkey);
                w.put_symbol(&d.coin);
                w.put_biguint(&d.value);
            }
            TxData::Unbond(d) => {
                w.put_pubkey(&d.pubkey);
                w.put_symbol(&d.coin);
                w.put_biguint(&d.value);
            }
            TxData::RedeemCheck(d) => {
                w.put_bytes(&d.raw_check);
                w.put_raw(&d.proof);
            }
            TxData::SetCandidateOn(d) => {
                w.put_pubkey(&d.pubkey);
            }
            TxData::SetCandidateOff(d) => {
                w.put_pubkey(&d.pubkey);
            }
            TxData::EditCandidate(d) => {
                w.put_pubkey(&d.pubkey);
                w.put_address(&d.reward_address);
                w.put_address(&d.owner_address);
            }
            TxData::CreateMultisig(d) => {
                w.put_u32(d.threshold);
                w.put_u32(d.addresses.len() as u32);
                for (addr, weight) in d.addresses.iter().zip(&d.weights) {
                    w.put_u32(*weight);
                    w.put_address(addr);
                }
            }
        }
    }

    fn decode(tag: u8, r: &mut Reader<'_>) -> Result<TxData, CodecError> {
        let tx_type = TransactionType::from_tag(tag).ok_or(CodecError::UnknownTag(tag))?;
        Ok(match tx_type {
            TransactionType::Send => TxData::Send(SendData {
                coin: r.symbol()?,
                to: r.address()?,
                value: r.biguint()?,
            }),
            TransactionType::Multisend => {
                let count = r.u32()? as usize;
                let mut items = Vec::with_capacity(count.min(128));
                for _ in 0..count {
                    items.push(SendData {
                        coin: r.symbol()?,
                        to: r.address()?,
                        value: r.biguint()?,
                    });
                }
                TxData::Multisend(MultisendData { items })
            }
            TransactionType::SellCoin => TxData::SellCoin(SellCoinData {
                coin_to_sell: r.symbol()?,
                value_to_sell: r.biguint()?,
                coin_to_buy: r.symbol()?,
                min_value_to_buy: r.biguint()?,
            }),
            TransactionType::SellAllCoin => TxData::SellAllCoin(SellAllCoinData {
                coin_to_sell: r.symbol()?,
                coin_to_buy: r.symbol()?,
                min_value_to_buy: r.biguint()?,
            }),
            TransactionType::BuyCoin => TxData::BuyCoin(BuyCoinData {
                coin_to_buy: r.symbol()?,
                value_to_buy: r.biguint()?,
                coin_to_sell: r.symbol()?,
                max_value_to_sell: r.biguint()?,
            }),
            TransactionType::CreateCoin => {
                let name_bytes = r.bytes()?;
                let name =
                    String::from_utf8(name_bytes).map_err(|_| CodecError::InvalidSymbol)?;
                TxData::CreateCoin(CreateCoinData {
                    name,
                    symbol: r.symbol()?,
                    initial_amount: r.biguint()?,
                    initial_reserve: r.biguint()?,
                    crr: r.u32()?,
                    max_supply: r.biguint()?,
                })
            }
            TransactionType::DeclareCandidacy => TxData::DeclareCandidacy(DeclareCandidacyData {
                reward_address: r.address()?,
                pubkey: r.pubkey()?,
                commission: r.u32()?,
                coin: r.symbol()?,
                stake: r.biguint()?,
            }),
            TransactionType::Delegate => TxData::Delegate(DelegateData {
                pubkey: r.pubkey()?,
                coin: r.symbol()?,
                value: r.biguint()?,
            }),
            TransactionType::Unbond => TxData::Unbond(UnbondData {
                pubkey: r.pubkey()?,
                coin: r.symbol()?,
                value: r.biguint()?,
            }),
            TransactionType::RedeemCheck => TxData::RedeemCheck(RedeemCheckData {
                raw_check: r.bytes()?,
                proof: r.fixed::<64>()?,
            }),
            TransactionType::SetCandidateOnline => TxData::SetCandidateOn(SetCandidateOnData {
                pubkey: r.pubkey()?,
            }),
            TransactionType::SetCandidateOffline => TxData::SetCandidateOff(SetCandidateOffData {
                pubkey: r.pubkey()?,
            }),
            TransactionType::EditCandidate => TxData::EditCandidate(EditCandidateData {
                pubkey: r.pubkey()?,
                reward_address: r.address()?,
                owner_address: r.address()?,
            }),
            TransactionType::CreateMultisig => {
                let threshold = r.u32()?;
                let count = r.u32()? as usize;
                let mut weights = Vec::with_capacity(count.min(128));
                let mut addresses = Vec::with_capacity(count.min(128));
                for _ in 0..count {
                    weights.push(r.u32()?);
                    addresses.push(r.address()?);
                }
                TxData::CreateMultisig(CreateMultisigData {
                    threshold,
                    weights,
                    addresses,
                })
            }
        })
    }
}

// ============================================================================
// SIGNATURES
// ============================================================================

/// One signer of a multisig envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigSignature {
    pub pubkey: [u8; 32],
    pub signature: [u8; 64],
}

/// The signature section of the envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureData {
    Single {
        pubkey: [u8; 32],
        signature: [u8; 64],
    },
    Multi {
        address: Address,
        signatures: Vec<MultisigSignature>,
    },
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// A fully decoded transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: Nonce,
    pub chain_id: ChainId,
    pub gas_price: u32,
    pub gas_coin: CoinSymbol,
    pub data: TxData,
    pub payload: Vec<u8>,
    pub service_data: Vec<u8>,
    pub signature: SignatureData,
}

impl Transaction {
    /// Build an unsigned envelope (zeroed single signature) for signing
    pub fn unsigned(
        nonce: Nonce,
        chain_id: ChainId,
        gas_price: u32,
        gas_coin: CoinSymbol,
        data: TxData,
    ) -> Self {
        Transaction {
            nonce,
            chain_id,
            gas_price,
            gas_coin,
            data,
            payload: Vec::new(),
            service_data: Vec::new(),
            signature: SignatureData::Single {
                pubkey: [0u8; 32],
                signature: [0u8; 64],
            },
        }
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Sign as a plain single-key sender
    pub fn sign_single(mut self, key: &SigningKey) -> Self {
        let hash = self.signing_hash();
        let signature = key.sign(&hash);
        self.signature = SignatureData::Single {
            pubkey: key.verifying_key().to_bytes(),
            signature: signature.to_bytes(),
        };
        self
    }

    /// Sign on behalf of a multisig wallet
    pub fn sign_multi(mut self, wallet: Address, keys: &[&SigningKey]) -> Self {
        // the wallet address is part of the signed image
        self.signature = SignatureData::Multi {
            address: wallet,
            signatures: Vec::new(),
        };
        let hash = self.signing_hash();
        let signatures = keys
            .iter()
            .map(|key| MultisigSignature {
                pubkey: key.verifying_key().to_bytes(),
                signature: key.sign(&hash).to_bytes(),
            })
            .collect();
        self.signature = SignatureData::Multi {
            address: wallet,
            signatures,
        };
        self
    }

    /// Sender address recovered from the signature section
    pub fn sender(&self) -> Address {
        match &self.signature {
            SignatureData::Single { pubkey, .. } => address_of_key(pubkey),
            SignatureData::Multi { address, .. } => *address,
        }
    }

    /// Gas consumed by this transaction: the kind constant plus a per-byte
    /// surcharge on the free-form fields
    pub fn gas(&self) -> i64 {
        self.data.gas()
            + commissions::PAYLOAD_BYTE_GAS * self.payload.len() as i64
            + commissions::PAYLOAD_BYTE_GAS * self.service_data.len() as i64
    }

    /// Commission in base-coin units, before gas-coin conversion
    pub fn commission_in_base(&self) -> BigUint {
        BigUint::from(self.gas() as u64)
            * BigUint::from(self.gas_price)
            * ChainParams::commission_multiplier()
    }

    fn encode_body(&self, w: &mut Writer) {
        w.put_u64(self.nonce);
        w.put_u8(self.chain_id.tag());
        w.put_u32(self.gas_price);
        w.put_symbol(&self.gas_coin);
        w.put_u8(self.data.tx_type().tag());
        self.data.encode_into(w);
        w.put_bytes(&self.payload);
        w.put_bytes(&self.service_data);
    }

    /// Canonical wire encoding
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.encode_body(&mut w);
        match &self.signature {
            SignatureData::Single { pubkey, signature } => {
                w.put_u8(SIG_SINGLE);
                w.put_raw(pubkey);
                w.put_raw(signature);
            }
            SignatureData::Multi {
                address,
                signatures,
            } => {
                w.put_u8(SIG_MULTI);
                w.put_address(address);
                w.put_u32(signatures.len() as u32);
                for sig in signatures {
                    w.put_raw(&sig.pubkey);
                    w.put_raw(&sig.signature);
                }
            }
        }
        w.into_bytes()
    }

    /// The digest signatures are made over: the envelope without signer keys
    /// and signatures, but including the multisig wallet address when present
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut w = Writer::new();
        self.encode_body(&mut w);
        if let SignatureData::Multi { address, .. } = &self.signature {
            w.put_u8(SIG_MULTI);
            w.put_address(address);
        } else {
            w.put_u8(SIG_SINGLE);
        }
        Sha3_256::digest(w.into_bytes()).into()
    }

    /// Hash of the full encoding, as indexed by the chain
    pub fn hash(&self) -> TxHash {
        TxHash::new(Sha3_256::digest(self.encode()).into())
    }

    /// Verify the cryptographic signatures. Multisig weight/threshold
    /// verification happens against state in the execution pipeline.
    pub fn verify_signatures(&self) -> Result<(), Response> {
        let hash = self.signing_hash();
        match &self.signature {
            SignatureData::Single { pubkey, signature } => {
                verify_one(pubkey, signature, &hash)
            }
            SignatureData::Multi { signatures, .. } => {
                if signatures.is_empty() {
                    return Err(Response::error(
                        code::INCORRECT_MULTI_SIGNATURE,
                        "Multisig transaction carries no signatures",
                    ));
                }
                for sig in signatures {
                    verify_one(&sig.pubkey, &sig.signature, &hash)?;
                }
                Ok(())
            }
        }
    }
}

fn verify_one(pubkey: &[u8; 32], signature: &[u8; 64], hash: &[u8; 32]) -> Result<(), Response> {
    let key = VerifyingKey::from_bytes(pubkey)
        .map_err(|_| Response::error(code::DECODE_ERROR, "Malformed signer public key"))?;
    let signature = Signature::from_bytes(signature);
    key.verify(hash, &signature)
        .map_err(|_| Response::error(code::DECODE_ERROR, "Invalid transaction signature"))
}

/// Decode and structurally validate a raw transaction against chain policy
pub fn decode_transaction(raw: &[u8], params: &ChainParams) -> Result<Transaction, Response> {
    if raw.len() > params.max_tx_size {
        return Err(Response::error_with_info(
            code::TX_TOO_LARGE,
            format!("Transaction of {} bytes exceeds the limit", raw.len()),
            [
                ("size", raw.len().to_string()),
                ("max_size", params.max_tx_size.to_string()),
            ],
        ));
    }

    let decode_err =
        |e: CodecError| Response::error(code::DECODE_ERROR, format!("Unable to decode: {}", e));

    let mut r = Reader::new(raw);
    let nonce = r.u64().map_err(decode_err)?;
    let chain_tag = r.u8().map_err(decode_err)?;
    let chain_id = ChainId::from_tag(chain_tag)
        .ok_or_else(|| Response::error(code::DECODE_ERROR, "Unknown chain tag"))?;
    let gas_price = r.u32().map_err(decode_err)?;
    let gas_coin = r.symbol().map_err(decode_err)?;
    let type_tag = r.u8().map_err(decode_err)?;
    let data = TxData::decode(type_tag, &mut r).map_err(decode_err)?;
    let payload = r.bytes().map_err(decode_err)?;
    let service_data = r.bytes().map_err(decode_err)?;

    let signature = match r.u8().map_err(decode_err)? {
        SIG_SINGLE => SignatureData::Single {
            pubkey: r.fixed::<32>().map_err(decode_err)?,
            signature: r.fixed::<64>().map_err(decode_err)?,
        },
        SIG_MULTI => {
            let address = r.address().map_err(decode_err)?;
            let count = r.u32().map_err(decode_err)? as usize;
            let mut signatures = Vec::with_capacity(count.min(64));
            for _ in 0..count {
                signatures.push(MultisigSignature {
                    pubkey: r.fixed::<32>().map_err(decode_err)?,
                    signature: r.fixed::<64>().map_err(decode_err)?,
                });
            }
            SignatureData::Multi {
                address,
                signatures,
            }
        }
        other => {
            return Err(Response::error(
                code::DECODE_ERROR,
                format!("Unknown signature tag {:#04x}", other),
            ))
        }
    };
    r.finish().map_err(decode_err)?;

    if chain_id != params.chain_id {
        return Err(Response::error_with_info(
            code::WRONG_CHAIN_ID,
            "Wrong chain id",
            [
                ("got", format!("{:#04x}", chain_tag)),
                ("expected", format!("{:#04x}", params.chain_id.tag())),
            ],
        ));
    }
    if payload.len() > params.max_payload_size {
        return Err(Response::error(
            code::TX_PAYLOAD_TOO_LARGE,
            format!("Payload of {} bytes exceeds the limit", payload.len()),
        ));
    }
    if service_data.len() > params.max_payload_size {
        return Err(Response::error(
            code::TX_PAYLOAD_TOO_LARGE,
            format!(
                "Service data of {} bytes exceeds the limit",
                service_data.len()
            ),
        ));
    }
    if gas_price < 1 {
        return Err(Response::error(code::TOO_LOW_GAS_PRICE, "Gas price must be positive"));
    }
    if gas_price > params.max_gas_price {
        return Err(Response::error_with_info(
            code::TOO_HIGH_GAS_PRICE,
            "Gas price exceeds the allowed maximum",
            [
                ("gas_price", gas_price.to_string()),
                ("max_gas_price", params.max_gas_price.to_string()),
            ],
        ));
    }

    Ok(Transaction {
        nonce,
        chain_id,
        gas_price,
        gas_coin,
        data,
        payload,
        service_data,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ChainParams {
        ChainParams::for_testing()
    }

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn sym(s: &str) -> CoinSymbol {
        CoinSymbol::parse(s).unwrap()
    }

    fn sample_datas() -> Vec<TxData> {
        vec![
            TxData::Send(SendData {
                coin: sym("VOLT"),
                to: Address::new([9; 20]),
                value: BigUint::from(12_345u32),
            }),
            TxData::Multisend(MultisendData {
                items: vec![
                    SendData {
                        coin: sym("VOLT"),
                        to: Address::new([1; 20]),
                        value: BigUint::from(1u32),
                    },
                    SendData {
                        coin: sym("ABC"),
                        to: Address::new([2; 20]),
                        value: BigUint::from(2u32),
                    },
                ],
            }),
            TxData::SellCoin(SellCoinData {
                coin_to_sell: sym("ABC"),
                value_to_sell: BigUint::from(10u32),
                coin_to_buy: sym("VOLT"),
                min_value_to_buy: BigUint::from(0u32),
            }),
            TxData::SellAllCoin(SellAllCoinData {
                coin_to_sell: sym("ABC"),
                coin_to_buy: sym("DEF"),
                min_value_to_buy: BigUint::from(5u32),
            }),
            TxData::BuyCoin(BuyCoinData {
                coin_to_buy: sym("ABC"),
                value_to_buy: BigUint::from(10u32),
                coin_to_sell: sym("VOLT"),
                max_value_to_sell: BigUint::from(100u32),
            }),
            TxData::CreateCoin(CreateCoinData {
                name: "Test coin".into(),
                symbol: sym("TESTX"),
                initial_amount: BigUint::from(1_000u32),
                initial_reserve: BigUint::from(1_000u32),
                crr: 50,
                max_supply: BigUint::from(1_000_000u32),
            }),
            TxData::DeclareCandidacy(DeclareCandidacyData {
                reward_address: Address::new([3; 20]),
                pubkey: PublicKey::new([4; 32]),
                commission: 10,
                coin: sym("VOLT"),
                stake: BigUint::from(100u32),
            }),
            TxData::Delegate(DelegateData {
                pubkey: PublicKey::new([4; 32]),
                coin: sym("VOLT"),
                value: BigUint::from(50u32),
            }),
            TxData::Unbond(UnbondData {
                pubkey: PublicKey::new([4; 32]),
                coin: sym("VOLT"),
                value: BigUint::from(25u32),
            }),
            TxData::RedeemCheck(RedeemCheckData {
                raw_check: vec![1, 2, 3, 4],
                proof: [7; 64],
            }),
            TxData::SetCandidateOn(SetCandidateOnData {
                pubkey: PublicKey::new([4; 32]),
            }),
            TxData::SetCandidateOff(SetCandidateOffData {
                pubkey: PublicKey::new([4; 32]),
            }),
            TxData::EditCandidate(EditCandidateData {
                pubkey: PublicKey::new([4; 32]),
                reward_address: Address::new([5; 20]),
                owner_address: Address::new([6; 20]),
            }),
            TxData::CreateMultisig(CreateMultisigData {
                threshold: 2,
                weights: vec![1, 1, 1],
                addresses: vec![
                    Address::new([1; 20]),
                    Address::new([2; 20]),
                    Address::new([3; 20]),
                ],
            }),
        ]
    }

    #[test]
    fn test_roundtrip_every_kind() {
        for data in sample_datas() {
            let tx = Transaction::unsigned(7, ChainId::Dev, 1, sym("VOLT"), data)
                .with_payload(b"memo".to_vec())
                .sign_single(&key(42));
            let encoded = tx.encode();
            let decoded = decode_transaction(&encoded, &params()).unwrap();
            assert_eq!(decoded, tx);
            // byte-stable re-encoding
            assert_eq!(decoded.encode(), encoded);
        }
    }

    #[test]
    fn test_signature_verifies_and_binds_payload() {
        let tx = Transaction::unsigned(
            1,
            ChainId::Dev,
            1,
            sym("VOLT"),
            TxData::Send(SendData {
                coin: sym("VOLT"),
                to: Address::new([9; 20]),
                value: BigUint::from(5u32),
            }),
        )
        .sign_single(&key(1));
        assert!(tx.verify_signatures().is_ok());

        let mut tampered = tx.clone();
        tampered.nonce = 2;
        assert!(tampered.verify_signatures().is_err());

        let mut tampered = tx.clone();
        tampered.payload = b"x".to_vec();
        assert!(tampered.verify_signatures().is_err());
    }

    #[test]
    fn test_sender_derivation_is_stable() {
        let signer = key(3);
        let tx = Transaction::unsigned(
            1,
            ChainId::Dev,
            1,
            sym("VOLT"),
            TxData::SetCandidateOn(SetCandidateOnData {
                pubkey: PublicKey::new([4; 32]),
            }),
        )
        .sign_single(&signer);

        assert_eq!(
            tx.sender(),
            address_of_key(&signer.verifying_key().to_bytes())
        );
    }

    #[test]
    fn test_multi_signature_roundtrip() {
        let wallet = Address::new([0xaa; 20]);
        let k1 = key(1);
        let k2 = key(2);
        let tx = Transaction::unsigned(
            1,
            ChainId::Dev,
            1,
            sym("VOLT"),
            TxData::Send(SendData {
                coin: sym("VOLT"),
                to: Address::new([9; 20]),
                value: BigUint::from(5u32),
            }),
        )
        .sign_multi(wallet, &[&k1, &k2]);

        assert_eq!(tx.sender(), wallet);
        assert!(tx.verify_signatures().is_ok());

        let decoded = decode_transaction(&tx.encode(), &params()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_wrong_chain_id_rejected() {
        let mut p = params();
        p.chain_id = ChainId::Mainnet;
        let tx = Transaction::unsigned(
            1,
            ChainId::Dev,
            1,
            sym("VOLT"),
            TxData::SetCandidateOn(SetCandidateOnData {
                pubkey: PublicKey::new([4; 32]),
            }),
        )
        .sign_single(&key(1));

        let err = decode_transaction(&tx.encode(), &p).unwrap_err();
        assert_eq!(err.code, code::WRONG_CHAIN_ID);
    }

    #[test]
    fn test_gas_price_bounds() {
        let tx = |gas_price| {
            Transaction::unsigned(
                1,
                ChainId::Dev,
                gas_price,
                sym("VOLT"),
                TxData::SetCandidateOn(SetCandidateOnData {
                    pubkey: PublicKey::new([4; 32]),
                }),
            )
            .sign_single(&key(1))
        };

        let err = decode_transaction(&tx(0).encode(), &params()).unwrap_err();
        assert_eq!(err.code, code::TOO_LOW_GAS_PRICE);

        let err = decode_transaction(&tx(501).encode(), &params()).unwrap_err();
        assert_eq!(err.code, code::TOO_HIGH_GAS_PRICE);

        assert!(decode_transaction(&tx(500).encode(), &params()).is_ok());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let p = params();
        let tx = Transaction::unsigned(
            1,
            ChainId::Dev,
            1,
            sym("VOLT"),
            TxData::SetCandidateOn(SetCandidateOnData {
                pubkey: PublicKey::new([4; 32]),
            }),
        )
        .with_payload(vec![0u8; p.max_payload_size + 1])
        .sign_single(&key(1));

        let err = decode_transaction(&tx.encode(), &p).unwrap_err();
        assert_eq!(err.code, code::TX_PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_truncated_bytes_rejected() {
        let tx = Transaction::unsigned(
            1,
            ChainId::Dev,
            1,
            sym("VOLT"),
            TxData::SetCandidateOn(SetCandidateOnData {
                pubkey: PublicKey::new([4; 32]),
            }),
        )
        .sign_single(&key(1));
        let mut bytes = tx.encode();
        bytes.truncate(bytes.len() - 3);

        let err = decode_transaction(&bytes, &params()).unwrap_err();
        assert_eq!(err.code, code::DECODE_ERROR);
    }

    #[test]
    fn test_gas_accounts_for_payload() {
        let data = TxData::Send(SendData {
            coin: sym("VOLT"),
            to: Address::new([9; 20]),
            value: BigUint::from(5u32),
        });
        let plain = Transaction::unsigned(1, ChainId::Dev, 1, sym("VOLT"), data.clone());
        let with_memo = Transaction::unsigned(1, ChainId::Dev, 1, sym("VOLT"), data)
            .with_payload(vec![0u8; 10]);

        assert_eq!(plain.gas(), commissions::SEND_TX);
        assert_eq!(
            with_memo.gas(),
            commissions::SEND_TX + 10 * commissions::PAYLOAD_BYTE_GAS
        );
    }

    #[test]
    fn test_multisend_gas_scales_with_items() {
        let item = SendData {
            coin: sym("VOLT"),
            to: Address::new([9; 20]),
            value: BigUint::from(1u32),
        };
        let data = TxData::Multisend(MultisendData {
            items: vec![item.clone(); 4],
        });
        assert_eq!(
            data.gas(),
            commissions::MULTISEND_BASE + 3 * commissions::MULTISEND_DELTA
        );
    }
}
