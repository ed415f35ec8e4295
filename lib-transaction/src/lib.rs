//! Transactions for the Volt state machine
//!
//! The crate splits along the execution pipeline:
//!
//! - [`codec`] / [`envelope`] - the canonical wire format, signing, and
//!   sender recovery
//! - [`check`] - the off-chain check voucher format
//! - [`code`] / [`response`] - numeric outcome codes and the response value
//! - [`commissions`] - the per-kind gas table
//! - [`executor`] - the `TxExecutor` contract, the shared fee path, and the
//!   decode-verify-dispatch pipeline
//! - [`executors`] - one module per transaction kind
//!
//! The single entry point for block processing is [`executor::run_tx`].

pub mod check;
pub mod code;
pub mod codec;
pub mod commissions;
pub mod envelope;
pub mod executor;
pub mod executors;
pub mod response;

pub use check::{make_proof, Check};
pub use codec::CodecError;
pub use envelope::{
    address_of_key, decode_transaction, BuyCoinData, CreateCoinData, CreateMultisigData,
    DeclareCandidacyData, DelegateData, EditCandidateData, MultisendData, MultisigSignature,
    RedeemCheckData, SellAllCoinData, SellCoinData, SendData, SetCandidateOffData,
    SetCandidateOnData, SignatureData, Transaction, TxData, UnbondData,
};
pub use executor::{run_tx, Commission, TotalSpend, TxExecutor};
pub use response::Response;
