//! Executor Contract and Shared Execution Pipeline
//!
//! Every transaction kind implements [`TxExecutor`]. The pipeline in
//! [`run_tx`] is identical for all kinds: decode, verify signatures, check
//! the nonce, then dispatch. Inside an executor the ordering is fixed too:
//! basic checks, fee validation, domain validation, then (only when
//! `is_check` is false) state mutation and tag emission. Any failure before
//! mutation leaves the state untouched.
//!
//! # Common Fee Path
//!
//! The commission of a transaction is `gas * gas_price` in thousandths of a
//! base coin. When the gas coin is not the base coin, the commission is
//! converted through the coin's bonding curve (`sale_amount`) and the coin is
//! burned in proportion: its reserve drops by the base-coin commission and
//! its volume by the converted amount. The base-coin commission is added to
//! the block reward pool either way.

use crate::code;
use crate::envelope::{address_of_key, decode_transaction, SignatureData, Transaction};
use crate::response::{tag, Response};
use crate::commissions;
use lib_state::{Coin, State};
use lib_types::{Address, BlockHeight, CoinSymbol};
use num_bigint::BigUint;
use std::collections::{BTreeMap, BTreeSet};

/// Projected spend of one transaction, per coin
pub type TotalSpend = Vec<(CoinSymbol, BigUint)>;

/// The uniform capability every transaction kind exposes
pub trait TxExecutor {
    /// Stateless or read-only validation of the data payload
    fn basic_check(&self, tx: &Transaction, state: &State) -> Option<Response>;

    /// Gas constant of this kind
    fn gas(&self) -> i64;

    /// Pure projection of everything the transaction would deduct from the
    /// sender, commission included. Used by estimators.
    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response>;

    /// Validate and (unless `is_check`) apply the state delta
    fn run(
        &self,
        tx: &Transaction,
        state: &State,
        is_check: bool,
        reward_pool: &mut BigUint,
        current_block: BlockHeight,
    ) -> Response;
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Decode, verify, and execute one raw transaction against `state`
pub fn run_tx(
    state: &State,
    raw: &[u8],
    is_check: bool,
    reward_pool: &mut BigUint,
    current_block: BlockHeight,
) -> Response {
    let tx = match decode_transaction(raw, state.params()) {
        Ok(tx) => tx,
        Err(resp) => return resp,
    };
    if let Err(resp) = tx.verify_signatures() {
        return resp;
    }
    if let Some(resp) = verify_multisig_weights(&tx, state) {
        return resp;
    }

    let sender = tx.sender();
    let expected = state.accounts.get_nonce(&sender) + 1;
    if tx.nonce != expected {
        return Response::error_with_info(
            code::WRONG_NONCE,
            format!("Wrong nonce: expected {}, got {}", expected, tx.nonce),
            [
                ("expected_nonce", expected.to_string()),
                ("got_nonce", tx.nonce.to_string()),
            ],
        );
    }

    if !state.coins.exists(&tx.gas_coin) {
        return Response::error_with_info(
            code::WRONG_GAS_COIN,
            format!("Gas coin {} not exists", tx.gas_coin),
            [("gas_coin", tx.gas_coin.to_string())],
        );
    }

    crate::executors::executor_of(&tx.data).run(&tx, state, is_check, reward_pool, current_block)
}

/// Weight/threshold verification of a multisig envelope against state.
/// Cryptographic verification happened in [`Transaction::verify_signatures`].
fn verify_multisig_weights(tx: &Transaction, state: &State) -> Option<Response> {
    let SignatureData::Multi {
        address,
        signatures,
    } = &tx.signature
    else {
        return None;
    };

    let Some(multisig) = state.accounts.get_multisig(address) else {
        return Some(Response::error_with_info(
            code::MULTISIG_NOT_EXISTS,
            format!("Multisig wallet {} not exists", address),
            [("address", address.to_string())],
        ));
    };

    let mut total: u64 = 0;
    let mut seen: BTreeSet<Address> = BTreeSet::new();
    for sig in signatures {
        let signer = address_of_key(&sig.pubkey);
        if !seen.insert(signer) {
            return Some(Response::error(
                code::INCORRECT_MULTI_SIGNATURE,
                format!("Duplicate signer {}", signer),
            ));
        }
        match multisig.weight_of(&signer) {
            Some(weight) => total += weight as u64,
            None => {
                return Some(Response::error(
                    code::INCORRECT_MULTI_SIGNATURE,
                    format!("Signer {} is not an owner of {}", signer, address),
                ))
            }
        }
    }
    if total < multisig.threshold as u64 {
        return Some(Response::error_with_info(
            code::INCORRECT_MULTI_SIGNATURE,
            "Signature weight below the wallet threshold",
            [
                ("weight", total.to_string()),
                ("threshold", multisig.threshold.to_string()),
            ],
        ));
    }
    None
}

// ============================================================================
// COMMON FEE PATH
// ============================================================================

/// A computed transaction commission
pub struct Commission {
    /// Commission denominated in the base coin
    pub in_base: BigUint,
    /// The same commission denominated in the gas coin
    pub in_gas_coin: BigUint,
}

/// Price the commission of `tx`, converting through the gas coin's curve
/// when the gas coin is not the base coin
pub fn compute_commission(tx: &Transaction, state: &State) -> Result<Commission, Response> {
    let in_base = tx.commission_in_base();
    if state.coins.is_base(&tx.gas_coin) {
        return Ok(Commission {
            in_gas_coin: in_base.clone(),
            in_base,
        });
    }

    let coin = state
        .coins
        .get(&tx.gas_coin)
        .expect("gas coin existence is checked in the pipeline");

    if let Some(resp) = check_reserve_underflow(&coin, &in_base) {
        return Err(resp);
    }
    if coin.reserve < in_base {
        return Err(Response::error_with_info(
            code::COIN_RESERVE_NOT_SUFFICIENT,
            format!(
                "Coin reserve balance is not sufficient for transaction. Has: {}, required {}",
                coin.reserve, in_base
            ),
            [
                ("has_reserve", coin.reserve.to_string()),
                ("commission", in_base.to_string()),
                ("gas_coin", tx.gas_coin.to_string()),
            ],
        ));
    }

    let in_gas_coin = lib_formula::sale_amount(&coin.volume, &coin.reserve, coin.crr, &in_base);
    Ok(Commission {
        in_base,
        in_gas_coin,
    })
}

/// Reject any burn that would push a coin's reserve below the solvency floor
pub fn check_reserve_underflow(coin: &Coin, subtract: &BigUint) -> Option<Response> {
    let floor = commissions::min_coin_reserve();
    if coin.reserve < subtract + &floor {
        return Some(Response::error_with_info(
            code::COIN_RESERVE_UNDERFLOW,
            format!(
                "Coin {} reserve would fall below the minimum of {}",
                coin.symbol, floor
            ),
            [
                ("coin", coin.symbol.to_string()),
                ("has_reserve", coin.reserve.to_string()),
                ("min_reserve", floor.to_string()),
            ],
        ));
    }
    None
}

/// Burn the commission from `payer` and feed the reward pool.
/// Callers have already validated balances and reserves.
pub fn deduct_commission(
    state: &State,
    payer: &Address,
    gas_coin: &CoinSymbol,
    fee: &Commission,
    reward_pool: &mut BigUint,
) {
    if !state.coins.is_base(gas_coin) {
        state.coins.sub_reserve(gas_coin, &fee.in_base);
        state.coins.sub_volume(gas_coin, &fee.in_gas_coin);
    }
    state.accounts.sub_balance(payer, gas_coin, &fee.in_gas_coin);
    *reward_pool += &fee.in_base;
}

/// Reject a mint that would push a coin's volume above its hard cap
pub fn check_supply_overflow(coin: &Coin, mint: &BigUint) -> Option<Response> {
    if &coin.volume + mint > coin.max_supply {
        return Some(Response::error_with_info(
            code::COIN_SUPPLY_OVERFLOW,
            format!(
                "Coin {} supply would exceed its maximum of {}",
                coin.symbol, coin.max_supply
            ),
            [
                ("coin", coin.symbol.to_string()),
                ("volume", coin.volume.to_string()),
                ("max_supply", coin.max_supply.to_string()),
            ],
        ));
    }
    None
}

/// The standard insufficient-funds rejection
pub fn insufficient_funds(sender: &Address, needed: &BigUint, coin: &CoinSymbol) -> Response {
    Response::error_with_info(
        code::INSUFFICIENT_FUNDS,
        format!(
            "Insufficient funds for sender account: {}. Wanted {} {}",
            sender, needed, coin
        ),
        [
            ("sender", sender.to_string()),
            ("needed_value", needed.to_string()),
            ("coin", coin.to_string()),
        ],
    )
}

/// Accumulates per-coin spends for balance validation and `total_spend`
#[derive(Default)]
pub struct SpendTally {
    totals: BTreeMap<CoinSymbol, BigUint>,
}

impl SpendTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, coin: &CoinSymbol, value: &BigUint) {
        *self.totals.entry(*coin).or_default() += value;
    }

    /// Verify the sender can cover every tallied coin
    pub fn check_balances(&self, state: &State, sender: &Address) -> Option<Response> {
        for (coin, needed) in &self.totals {
            if state.accounts.get_balance(sender, coin) < *needed {
                return Some(insufficient_funds(sender, needed, coin));
            }
        }
        None
    }

    pub fn into_vec(self) -> TotalSpend {
        self.totals.into_iter().collect()
    }
}

/// Tags shared by every successful transaction
pub fn common_tags(tx: &Transaction, sender: &Address) -> Vec<(String, String)> {
    vec![
        tag("tx.type", hex::encode([tx.data.tx_type().tag()])),
        tag("tx.from", hex::encode(sender.as_bytes())),
    ]
}
