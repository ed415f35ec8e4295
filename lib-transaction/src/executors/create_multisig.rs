//! Create-Multisig Executor
//!
//! Registers a multi-signature wallet. The wallet address is derived from
//! the owner set, so identical owner sets collide deliberately: one set of
//! owners and weights names exactly one wallet.

use crate::code;
use crate::commissions;
use crate::envelope::{CreateMultisigData, Transaction};
use crate::executor::{
    common_tags, compute_commission, deduct_commission, insufficient_funds, SpendTally,
    TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_state::{Multisig, State};
use lib_types::BlockHeight;
use num_bigint::BigUint;
use std::collections::BTreeSet;

const MAX_OWNERS: usize = 32;
const MAX_WEIGHT: u32 = 1023;

impl CreateMultisigData {
    fn to_multisig(&self) -> Multisig {
        Multisig {
            threshold: self.threshold,
            weights: self.weights.clone(),
            addresses: self.addresses.clone(),
        }
    }
}

impl TxExecutor for CreateMultisigData {
    fn basic_check(&self, _tx: &Transaction, state: &State) -> Option<Response> {
        if self.addresses.is_empty() || self.addresses.len() > MAX_OWNERS {
            return Some(Response::error_with_info(
                code::TOO_LARGE_OWNERS_LIST,
                format!("Owner list must carry 1..={} addresses", MAX_OWNERS),
                [("count", self.addresses.len().to_string())],
            ));
        }
        if self.weights.len() != self.addresses.len() {
            return Some(Response::error(
                code::INCORRECT_WEIGHTS,
                "One weight per owner is required",
            ));
        }
        if self.weights.iter().any(|w| *w == 0 || *w > MAX_WEIGHT) {
            return Some(Response::error(
                code::INCORRECT_WEIGHTS,
                format!("Weights must be in [1, {}]", MAX_WEIGHT),
            ));
        }
        let distinct: BTreeSet<_> = self.addresses.iter().collect();
        if distinct.len() != self.addresses.len() {
            return Some(Response::error(
                code::INCORRECT_WEIGHTS,
                "Duplicate owner address",
            ));
        }
        let total: u64 = self.weights.iter().map(|w| *w as u64).sum();
        if self.threshold == 0 || self.threshold as u64 > total {
            return Some(Response::error_with_info(
                code::INCORRECT_WEIGHTS,
                "Threshold must be positive and reachable",
                [
                    ("threshold", self.threshold.to_string()),
                    ("total_weight", total.to_string()),
                ],
            ));
        }
        let wallet = self.to_multisig().address();
        if state.accounts.get_multisig(&wallet).is_some() {
            return Some(Response::error_with_info(
                code::MULTISIG_EXISTS,
                format!("Multisig wallet {} already exists", wallet),
                [("address", wallet.to_string())],
            ));
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::CREATE_MULTISIG_TX
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        let fee = compute_commission(tx, state)?;
        let mut tally = SpendTally::new();
        tally.add(&tx.gas_coin, &fee.in_gas_coin);
        Ok(tally.into_vec())
    }

    fn run(
        &self,
        tx: &Transaction,
        state: &State,
        is_check: bool,
        reward_pool: &mut BigUint,
        _current_block: BlockHeight,
    ) -> Response {
        let sender = tx.sender();

        if let Some(resp) = self.basic_check(tx, state) {
            return resp;
        }
        let fee = match compute_commission(tx, state) {
            Ok(fee) => fee,
            Err(resp) => return resp,
        };
        if state.accounts.get_balance(&sender, &tx.gas_coin) < fee.in_gas_coin {
            return insufficient_funds(&sender, &fee.in_gas_coin, &tx.gas_coin);
        }

        let wallet = self.to_multisig().address();
        if !is_check {
            deduct_commission(state, &sender, &tx.gas_coin, &fee, reward_pool);
            state.accounts.create_multisig(self.to_multisig());
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.created_multisig", hex::encode(wallet.as_bytes())));
        Response::ok(tx.gas(), tags)
    }
}
