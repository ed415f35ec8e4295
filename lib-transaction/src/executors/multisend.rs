//! Multisend Executor
//!
//! Up to 100 transfer legs in one envelope. Gas scales with the number of
//! legs; all legs are validated (and all balances tallied per coin) before
//! anything moves.

use crate::code;
use crate::commissions;
use crate::envelope::{MultisendData, Transaction};
use crate::executor::{
    common_tags, compute_commission, deduct_commission, SpendTally, TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_state::State;
use lib_types::BlockHeight;
use num_bigint::BigUint;

const MAX_ITEMS: usize = 100;

impl TxExecutor for MultisendData {
    fn basic_check(&self, _tx: &Transaction, state: &State) -> Option<Response> {
        if self.items.is_empty() || self.items.len() > MAX_ITEMS {
            return Some(Response::error_with_info(
                code::INVALID_MULTISEND_DATA,
                format!("Multisend must carry 1..={} items", MAX_ITEMS),
                [("count", self.items.len().to_string())],
            ));
        }
        for item in &self.items {
            if !state.coins.exists(&item.coin) {
                return Some(Response::error_with_info(
                    code::COIN_NOT_EXISTS,
                    format!("Coin {} not exists", item.coin),
                    [("coin", item.coin.to_string())],
                ));
            }
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::MULTISEND_BASE
            + commissions::MULTISEND_DELTA * self.items.len().saturating_sub(1) as i64
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        let fee = compute_commission(tx, state)?;
        let mut tally = SpendTally::new();
        for item in &self.items {
            tally.add(&item.coin, &item.value);
        }
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

        let mut tally = SpendTally::new();
        for item in &self.items {
            tally.add(&item.coin, &item.value);
        }
        tally.add(&tx.gas_coin, &fee.in_gas_coin);
        if let Some(resp) = tally.check_balances(state, &sender) {
            return resp;
        }

        if !is_check {
            deduct_commission(state, &sender, &tx.gas_coin, &fee, reward_pool);
            for item in &self.items {
                state.accounts.sub_balance(&sender, &item.coin, &item.value);
                state.accounts.add_balance(&item.to, &item.coin, &item.value);
            }
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.count", self.items.len().to_string()));
        Response::ok(tx.gas(), tags)
    }
}
