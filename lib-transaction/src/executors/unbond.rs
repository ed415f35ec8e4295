//! Unbond Executor
//!
//! Withdraws stake from a candidate. The funds do not reappear as balance
//! immediately: they are frozen for `ChainParams::unbond_period` blocks and
//! credited back by the block processor when the release height arrives.
//! Unbonding the full stake removes the stake entry outright.

use crate::code;
use crate::commissions;
use crate::envelope::{Transaction, UnbondData};
use crate::executor::{
    common_tags, compute_commission, deduct_commission, insufficient_funds, SpendTally,
    TotalSpend, TxExecutor,
};
use crate::response::Response;
use lib_state::State;
use lib_types::BlockHeight;
use num_bigint::BigUint;

impl TxExecutor for UnbondData {
    fn basic_check(&self, tx: &Transaction, state: &State) -> Option<Response> {
        if !state.coins.exists(&self.coin) {
            return Some(Response::error_with_info(
                code::COIN_NOT_EXISTS,
                format!("Coin {} not exists", self.coin),
                [("coin", self.coin.to_string())],
            ));
        }
        if !state.candidates.exists(&self.pubkey) {
            return Some(Response::error_with_info(
                code::CANDIDATE_NOT_FOUND,
                "Candidate with such public key not found",
                [("pub_key", self.pubkey.to_string())],
            ));
        }

        let sender = tx.sender();
        let Some(stake) = state.candidates.stake_of(&self.pubkey, &sender, &self.coin) else {
            return Some(Response::error(
                code::STAKE_NOT_FOUND,
                "Stake of current user not found",
            ));
        };
        if stake < self.value {
            return Some(Response::error_with_info(
                code::INSUFFICIENT_STAKE,
                "Insufficient stake for sender account",
                [
                    ("pub_key", self.pubkey.to_string()),
                    ("stake", stake.to_string()),
                    ("requested", self.value.to_string()),
                ],
            ));
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::UNBOND_TX
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
        current_block: BlockHeight,
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

        if !is_check {
            let unbond_at = current_block + state.params().unbond_period;

            deduct_commission(state, &sender, &tx.gas_coin, &fee, reward_pool);
            state
                .candidates
                .sub_stake(&sender, &self.pubkey, &self.coin, &self.value);
            state.frozen_funds.add_fund(
                unbond_at,
                &sender,
                Some(self.pubkey),
                &self.coin,
                &self.value,
            );
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        Response::ok(tx.gas(), common_tags(tx, &sender))
    }
}
