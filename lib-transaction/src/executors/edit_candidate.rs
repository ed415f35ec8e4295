//! Edit-Candidate Executor
//!
//! Owner-only rotation of a candidate's reward and owner addresses. The
//! consensus key never changes; rotating it means declaring a new candidate.

use crate::code;
use crate::commissions;
use crate::envelope::{EditCandidateData, Transaction};
use crate::executor::{
    common_tags, compute_commission, deduct_commission, insufficient_funds, SpendTally,
    TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_state::State;
use lib_types::BlockHeight;
use num_bigint::BigUint;

impl TxExecutor for EditCandidateData {
    fn basic_check(&self, tx: &Transaction, state: &State) -> Option<Response> {
        let Some(candidate) = state.candidates.get(&self.pubkey) else {
            return Some(Response::error_with_info(
                code::CANDIDATE_NOT_FOUND,
                "Candidate with such public key not found",
                [("pub_key", self.pubkey.to_string())],
            ));
        };
        if candidate.owner != tx.sender() {
            return Some(Response::error_with_info(
                code::IS_NOT_OWNER_OF_CANDIDATE,
                "Sender is not the owner of the candidate",
                [
                    ("owner", candidate.owner.to_string()),
                    ("sender", tx.sender().to_string()),
                ],
            ));
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::EDIT_CANDIDATE_TX
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

        if !is_check {
            deduct_commission(state, &sender, &tx.gas_coin, &fee, reward_pool);
            state
                .candidates
                .edit(&self.pubkey, self.reward_address, self.owner_address);
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.pub_key", self.pubkey.to_string()));
        Response::ok(tx.gas(), tags)
    }
}
