//! Declare-Candidacy Executor
//!
//! Registers a validator candidate under a fresh consensus key. New
//! candidates start offline; the owner flips them online once the node is
//! ready to sign.

use crate::code;
use crate::commissions;
use crate::envelope::{DeclareCandidacyData, Transaction};
use crate::executor::{
    common_tags, compute_commission, deduct_commission, SpendTally, TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_state::{Candidate, CandidateStatus, State};
use lib_types::BlockHeight;
use num_bigint::BigUint;
use num_traits::Zero;

impl TxExecutor for DeclareCandidacyData {
    fn basic_check(&self, _tx: &Transaction, state: &State) -> Option<Response> {
        if !state.coins.exists(&self.coin) {
            return Some(Response::error_with_info(
                code::COIN_NOT_EXISTS,
                format!("Coin {} not exists", self.coin),
                [("coin", self.coin.to_string())],
            ));
        }
        if state.candidates.exists(&self.pubkey) {
            return Some(Response::error_with_info(
                code::CANDIDATE_EXISTS,
                format!("Candidate with public key {} already exists", self.pubkey),
                [("pub_key", self.pubkey.to_string())],
            ));
        }
        if self.commission > 100 {
            return Some(Response::error_with_info(
                code::WRONG_COMMISSION,
                "Commission must be between 0 and 100",
                [("commission", self.commission.to_string())],
            ));
        }
        if self.stake.is_zero() {
            return Some(Response::error(
                code::STAKE_SHOULD_BE_POSITIVE,
                "Initial stake must be positive",
            ));
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::DECLARE_CANDIDACY_TX
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        let fee = compute_commission(tx, state)?;
        let mut tally = SpendTally::new();
        tally.add(&self.coin, &self.stake);
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

        let mut tally = SpendTally::new();
        tally.add(&self.coin, &self.stake);
        tally.add(&tx.gas_coin, &fee.in_gas_coin);
        if let Some(resp) = tally.check_balances(state, &sender) {
            return resp;
        }

        if !is_check {
            deduct_commission(state, &sender, &tx.gas_coin, &fee, reward_pool);
            state.accounts.sub_balance(&sender, &self.coin, &self.stake);
            state.candidates.declare(Candidate {
                pubkey: self.pubkey,
                owner: sender,
                reward_address: self.reward_address,
                commission: self.commission,
                status: CandidateStatus::Offline,
                created_at: current_block,
                total_base_stake: BigUint::zero(),
            });
            state
                .candidates
                .add_stake(&sender, &self.pubkey, &self.coin, &self.stake);
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.pub_key", self.pubkey.to_string()));
        Response::ok(tx.gas(), tags)
    }
}
