//! Candidate On/Off Executors
//!
//! Owner-only toggles of a candidate's participation in the validator-set
//! computation. The two kinds share everything except the target status, so
//! the shared body lives here and the data types delegate into it.

use crate::code;
use crate::commissions;
use crate::envelope::{SetCandidateOffData, SetCandidateOnData, Transaction};
use crate::executor::{
    common_tags, compute_commission, deduct_commission, insufficient_funds, SpendTally,
    TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_state::{CandidateStatus, State};
use lib_types::{BlockHeight, PublicKey};
use num_bigint::BigUint;

/// The executor behind a set-candidate-online payload
pub fn online(data: &SetCandidateOnData) -> &dyn TxExecutor {
    data
}

/// The executor behind a set-candidate-offline payload
pub fn offline(data: &SetCandidateOffData) -> &dyn TxExecutor {
    data
}

fn toggle_basic_check(
    pubkey: &PublicKey,
    target: CandidateStatus,
    tx: &Transaction,
    state: &State,
) -> Option<Response> {
    let Some(candidate) = state.candidates.get(pubkey) else {
        return Some(Response::error_with_info(
            code::CANDIDATE_NOT_FOUND,
            "Candidate with such public key not found",
            [("pub_key", pubkey.to_string())],
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
    if candidate.status == target {
        let (error_code, log) = match target {
            CandidateStatus::Online => (code::CANDIDATE_ALREADY_ONLINE, "Candidate is already online"),
            CandidateStatus::Offline => {
                (code::CANDIDATE_ALREADY_OFFLINE, "Candidate is already offline")
            }
        };
        return Some(Response::error(error_code, log));
    }
    None
}

fn toggle_run(
    pubkey: &PublicKey,
    target: CandidateStatus,
    tx: &Transaction,
    state: &State,
    is_check: bool,
    reward_pool: &mut BigUint,
) -> Response {
    let sender = tx.sender();

    if let Some(resp) = toggle_basic_check(pubkey, target, tx, state) {
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
        state.candidates.set_status(pubkey, target);
        state.accounts.set_nonce(&sender, tx.nonce);
    }

    let mut tags = common_tags(tx, &sender);
    tags.push(tag("tx.pub_key", pubkey.to_string()));
    Response::ok(tx.gas(), tags)
}

fn toggle_total_spend(tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
    let fee = compute_commission(tx, state)?;
    let mut tally = SpendTally::new();
    tally.add(&tx.gas_coin, &fee.in_gas_coin);
    Ok(tally.into_vec())
}

impl TxExecutor for SetCandidateOnData {
    fn basic_check(&self, tx: &Transaction, state: &State) -> Option<Response> {
        toggle_basic_check(&self.pubkey, CandidateStatus::Online, tx, state)
    }

    fn gas(&self) -> i64 {
        commissions::TOGGLE_CANDIDATE_STATUS_TX
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        toggle_total_spend(tx, state)
    }

    fn run(
        &self,
        tx: &Transaction,
        state: &State,
        is_check: bool,
        reward_pool: &mut BigUint,
        _current_block: BlockHeight,
    ) -> Response {
        toggle_run(
            &self.pubkey,
            CandidateStatus::Online,
            tx,
            state,
            is_check,
            reward_pool,
        )
    }
}

impl TxExecutor for SetCandidateOffData {
    fn basic_check(&self, tx: &Transaction, state: &State) -> Option<Response> {
        toggle_basic_check(&self.pubkey, CandidateStatus::Offline, tx, state)
    }

    fn gas(&self) -> i64 {
        commissions::TOGGLE_CANDIDATE_STATUS_TX
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        toggle_total_spend(tx, state)
    }

    fn run(
        &self,
        tx: &Transaction,
        state: &State,
        is_check: bool,
        reward_pool: &mut BigUint,
        _current_block: BlockHeight,
    ) -> Response {
        toggle_run(
            &self.pubkey,
            CandidateStatus::Offline,
            tx,
            state,
            is_check,
            reward_pool,
        )
    }
}
