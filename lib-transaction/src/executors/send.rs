//! Send Executor

use crate::code;
use crate::commissions;
use crate::envelope::{SendData, Transaction};
use crate::executor::{
    common_tags, compute_commission, deduct_commission, SpendTally, TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_state::State;
use lib_types::BlockHeight;
use num_bigint::BigUint;

impl TxExecutor for SendData {
    fn basic_check(&self, _tx: &Transaction, state: &State) -> Option<Response> {
        if !state.coins.exists(&self.coin) {
            return Some(Response::error_with_info(
                code::COIN_NOT_EXISTS,
                format!("Coin {} not exists", self.coin),
                [("coin", self.coin.to_string())],
            ));
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::SEND_TX
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        let fee = compute_commission(tx, state)?;
        let mut tally = SpendTally::new();
        tally.add(&self.coin, &self.value);
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
        tally.add(&self.coin, &self.value);
        tally.add(&tx.gas_coin, &fee.in_gas_coin);
        if let Some(resp) = tally.check_balances(state, &sender) {
            return resp;
        }

        if !is_check {
            deduct_commission(state, &sender, &tx.gas_coin, &fee, reward_pool);
            state.accounts.sub_balance(&sender, &self.coin, &self.value);
            state.accounts.add_balance(&self.to, &self.coin, &self.value);
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.to", hex::encode(self.to.as_bytes())));
        tags.push(tag("tx.coin", self.coin.to_string()));
        Response::ok(tx.gas(), tags)
    }
}
