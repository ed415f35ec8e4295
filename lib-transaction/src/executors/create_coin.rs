//! Create-Coin Executor
//!
//! Registers a new bonding-curve coin. The creator deposits the initial
//! base-coin reserve and receives the initial supply; the registration fee
//! scales with symbol length (short symbols are scarce).

use crate::code;
use crate::commissions;
use crate::envelope::{CreateCoinData, Transaction};
use crate::executor::{
    common_tags, compute_commission, deduct_commission, SpendTally, TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_formula::{MAX_CRR, MIN_CRR};
use lib_state::{Coin, State};
use lib_types::BlockHeight;
use num_bigint::BigUint;
use num_traits::Zero;

const MAX_COIN_NAME_LEN: usize = 64;

impl TxExecutor for CreateCoinData {
    fn basic_check(&self, _tx: &Transaction, state: &State) -> Option<Response> {
        if self.name.len() > MAX_COIN_NAME_LEN {
            return Some(Response::error_with_info(
                code::INVALID_COIN_NAME,
                format!("Coin name is longer than {} bytes", MAX_COIN_NAME_LEN),
                [("name_length", self.name.len().to_string())],
            ));
        }
        if state.coins.exists(&self.symbol) {
            return Some(Response::error_with_info(
                code::COIN_ALREADY_EXISTS,
                format!("Coin {} already exists", self.symbol),
                [("coin", self.symbol.to_string())],
            ));
        }
        if !(MIN_CRR..=MAX_CRR).contains(&self.crr) {
            return Some(Response::error_with_info(
                code::WRONG_CRR,
                format!("Constant reserve ratio must be in [{}, {}]", MIN_CRR, MAX_CRR),
                [("crr", self.crr.to_string())],
            ));
        }
        if self.initial_amount.is_zero()
            || self.initial_amount > self.max_supply
            || self.max_supply > commissions::max_coin_supply()
        {
            return Some(Response::error_with_info(
                code::WRONG_COIN_SUPPLY,
                "Initial amount must be positive and within the maximum supply",
                [
                    ("initial_amount", self.initial_amount.to_string()),
                    ("max_supply", self.max_supply.to_string()),
                ],
            ));
        }
        let floor = commissions::min_coin_reserve();
        if self.initial_reserve < floor {
            return Some(Response::error_with_info(
                code::COIN_RESERVE_NOT_SUFFICIENT,
                format!("Initial reserve must be at least {}", floor),
                [
                    ("initial_reserve", self.initial_reserve.to_string()),
                    ("min_reserve", floor.to_string()),
                ],
            ));
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::create_coin_gas(self.symbol.symbol_len())
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        let fee = compute_commission(tx, state)?;
        let mut tally = SpendTally::new();
        tally.add(&state.coins.base_coin(), &self.initial_reserve);
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

        let base = state.coins.base_coin();
        let mut tally = SpendTally::new();
        tally.add(&base, &self.initial_reserve);
        tally.add(&tx.gas_coin, &fee.in_gas_coin);
        if let Some(resp) = tally.check_balances(state, &sender) {
            return resp;
        }

        if !is_check {
            deduct_commission(state, &sender, &tx.gas_coin, &fee, reward_pool);
            state.accounts.sub_balance(&sender, &base, &self.initial_reserve);
            state.coins.create(Coin {
                symbol: self.symbol,
                name: self.name.clone(),
                volume: self.initial_amount.clone(),
                reserve: self.initial_reserve.clone(),
                crr: self.crr,
                max_supply: self.max_supply.clone(),
            });
            state
                .accounts
                .add_balance(&sender, &self.symbol, &self.initial_amount);
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.coin", self.symbol.to_string()));
        Response::ok(tx.gas(), tags)
    }
}
