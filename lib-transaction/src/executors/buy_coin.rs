//! Buy-Coin Executor
//!
//! The inverse conversion: the amount to receive is fixed and the spend is
//! derived through `purchase_amount`/`sale_amount`. The sender caps their
//! exposure with `max_value_to_sell`.

use crate::code;
use crate::commissions;
use crate::envelope::{BuyCoinData, Transaction};
use crate::executor::{
    check_reserve_underflow, check_supply_overflow, common_tags, compute_commission,
    deduct_commission, SpendTally, TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_formula::{purchase_amount, sale_amount};
use lib_state::State;
use lib_types::BlockHeight;
use num_bigint::BigUint;

/// The planned effect of one buy, computed before mutation
enum Conversion {
    /// base -> coin: deposit `spend` base, mint the requested amount
    FromBase,
    /// coin -> base: burn `spend` coins, draw the requested base amount
    ToBase,
    /// coin -> coin via the base leg
    TwoLeg { base_value: BigUint },
}

impl BuyCoinData {
    /// `extra_reserve_draw` is the commission's base-coin draw on the sell
    /// coin when it doubles as the gas coin; the solvency guard must cover
    /// both draws together.
    fn plan(
        &self,
        state: &State,
        extra_reserve_draw: &BigUint,
    ) -> Result<(Conversion, BigUint), Response> {
        if state.coins.is_base(&self.coin_to_sell) {
            let coin = state.coins.get(&self.coin_to_buy).expect("checked above");
            if let Some(resp) = check_supply_overflow(&coin, &self.value_to_buy) {
                return Err(resp);
            }
            let spend = purchase_amount(&coin.volume, &coin.reserve, coin.crr, &self.value_to_buy);
            return Ok((Conversion::FromBase, spend));
        }

        if state.coins.is_base(&self.coin_to_buy) {
            let coin = state.coins.get(&self.coin_to_sell).expect("checked above");
            if let Some(resp) =
                check_reserve_underflow(&coin, &(&self.value_to_buy + extra_reserve_draw))
            {
                return Err(resp);
            }
            let spend = sale_amount(&coin.volume, &coin.reserve, coin.crr, &self.value_to_buy);
            return Ok((Conversion::ToBase, spend));
        }

        let to = state.coins.get(&self.coin_to_buy).expect("checked above");
        if let Some(resp) = check_supply_overflow(&to, &self.value_to_buy) {
            return Err(resp);
        }
        let base_value = purchase_amount(&to.volume, &to.reserve, to.crr, &self.value_to_buy);

        let from = state.coins.get(&self.coin_to_sell).expect("checked above");
        if let Some(resp) = check_reserve_underflow(&from, &(&base_value + extra_reserve_draw)) {
            return Err(resp);
        }
        let spend = sale_amount(&from.volume, &from.reserve, from.crr, &base_value);
        Ok((Conversion::TwoLeg { base_value }, spend))
    }
}

impl TxExecutor for BuyCoinData {
    fn basic_check(&self, _tx: &Transaction, state: &State) -> Option<Response> {
        if self.coin_to_sell == self.coin_to_buy {
            return Some(Response::error_with_info(
                code::CROSS_CONVERT,
                "\"From\" coin equals to \"to\" coin",
                [
                    ("coin_to_sell", self.coin_to_sell.to_string()),
                    ("coin_to_buy", self.coin_to_buy.to_string()),
                ],
            ));
        }
        for coin in [&self.coin_to_sell, &self.coin_to_buy] {
            if !state.coins.exists(coin) {
                return Some(Response::error_with_info(
                    code::COIN_NOT_EXISTS,
                    format!("Coin {} not exists", coin),
                    [("coin", coin.to_string())],
                ));
            }
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::CONVERT_TX
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        let fee = compute_commission(tx, state)?;
        let (_, spend) = self.plan(state, &BigUint::default())?;
        let mut tally = SpendTally::new();
        tally.add(&self.coin_to_sell, &spend);
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
        let extra_reserve_draw = if !state.coins.is_base(&tx.gas_coin) && tx.gas_coin == self.coin_to_sell
        {
            fee.in_base.clone()
        } else {
            BigUint::default()
        };
        let (conversion, spend) = match self.plan(state, &extra_reserve_draw) {
            Ok(planned) => planned,
            Err(resp) => return resp,
        };
        if spend > self.max_value_to_sell {
            return Response::error_with_info(
                code::MAXIMUM_VALUE_TO_SELL_REACHED,
                format!(
                    "You wanted to sell at most {}, but the trade requires {}",
                    self.max_value_to_sell, spend
                ),
                [
                    ("max_value_to_sell", self.max_value_to_sell.to_string()),
                    ("needed_spend", spend.to_string()),
                ],
            );
        }

        let mut tally = SpendTally::new();
        tally.add(&self.coin_to_sell, &spend);
        tally.add(&tx.gas_coin, &fee.in_gas_coin);
        if let Some(resp) = tally.check_balances(state, &sender) {
            return resp;
        }

        if !is_check {
            deduct_commission(state, &sender, &tx.gas_coin, &fee, reward_pool);
            state.accounts.sub_balance(&sender, &self.coin_to_sell, &spend);
            match &conversion {
                Conversion::FromBase => {
                    state.coins.add_reserve(&self.coin_to_buy, &spend);
                    state.coins.add_volume(&self.coin_to_buy, &self.value_to_buy);
                    state
                        .accounts
                        .add_balance(&sender, &self.coin_to_buy, &self.value_to_buy);
                }
                Conversion::ToBase => {
                    state.coins.sub_volume(&self.coin_to_sell, &spend);
                    state.coins.sub_reserve(&self.coin_to_sell, &self.value_to_buy);
                    state
                        .accounts
                        .add_balance(&sender, &self.coin_to_buy, &self.value_to_buy);
                }
                Conversion::TwoLeg { base_value } => {
                    state.coins.sub_volume(&self.coin_to_sell, &spend);
                    state.coins.sub_reserve(&self.coin_to_sell, base_value);
                    state.coins.add_reserve(&self.coin_to_buy, base_value);
                    state.coins.add_volume(&self.coin_to_buy, &self.value_to_buy);
                    state
                        .accounts
                        .add_balance(&sender, &self.coin_to_buy, &self.value_to_buy);
                }
            }
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.coin_to_sell", self.coin_to_sell.to_string()));
        tags.push(tag("tx.coin_to_buy", self.coin_to_buy.to_string()));
        tags.push(tag("tx.sell_amount", spend.to_string()));
        tags.push(tag("tx.return", self.value_to_buy.to_string()));
        Response::ok(tx.gas(), tags)
    }
}
