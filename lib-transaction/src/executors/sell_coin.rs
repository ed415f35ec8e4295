//! Sell-Coin Executor
//!
//! Converts a fixed amount of one coin into another. When neither side is
//! the base coin the conversion runs two legs through the base coin: sell
//! into the source reserve, then buy out of the target reserve. Reserve
//! solvency on the sell leg and the supply cap on the buy leg are checked
//! before anything moves.

use crate::code;
use crate::commissions;
use crate::envelope::{SellCoinData, Transaction};
use crate::executor::{
    check_reserve_underflow, check_supply_overflow, common_tags, compute_commission,
    deduct_commission, SpendTally, TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_formula::{purchase_return, sale_return};
use lib_state::State;
use lib_types::BlockHeight;
use num_bigint::BigUint;

/// The planned effect of one conversion, computed before mutation
enum Conversion {
    /// base -> coin: reserve grows by `deposit`, `minted` coins appear
    FromBase { minted: BigUint },
    /// coin -> base: `burned` coins disappear, reserve shrinks by `returned`
    ToBase { returned: BigUint },
    /// coin -> coin via the base leg
    TwoLeg {
        base_value: BigUint,
        minted: BigUint,
    },
}

impl SellCoinData {
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
            let minted = purchase_return(&coin.volume, &coin.reserve, coin.crr, &self.value_to_sell);
            if let Some(resp) = check_supply_overflow(&coin, &minted) {
                return Err(resp);
            }
            let got = minted.clone();
            return Ok((Conversion::FromBase { minted }, got));
        }

        if state.coins.is_base(&self.coin_to_buy) {
            let coin = state.coins.get(&self.coin_to_sell).expect("checked above");
            let returned = sale_return(&coin.volume, &coin.reserve, coin.crr, &self.value_to_sell);
            if let Some(resp) = check_reserve_underflow(&coin, &(&returned + extra_reserve_draw)) {
                return Err(resp);
            }
            let got = returned.clone();
            return Ok((Conversion::ToBase { returned }, got));
        }

        let from = state.coins.get(&self.coin_to_sell).expect("checked above");
        let base_value = sale_return(&from.volume, &from.reserve, from.crr, &self.value_to_sell);
        if let Some(resp) = check_reserve_underflow(&from, &(&base_value + extra_reserve_draw)) {
            return Err(resp);
        }
        let to = state.coins.get(&self.coin_to_buy).expect("checked above");
        let minted = purchase_return(&to.volume, &to.reserve, to.crr, &base_value);
        if let Some(resp) = check_supply_overflow(&to, &minted) {
            return Err(resp);
        }
        let got = minted.clone();
        Ok((Conversion::TwoLeg { base_value, minted }, got))
    }
}

impl TxExecutor for SellCoinData {
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
        let mut tally = SpendTally::new();
        tally.add(&self.coin_to_sell, &self.value_to_sell);
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
        let (conversion, got) = match self.plan(state, &extra_reserve_draw) {
            Ok(planned) => planned,
            Err(resp) => return resp,
        };
        if got < self.min_value_to_buy {
            return Response::error_with_info(
                code::MINIMUM_VALUE_TO_BUY_REACHED,
                format!(
                    "You wanted to buy at least {}, but the trade would return {}",
                    self.min_value_to_buy, got
                ),
                [
                    ("min_value_to_buy", self.min_value_to_buy.to_string()),
                    ("will_get", got.to_string()),
                ],
            );
        }

        let mut tally = SpendTally::new();
        tally.add(&self.coin_to_sell, &self.value_to_sell);
        tally.add(&tx.gas_coin, &fee.in_gas_coin);
        if let Some(resp) = tally.check_balances(state, &sender) {
            return resp;
        }

        if !is_check {
            deduct_commission(state, &sender, &tx.gas_coin, &fee, reward_pool);
            state
                .accounts
                .sub_balance(&sender, &self.coin_to_sell, &self.value_to_sell);
            match &conversion {
                Conversion::FromBase { minted } => {
                    state.coins.add_reserve(&self.coin_to_buy, &self.value_to_sell);
                    state.coins.add_volume(&self.coin_to_buy, minted);
                    state.accounts.add_balance(&sender, &self.coin_to_buy, minted);
                }
                Conversion::ToBase { returned } => {
                    state.coins.sub_volume(&self.coin_to_sell, &self.value_to_sell);
                    state.coins.sub_reserve(&self.coin_to_sell, returned);
                    state
                        .accounts
                        .add_balance(&sender, &self.coin_to_buy, returned);
                }
                Conversion::TwoLeg { base_value, minted } => {
                    state.coins.sub_volume(&self.coin_to_sell, &self.value_to_sell);
                    state.coins.sub_reserve(&self.coin_to_sell, base_value);
                    state.coins.add_reserve(&self.coin_to_buy, base_value);
                    state.coins.add_volume(&self.coin_to_buy, minted);
                    state.accounts.add_balance(&sender, &self.coin_to_buy, minted);
                }
            }
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.coin_to_sell", self.coin_to_sell.to_string()));
        tags.push(tag("tx.coin_to_buy", self.coin_to_buy.to_string()));
        tags.push(tag("tx.sell_amount", self.value_to_sell.to_string()));
        tags.push(tag("tx.return", got.to_string()));
        Response::ok(tx.gas(), tags)
    }
}
