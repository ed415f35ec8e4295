//! Sell-All-Coin Executor
//!
//! Sells the sender's entire balance of one coin. The commission is carved
//! out of the base-coin leg of the conversion itself, so the gas coin must
//! be the coin being sold; the sender ends with a zero balance in it and the
//! trade succeeds exactly when the proceeds cover the commission with
//! something left over.

use crate::code;
use crate::commissions;
use crate::envelope::{SellAllCoinData, Transaction};
use crate::executor::{
    check_reserve_underflow, check_supply_overflow, common_tags, SpendTally, TotalSpend,
    TxExecutor,
};
use crate::response::{tag, Response};
use lib_formula::{purchase_return, sale_return};
use lib_state::State;
use lib_types::BlockHeight;
use num_bigint::BigUint;
use num_traits::Zero;

impl TxExecutor for SellAllCoinData {
    fn basic_check(&self, tx: &Transaction, state: &State) -> Option<Response> {
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
        if tx.gas_coin != self.coin_to_sell {
            return Some(Response::error_with_info(
                code::WRONG_GAS_COIN,
                "Sell-all pays its commission from the coin being sold",
                [
                    ("gas_coin", tx.gas_coin.to_string()),
                    ("coin_to_sell", self.coin_to_sell.to_string()),
                ],
            ));
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::CONVERT_TX
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        let sender = tx.sender();
        let balance = state.accounts.get_balance(&sender, &self.coin_to_sell);
        let mut tally = SpendTally::new();
        tally.add(&self.coin_to_sell, &balance);
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

        let balance = state.accounts.get_balance(&sender, &self.coin_to_sell);
        if balance.is_zero() {
            return Response::error_with_info(
                code::INSUFFICIENT_FUNDS,
                format!("Sender has no {} to sell", self.coin_to_sell),
                [("coin", self.coin_to_sell.to_string())],
            );
        }

        let commission = tx.commission_in_base();
        let not_enough = |proceeds: &BigUint| {
            Response::error_with_info(
                code::COMMISSION_COIN_NOT_SUFFICIENT,
                "Not enough coins to pay the commission",
                [
                    ("proceeds", proceeds.to_string()),
                    ("commission", commission.to_string()),
                ],
            )
        };

        // planned effect, computed against the pre-trade state
        let got: BigUint;
        enum Plan {
            FromBase { deposit: BigUint, minted: BigUint },
            ToBase { reserve_out: BigUint, returned: BigUint },
            TwoLeg {
                reserve_out: BigUint,
                base_after: BigUint,
                minted: BigUint,
            },
        }
        let plan = if state.coins.is_base(&self.coin_to_sell) {
            if balance <= commission {
                return not_enough(&balance);
            }
            let deposit = &balance - &commission;
            let coin = state.coins.get(&self.coin_to_buy).expect("checked above");
            let minted = purchase_return(&coin.volume, &coin.reserve, coin.crr, &deposit);
            if let Some(resp) = check_supply_overflow(&coin, &minted) {
                return resp;
            }
            got = minted.clone();
            Plan::FromBase { deposit, minted }
        } else {
            let coin = state.coins.get(&self.coin_to_sell).expect("checked above");
            let reserve_out = sale_return(&coin.volume, &coin.reserve, coin.crr, &balance);
            if let Some(resp) = check_reserve_underflow(&coin, &reserve_out) {
                return resp;
            }
            if reserve_out <= commission {
                return not_enough(&reserve_out);
            }
            let base_after = &reserve_out - &commission;

            if state.coins.is_base(&self.coin_to_buy) {
                got = base_after.clone();
                Plan::ToBase {
                    reserve_out,
                    returned: base_after,
                }
            } else {
                let to = state.coins.get(&self.coin_to_buy).expect("checked above");
                let minted = purchase_return(&to.volume, &to.reserve, to.crr, &base_after);
                if let Some(resp) = check_supply_overflow(&to, &minted) {
                    return resp;
                }
                got = minted.clone();
                Plan::TwoLeg {
                    reserve_out,
                    base_after,
                    minted,
                }
            }
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

        if !is_check {
            state
                .accounts
                .sub_balance(&sender, &self.coin_to_sell, &balance);
            match &plan {
                Plan::FromBase { deposit, minted } => {
                    state.coins.add_reserve(&self.coin_to_buy, deposit);
                    state.coins.add_volume(&self.coin_to_buy, minted);
                    state.accounts.add_balance(&sender, &self.coin_to_buy, minted);
                }
                Plan::ToBase {
                    reserve_out,
                    returned,
                } => {
                    state.coins.sub_volume(&self.coin_to_sell, &balance);
                    state.coins.sub_reserve(&self.coin_to_sell, reserve_out);
                    state
                        .accounts
                        .add_balance(&sender, &self.coin_to_buy, returned);
                }
                Plan::TwoLeg {
                    reserve_out,
                    base_after,
                    minted,
                } => {
                    state.coins.sub_volume(&self.coin_to_sell, &balance);
                    state.coins.sub_reserve(&self.coin_to_sell, reserve_out);
                    state.coins.add_reserve(&self.coin_to_buy, base_after);
                    state.coins.add_volume(&self.coin_to_buy, minted);
                    state.accounts.add_balance(&sender, &self.coin_to_buy, minted);
                }
            }
            *reward_pool += &commission;
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.coin_to_sell", self.coin_to_sell.to_string()));
        tags.push(tag("tx.coin_to_buy", self.coin_to_buy.to_string()));
        tags.push(tag("tx.sell_amount", balance.to_string()));
        tags.push(tag("tx.return", got.to_string()));
        Response::ok(tx.gas(), tags)
    }
}
