//! Read-Only Estimators
//!
//! The query-path twins of the conversion executors: they price a trade or a
//! commission against a snapshot without touching it. Errors reuse the
//! transaction response codes so clients see identical feedback from the
//! mempool gate and from estimation.

use lib_formula::{purchase_amount, purchase_return, sale_amount, sale_return};
use lib_state::State;
use lib_transaction::{code, commissions, decode_transaction, executor, Response};
use lib_types::{ChainParams, CoinSymbol};
use num_bigint::BigUint;

fn coin_not_exists(coin: &CoinSymbol) -> Response {
    Response::error_with_info(
        code::COIN_NOT_EXISTS,
        format!("Coin {} not exists", coin),
        [("coin", coin.to_string())],
    )
}

fn cross_convert(sell: &CoinSymbol, buy: &CoinSymbol) -> Response {
    Response::error_with_info(
        code::CROSS_CONVERT,
        "\"From\" coin equals to \"to\" coin",
        [
            ("coin_to_sell", sell.to_string()),
            ("coin_to_buy", buy.to_string()),
        ],
    )
}

fn check_coins(
    state: &State,
    sell: &CoinSymbol,
    buy: &CoinSymbol,
) -> Result<(), Response> {
    if sell == buy {
        return Err(cross_convert(sell, buy));
    }
    for coin in [sell, buy] {
        if !state.coins.exists(coin) {
            return Err(coin_not_exists(coin));
        }
    }
    Ok(())
}

/// Coins received for selling `value` of `coin_to_sell`
pub fn estimate_coin_sell(
    state: &State,
    coin_to_sell: &CoinSymbol,
    coin_to_buy: &CoinSymbol,
    value: &BigUint,
) -> Result<BigUint, Response> {
    check_coins(state, coin_to_sell, coin_to_buy)?;

    if state.coins.is_base(coin_to_sell) {
        let coin = state.coins.get(coin_to_buy).expect("checked above");
        return Ok(purchase_return(&coin.volume, &coin.reserve, coin.crr, value));
    }
    if state.coins.is_base(coin_to_buy) {
        let coin = state.coins.get(coin_to_sell).expect("checked above");
        return Ok(sale_return(&coin.volume, &coin.reserve, coin.crr, value));
    }
    let from = state.coins.get(coin_to_sell).expect("checked above");
    let base_value = sale_return(&from.volume, &from.reserve, from.crr, value);
    let to = state.coins.get(coin_to_buy).expect("checked above");
    Ok(purchase_return(&to.volume, &to.reserve, to.crr, &base_value))
}

/// Coins received for selling an entire balance of `value`, net of the
/// conversion commission carved out of the base leg
pub fn estimate_coin_sell_all(
    state: &State,
    coin_to_sell: &CoinSymbol,
    coin_to_buy: &CoinSymbol,
    value: &BigUint,
    gas_price: u32,
) -> Result<BigUint, Response> {
    check_coins(state, coin_to_sell, coin_to_buy)?;

    let gas_price = gas_price.max(1);
    let commission = BigUint::from(commissions::CONVERT_TX as u64)
        * BigUint::from(gas_price)
        * ChainParams::commission_multiplier();
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

    if state.coins.is_base(coin_to_sell) {
        if *value <= commission {
            return Err(not_enough(value));
        }
        let deposit = value - &commission;
        let coin = state.coins.get(coin_to_buy).expect("checked above");
        return Ok(purchase_return(&coin.volume, &coin.reserve, coin.crr, &deposit));
    }

    let from = state.coins.get(coin_to_sell).expect("checked above");
    let proceeds = sale_return(&from.volume, &from.reserve, from.crr, value);
    if proceeds <= commission {
        return Err(not_enough(&proceeds));
    }
    let base_after = proceeds - &commission;

    if state.coins.is_base(coin_to_buy) {
        return Ok(base_after);
    }
    let to = state.coins.get(coin_to_buy).expect("checked above");
    Ok(purchase_return(&to.volume, &to.reserve, to.crr, &base_after))
}

/// Coins that must be sold to receive `value` of `coin_to_buy`
pub fn estimate_coin_buy(
    state: &State,
    coin_to_buy: &CoinSymbol,
    coin_to_sell: &CoinSymbol,
    value: &BigUint,
) -> Result<BigUint, Response> {
    check_coins(state, coin_to_sell, coin_to_buy)?;

    if state.coins.is_base(coin_to_sell) {
        let coin = state.coins.get(coin_to_buy).expect("checked above");
        return Ok(purchase_amount(&coin.volume, &coin.reserve, coin.crr, value));
    }
    if state.coins.is_base(coin_to_buy) {
        let coin = state.coins.get(coin_to_sell).expect("checked above");
        return Ok(sale_amount(&coin.volume, &coin.reserve, coin.crr, value));
    }
    let to = state.coins.get(coin_to_buy).expect("checked above");
    let base_needed = purchase_amount(&to.volume, &to.reserve, to.crr, value);
    let from = state.coins.get(coin_to_sell).expect("checked above");
    Ok(sale_amount(&from.volume, &from.reserve, from.crr, &base_needed))
}

/// Commission a raw encoded transaction would pay, in its gas coin
pub fn estimate_tx_commission(state: &State, raw: &[u8]) -> Result<BigUint, Response> {
    let tx = decode_transaction(raw, state.params())?;
    if !state.coins.exists(&tx.gas_coin) {
        return Err(Response::error_with_info(
            code::WRONG_GAS_COIN,
            format!("Gas coin {} not exists", tx.gas_coin),
            [("gas_coin", tx.gas_coin.to_string())],
        ));
    }
    let fee = executor::compute_commission(&tx, state)?;
    Ok(fee.in_gas_coin)
}
