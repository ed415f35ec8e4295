//! Estimator behavior against seeded snapshots

use ed25519_dalek::SigningKey;
use lib_blockchain::estimator::{
    estimate_coin_buy, estimate_coin_sell, estimate_coin_sell_all, estimate_tx_commission,
};
use lib_formula::{purchase_return, sale_return};
use lib_state::{Coin, State, VersionedTree};
use lib_transaction::{code, SendData, Transaction, TxData};
use lib_types::{Address, ChainParams, CoinSymbol};
use num_bigint::BigUint;

fn unit() -> BigUint {
    ChainParams::unit()
}

fn units(n: u64) -> BigUint {
    unit() * n
}

fn sym(s: &str) -> CoinSymbol {
    CoinSymbol::parse(s).unwrap()
}

fn seeded_state() -> State {
    let state = State::new(
        VersionedTree::in_memory(4).unwrap(),
        ChainParams::for_testing(),
    );
    for (symbol, volume, reserve, crr) in
        [("ABC", 10_000u64, 10_000u64, 50u32), ("DEF", 20_000, 40_000, 80)]
    {
        state.coins.create(Coin {
            symbol: sym(symbol),
            name: format!("{} coin", symbol),
            volume: units(volume),
            reserve: units(reserve),
            crr,
            max_supply: units(1_000_000_000),
        });
    }
    state.checker().reset();
    state
}

#[test]
fn sell_estimate_matches_the_curve_each_arm() {
    let state = seeded_state();
    let base = state.coins.base_coin();
    let abc = state.coins.get(&sym("ABC")).unwrap();
    let def = state.coins.get(&sym("DEF")).unwrap();

    // base -> coin
    let got = estimate_coin_sell(&state, &base, &sym("ABC"), &units(100)).unwrap();
    assert_eq!(
        got,
        purchase_return(&abc.volume, &abc.reserve, abc.crr, &units(100))
    );

    // coin -> base
    let got = estimate_coin_sell(&state, &sym("ABC"), &base, &units(100)).unwrap();
    assert_eq!(
        got,
        sale_return(&abc.volume, &abc.reserve, abc.crr, &units(100))
    );

    // coin -> coin through the base leg
    let base_leg = sale_return(&abc.volume, &abc.reserve, abc.crr, &units(100));
    let got = estimate_coin_sell(&state, &sym("ABC"), &sym("DEF"), &units(100)).unwrap();
    assert_eq!(
        got,
        purchase_return(&def.volume, &def.reserve, def.crr, &base_leg)
    );
}

#[test]
fn sell_all_estimate_subtracts_the_commission() {
    let state = seeded_state();
    let base = state.coins.base_coin();
    let abc = state.coins.get(&sym("ABC")).unwrap();

    let commission = BigUint::from(100u32) * ChainParams::commission_multiplier();
    let proceeds = sale_return(&abc.volume, &abc.reserve, abc.crr, &units(100));
    let got = estimate_coin_sell_all(&state, &sym("ABC"), &base, &units(100), 1).unwrap();
    assert_eq!(got, proceeds - commission);
}

#[test]
fn sell_all_estimate_fails_on_dust() {
    let state = seeded_state();
    let base = state.coins.base_coin();
    let err =
        estimate_coin_sell_all(&state, &sym("ABC"), &base, &BigUint::from(1u32), 1).unwrap_err();
    assert_eq!(err.code, code::COMMISSION_COIN_NOT_SUFFICIENT);
}

#[test]
fn buy_estimate_is_consistent_with_sell() {
    let state = seeded_state();
    let base = state.coins.base_coin();

    // the deposit needed to buy X, sold again, returns at most X
    let deposit = estimate_coin_buy(&state, &sym("ABC"), &base, &units(100)).unwrap();
    let returned = estimate_coin_sell(&state, &base, &sym("ABC"), &deposit).unwrap();
    assert!(returned <= units(100));
    assert!(units(100) - &returned < units(1));
}

#[test]
fn same_coin_estimates_are_rejected() {
    let state = seeded_state();
    let err = estimate_coin_sell(&state, &sym("ABC"), &sym("ABC"), &units(1)).unwrap_err();
    assert_eq!(err.code, code::CROSS_CONVERT);
    assert_eq!(err.info.get("coin_to_sell"), Some(&"ABC".to_string()));
    assert_eq!(err.info.get("coin_to_buy"), Some(&"ABC".to_string()));
}

#[test]
fn unknown_coin_estimates_are_rejected() {
    let state = seeded_state();
    let base = state.coins.base_coin();
    let err = estimate_coin_sell(&state, &sym("NOPE"), &base, &units(1)).unwrap_err();
    assert_eq!(err.code, code::COIN_NOT_EXISTS);
}

#[test]
fn commission_estimate_covers_conversion() {
    let state = seeded_state();
    let signer = SigningKey::from_bytes(&[1; 32]);
    let base = state.coins.base_coin();

    // base gas coin: the commission is the flat send price
    let tx = Transaction::unsigned(
        1,
        state.params().chain_id,
        1,
        base,
        TxData::Send(SendData {
            coin: base,
            to: Address::new([9; 20]),
            value: units(1),
        }),
    )
    .sign_single(&signer);
    let fee = estimate_tx_commission(&state, &tx.encode()).unwrap();
    assert_eq!(fee, BigUint::from(10u32) * ChainParams::commission_multiplier());

    // coin gas coin: the commission converts through the curve
    let tx = Transaction::unsigned(
        1,
        state.params().chain_id,
        1,
        sym("ABC"),
        TxData::Send(SendData {
            coin: sym("ABC"),
            to: Address::new([9; 20]),
            value: units(1),
        }),
    )
    .sign_single(&signer);
    let fee = estimate_tx_commission(&state, &tx.encode()).unwrap();
    assert!(fee > BigUint::from(0u32));
    assert_ne!(fee, BigUint::from(10u32) * ChainParams::commission_multiplier());
}
