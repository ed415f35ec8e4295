//! Executor integration tests
//!
//! Each test drives the full pipeline (encode, decode, verify, execute)
//! against a seeded in-memory state, then commits so the conservation
//! auditor has the final word. The reward pool is paid out to a stand-in
//! proposer before commit, exactly as the block processor does at end-block.

use ed25519_dalek::SigningKey;
use lib_formula::{purchase_return, sale_amount, sale_return};
use lib_state::{Coin, State, VersionedTree};
use lib_transaction::{
    address_of_key, code, make_proof, run_tx, BuyCoinData, Check, CreateCoinData,
    CreateMultisigData, DeclareCandidacyData, DelegateData, RedeemCheckData, Response,
    SellAllCoinData, SellCoinData, SendData, SetCandidateOnData, Transaction, TxData, UnbondData,
};
use lib_types::{Address, ChainParams, CoinSymbol, PublicKey};
use num_bigint::BigUint;
use num_traits::Zero;

fn unit() -> BigUint {
    ChainParams::unit()
}

fn units(n: u64) -> BigUint {
    unit() * n
}

fn params() -> ChainParams {
    ChainParams::for_testing()
}

fn fresh_state() -> State {
    State::new(VersionedTree::in_memory(4).unwrap(), params())
}

fn key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn addr_of(signer: &SigningKey) -> Address {
    address_of_key(&signer.verifying_key().to_bytes())
}

fn sym(s: &str) -> CoinSymbol {
    CoinSymbol::parse(s).unwrap()
}

fn base() -> CoinSymbol {
    params().base_coin
}

/// Register a coin with unit-scaled volume and reserve
fn seed_coin(state: &State, symbol: &str, volume: u64, reserve: u64, crr: u32) {
    state.coins.create(Coin {
        symbol: sym(symbol),
        name: format!("{} test coin", symbol),
        volume: units(volume),
        reserve: units(reserve),
        crr,
        max_supply: units(1_000_000_000),
    });
}

/// Execute a signed transaction and return (response, reward pool delta)
fn deliver(state: &State, tx: &Transaction) -> (Response, BigUint) {
    let mut pool = BigUint::zero();
    let resp = run_tx(state, &tx.encode(), false, &mut pool, 100);
    (resp, pool)
}

/// Pay the pool to a stand-in proposer and commit, so conservation is audited
fn settle(state: &State, pool: &BigUint) {
    let proposer = Address::new([0xfe; 20]);
    state.accounts.add_balance(&proposer, &base(), pool);
    state.commit().expect("conservation audit must pass");
}

fn send_tx(signer: &SigningKey, nonce: u64, gas_coin: CoinSymbol, data: TxData) -> Transaction {
    Transaction::unsigned(nonce, params().chain_id, 1, gas_coin, data).sign_single(signer)
}

// ============================================================================
// SEND
// ============================================================================

#[test]
fn send_with_base_coin_fee() {
    let state = fresh_state();
    let alice = key(1);
    let bob = Address::new([9; 20]);
    state.accounts.add_balance(&addr_of(&alice), &base(), &units(100));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::Send(SendData {
            coin: base(),
            to: bob,
            value: units(10),
        }),
    );
    let (resp, pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);

    // send costs 10 gas = 0.01 base coin
    let fee = BigUint::from(10u32) * ChainParams::commission_multiplier();
    assert_eq!(pool, fee);
    assert_eq!(state.accounts.get_balance(&bob, &base()), units(10));
    assert_eq!(
        state.accounts.get_balance(&addr_of(&alice), &base()),
        units(90) - &fee
    );
    assert_eq!(state.accounts.get_nonce(&addr_of(&alice)), 1);
    settle(&state, &pool);
}

#[test]
fn send_with_coin_fee_conversion_burns_the_gas_coin() {
    let state = fresh_state();
    let alice = key(1);
    let bob = Address::new([9; 20]);
    // linear coin: volume 1000, reserve 2000, crr 100
    seed_coin(&state, "XYZ", 1_000, 2_000, 100);
    state.accounts.add_balance(&addr_of(&alice), &sym("XYZ"), &units(100));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        sym("XYZ"),
        TxData::Send(SendData {
            coin: sym("XYZ"),
            to: bob,
            value: units(10),
        }),
    );
    let (resp, pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);

    let fee_base = BigUint::from(10u32) * ChainParams::commission_multiplier();
    // crr 100: sale_amount = volume * base / reserve = fee_base / 2
    let fee_xyz = &fee_base / 2u32;

    assert_eq!(pool, fee_base);
    assert_eq!(state.accounts.get_balance(&bob, &sym("XYZ")), units(10));
    assert_eq!(
        state.accounts.get_balance(&addr_of(&alice), &sym("XYZ")),
        units(90) - &fee_xyz
    );
    let coin = state.coins.get(&sym("XYZ")).unwrap();
    assert_eq!(coin.volume, units(1_000) - &fee_xyz);
    assert_eq!(coin.reserve, units(2_000) - &fee_base);
    settle(&state, &pool);
}

#[test]
fn send_rejects_unknown_coin_without_charging() {
    let state = fresh_state();
    let alice = key(1);
    state.accounts.add_balance(&addr_of(&alice), &base(), &units(100));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::Send(SendData {
            coin: sym("NOPE"),
            to: Address::new([9; 20]),
            value: units(1),
        }),
    );
    let (resp, pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::COIN_NOT_EXISTS);
    assert_eq!(resp.info.get("coin"), Some(&"NOPE".to_string()));
    assert!(pool.is_zero());
    assert_eq!(state.accounts.get_balance(&addr_of(&alice), &base()), units(100));
    assert_eq!(state.accounts.get_nonce(&addr_of(&alice)), 0);
}

#[test]
fn wrong_nonce_is_rejected() {
    let state = fresh_state();
    let alice = key(1);
    state.accounts.add_balance(&addr_of(&alice), &base(), &units(100));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        5,
        base(),
        TxData::Send(SendData {
            coin: base(),
            to: Address::new([9; 20]),
            value: units(1),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::WRONG_NONCE);
    assert_eq!(resp.info.get("expected_nonce"), Some(&"1".to_string()));
}

#[test]
fn check_mode_validates_without_mutating() {
    let state = fresh_state();
    let alice = key(1);
    state.accounts.add_balance(&addr_of(&alice), &base(), &units(100));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::Send(SendData {
            coin: base(),
            to: Address::new([9; 20]),
            value: units(10),
        }),
    );
    let mut pool = BigUint::zero();
    let resp = run_tx(&state, &tx.encode(), true, &mut pool, 100);
    assert_eq!(resp.code, code::OK);
    assert!(pool.is_zero());
    assert_eq!(state.accounts.get_balance(&addr_of(&alice), &base()), units(100));
    assert_eq!(state.accounts.get_nonce(&addr_of(&alice)), 0);
}

// ============================================================================
// CONVERSIONS
// ============================================================================

#[test]
fn sell_same_coin_is_rejected_with_both_fields() {
    let state = fresh_state();
    let alice = key(1);
    seed_coin(&state, "ABC", 10_000, 10_000, 50);
    state.accounts.add_balance(&addr_of(&alice), &sym("ABC"), &units(100));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        sym("ABC"),
        TxData::SellCoin(SellCoinData {
            coin_to_sell: sym("ABC"),
            value_to_sell: units(10),
            coin_to_buy: sym("ABC"),
            min_value_to_buy: BigUint::zero(),
        }),
    );
    let (resp, pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::CROSS_CONVERT);
    assert_eq!(resp.info.get("coin_to_sell"), Some(&"ABC".to_string()));
    assert_eq!(resp.info.get("coin_to_buy"), Some(&"ABC".to_string()));
    assert!(pool.is_zero());
    assert_eq!(
        state.accounts.get_balance(&addr_of(&alice), &sym("ABC")),
        units(100)
    );
}

#[test]
fn sell_coin_two_leg_matches_the_curve() {
    let state = fresh_state();
    let alice = key(1);
    seed_coin(&state, "ABC", 10_000, 10_000, 50);
    seed_coin(&state, "DEF", 20_000, 40_000, 80);
    state.accounts.add_balance(&addr_of(&alice), &sym("ABC"), &units(100));
    state.accounts.add_balance(&addr_of(&alice), &base(), &units(10));
    state.checker().reset();

    let abc = state.coins.get(&sym("ABC")).unwrap();
    let def = state.coins.get(&sym("DEF")).unwrap();
    let base_leg = sale_return(&abc.volume, &abc.reserve, abc.crr, &units(100));
    let expected = purchase_return(&def.volume, &def.reserve, def.crr, &base_leg);

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::SellCoin(SellCoinData {
            coin_to_sell: sym("ABC"),
            value_to_sell: units(100),
            coin_to_buy: sym("DEF"),
            min_value_to_buy: BigUint::zero(),
        }),
    );
    let (resp, pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);
    assert_eq!(
        state.accounts.get_balance(&addr_of(&alice), &sym("DEF")),
        expected
    );
    assert_eq!(
        state.accounts.get_balance(&addr_of(&alice), &sym("ABC")),
        BigUint::zero()
    );

    // both curves moved by the base leg
    let abc_after = state.coins.get(&sym("ABC")).unwrap();
    let def_after = state.coins.get(&sym("DEF")).unwrap();
    assert_eq!(abc_after.reserve, abc.reserve - &base_leg);
    assert_eq!(def_after.reserve, def.reserve + &base_leg);
    settle(&state, &pool);
}

#[test]
fn sell_coin_honors_min_value_to_buy() {
    let state = fresh_state();
    let alice = key(1);
    seed_coin(&state, "ABC", 10_000, 10_000, 50);
    state.accounts.add_balance(&addr_of(&alice), &sym("ABC"), &units(100));
    state.accounts.add_balance(&addr_of(&alice), &base(), &units(10));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::SellCoin(SellCoinData {
            coin_to_sell: sym("ABC"),
            value_to_sell: units(1),
            coin_to_buy: base(),
            min_value_to_buy: units(1_000_000),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::MINIMUM_VALUE_TO_BUY_REACHED);
}

#[test]
fn sell_coin_guards_reserve_solvency() {
    let state = fresh_state();
    let alice = key(1);
    // reserve sits exactly at the floor: any draw must fail
    seed_coin(&state, "ABC", 1_000, 1_000, 100);
    state.accounts.add_balance(&addr_of(&alice), &sym("ABC"), &units(500));
    state.accounts.add_balance(&addr_of(&alice), &base(), &units(10));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::SellCoin(SellCoinData {
            coin_to_sell: sym("ABC"),
            value_to_sell: units(500),
            coin_to_buy: base(),
            min_value_to_buy: BigUint::zero(),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::COIN_RESERVE_UNDERFLOW);
}

#[test]
fn buy_coin_honors_max_value_to_sell() {
    let state = fresh_state();
    let alice = key(1);
    seed_coin(&state, "ABC", 10_000, 10_000, 50);
    state.accounts.add_balance(&addr_of(&alice), &base(), &units(1_000));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::BuyCoin(BuyCoinData {
            coin_to_buy: sym("ABC"),
            value_to_buy: units(100),
            coin_to_sell: base(),
            max_value_to_sell: BigUint::from(1u32),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::MAXIMUM_VALUE_TO_SELL_REACHED);
}

#[test]
fn buy_coin_from_base_delivers_exact_amount() {
    let state = fresh_state();
    let alice = key(1);
    seed_coin(&state, "ABC", 10_000, 10_000, 50);
    state.accounts.add_balance(&addr_of(&alice), &base(), &units(100_000));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::BuyCoin(BuyCoinData {
            coin_to_buy: sym("ABC"),
            value_to_buy: units(100),
            coin_to_sell: base(),
            max_value_to_sell: units(100_000),
        }),
    );
    let (resp, pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);
    assert_eq!(
        state.accounts.get_balance(&addr_of(&alice), &sym("ABC")),
        units(100)
    );
    let coin = state.coins.get(&sym("ABC")).unwrap();
    assert_eq!(coin.volume, units(10_100));
    settle(&state, &pool);
}

#[test]
fn sell_all_leaves_a_zero_balance() {
    let state = fresh_state();
    let alice = key(1);
    seed_coin(&state, "ABC", 10_000, 10_000, 50);
    state.accounts.add_balance(&addr_of(&alice), &sym("ABC"), &units(100));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        sym("ABC"),
        TxData::SellAllCoin(SellAllCoinData {
            coin_to_sell: sym("ABC"),
            coin_to_buy: base(),
            min_value_to_buy: BigUint::zero(),
        }),
    );
    let (resp, pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);
    assert_eq!(
        state.accounts.get_balance(&addr_of(&alice), &sym("ABC")),
        BigUint::zero()
    );
    assert!(state.accounts.get_balance(&addr_of(&alice), &base()) > BigUint::zero());
    // the commission came out of the proceeds in base coin
    assert_eq!(pool, BigUint::from(100u32) * ChainParams::commission_multiplier());
    settle(&state, &pool);
}

#[test]
fn sell_all_fails_when_proceeds_only_cover_commission() {
    let state = fresh_state();
    let alice = key(1);
    seed_coin(&state, "ABC", 10_000, 10_000, 50);
    // one indivisible unit sells for less than the 0.1-coin commission
    state
        .accounts
        .add_balance(&addr_of(&alice), &sym("ABC"), &BigUint::from(1u32));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        sym("ABC"),
        TxData::SellAllCoin(SellAllCoinData {
            coin_to_sell: sym("ABC"),
            coin_to_buy: base(),
            min_value_to_buy: BigUint::zero(),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::COMMISSION_COIN_NOT_SUFFICIENT);
    assert_eq!(
        state.accounts.get_balance(&addr_of(&alice), &sym("ABC")),
        BigUint::from(1u32)
    );
}

// ============================================================================
// COIN CREATION
// ============================================================================

#[test]
fn create_coin_mints_to_the_creator() {
    let state = fresh_state();
    let alice = key(1);
    state
        .accounts
        .add_balance(&addr_of(&alice), &base(), &units(20_000));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::CreateCoin(CreateCoinData {
            name: "My new coin".into(),
            symbol: sym("NEWCOIN"),
            initial_amount: units(5_000),
            initial_reserve: units(1_000),
            crr: 40,
            max_supply: units(1_000_000),
        }),
    );
    let (resp, pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);

    let coin = state.coins.get(&sym("NEWCOIN")).unwrap();
    assert_eq!(coin.volume, units(5_000));
    assert_eq!(coin.reserve, units(1_000));
    assert_eq!(coin.crr, 40);
    assert_eq!(
        state.accounts.get_balance(&addr_of(&alice), &sym("NEWCOIN")),
        units(5_000)
    );
    // 7-letter symbol: 100 gas = 0.1 base coin
    assert_eq!(pool, BigUint::from(100u32) * ChainParams::commission_multiplier());
    settle(&state, &pool);
}

#[test]
fn create_coin_with_taken_symbol_reports_the_symbol() {
    let state = fresh_state();
    let alice = key(1);
    seed_coin(&state, "TAKEN", 10_000, 10_000, 50);
    state
        .accounts
        .add_balance(&addr_of(&alice), &base(), &units(20_000));
    state.checker().reset();

    let tx = send_tx(
        &alice,
        1,
        base(),
        TxData::CreateCoin(CreateCoinData {
            name: "Copycat".into(),
            symbol: sym("TAKEN"),
            initial_amount: units(1_000),
            initial_reserve: units(1_000),
            crr: 50,
            max_supply: units(1_000_000),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::COIN_ALREADY_EXISTS);
    assert_eq!(resp.info.get("coin"), Some(&"TAKEN".to_string()));
}

#[test]
fn create_coin_enforces_crr_and_reserve_floor() {
    let state = fresh_state();
    let alice = key(1);
    state
        .accounts
        .add_balance(&addr_of(&alice), &base(), &units(20_000));
    state.checker().reset();

    let bad_crr = send_tx(
        &alice,
        1,
        base(),
        TxData::CreateCoin(CreateCoinData {
            name: "Bad".into(),
            symbol: sym("BADCRR"),
            initial_amount: units(1_000),
            initial_reserve: units(1_000),
            crr: 9,
            max_supply: units(1_000_000),
        }),
    );
    assert_eq!(deliver(&state, &bad_crr).0.code, code::WRONG_CRR);

    let thin_reserve = send_tx(
        &alice,
        1,
        base(),
        TxData::CreateCoin(CreateCoinData {
            name: "Thin".into(),
            symbol: sym("THIN"),
            initial_amount: units(1_000),
            initial_reserve: units(999),
            crr: 50,
            max_supply: units(1_000_000),
        }),
    );
    assert_eq!(
        deliver(&state, &thin_reserve).0.code,
        code::COIN_RESERVE_NOT_SUFFICIENT
    );
}

// ============================================================================
// STAKING
// ============================================================================

fn declare_validator(state: &State, owner: &SigningKey, pubkey: PublicKey, stake: BigUint) {
    let tx = send_tx(
        owner,
        state.accounts.get_nonce(&addr_of(owner)) + 1,
        base(),
        TxData::DeclareCandidacy(DeclareCandidacyData {
            reward_address: addr_of(owner),
            pubkey,
            commission: 10,
            coin: base(),
            stake,
        }),
    );
    let (resp, pool) = deliver(state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);
    let proposer = Address::new([0xfe; 20]);
    state.accounts.add_balance(&proposer, &base(), &pool);
}

#[test]
fn declare_delegate_unbond_lifecycle() {
    let state = fresh_state();
    let owner = key(1);
    let delegator = key(2);
    let pubkey = PublicKey::new([7; 32]);
    state.accounts.add_balance(&addr_of(&owner), &base(), &units(50_000));
    state
        .accounts
        .add_balance(&addr_of(&delegator), &base(), &units(1_000));
    state.checker().reset();

    declare_validator(&state, &owner, pubkey, units(10_000));
    assert_eq!(
        state.candidates.stake_of(&pubkey, &addr_of(&owner), &base()),
        Some(units(10_000))
    );

    // delegate 500
    let tx = send_tx(
        &delegator,
        1,
        base(),
        TxData::Delegate(DelegateData {
            pubkey,
            coin: base(),
            value: units(500),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);
    assert_eq!(
        state
            .candidates
            .stake_of(&pubkey, &addr_of(&delegator), &base()),
        Some(units(500))
    );

    // unbond 200 of it at block 100: released at 100 + unbond_period
    let tx = send_tx(
        &delegator,
        2,
        base(),
        TxData::Unbond(UnbondData {
            pubkey,
            coin: base(),
            value: units(200),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);
    assert_eq!(
        state
            .candidates
            .stake_of(&pubkey, &addr_of(&delegator), &base()),
        Some(units(300))
    );
    assert_eq!(state.accounts.get_nonce(&addr_of(&delegator)), 2);

    let release = 100 + params().unbond_period;
    let funds = state.frozen_funds.funds_at(release);
    assert_eq!(funds.len(), 1);
    assert_eq!(funds[0].owner, addr_of(&delegator));
    assert_eq!(funds[0].value, units(200));
    assert_eq!(funds[0].candidate, Some(pubkey));
}

#[test]
fn unbond_of_full_stake_removes_the_entry() {
    let state = fresh_state();
    let owner = key(1);
    let pubkey = PublicKey::new([7; 32]);
    state.accounts.add_balance(&addr_of(&owner), &base(), &units(50_000));
    state.checker().reset();
    declare_validator(&state, &owner, pubkey, units(10_000));

    let tx = send_tx(
        &owner,
        2,
        base(),
        TxData::Unbond(UnbondData {
            pubkey,
            coin: base(),
            value: units(10_000),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);
    assert_eq!(
        state.candidates.stake_of(&pubkey, &addr_of(&owner), &base()),
        None
    );
    assert_eq!(state.candidates.stake_count(&pubkey), 0);
}

#[test]
fn unbond_more_than_staked_is_rejected() {
    let state = fresh_state();
    let owner = key(1);
    let pubkey = PublicKey::new([7; 32]);
    state.accounts.add_balance(&addr_of(&owner), &base(), &units(50_000));
    state.checker().reset();
    declare_validator(&state, &owner, pubkey, units(10_000));

    let tx = send_tx(
        &owner,
        2,
        base(),
        TxData::Unbond(UnbondData {
            pubkey,
            coin: base(),
            value: units(10_001),
        }),
    );
    let (resp, _) = deliver(&state, &tx);
    assert_eq!(resp.code, code::INSUFFICIENT_STAKE);
}

#[test]
fn set_candidate_online_is_owner_only() {
    let state = fresh_state();
    let owner = key(1);
    let stranger = key(2);
    let pubkey = PublicKey::new([7; 32]);
    state.accounts.add_balance(&addr_of(&owner), &base(), &units(50_000));
    state
        .accounts
        .add_balance(&addr_of(&stranger), &base(), &units(1_000));
    state.checker().reset();
    declare_validator(&state, &owner, pubkey, units(10_000));

    let foreign = send_tx(
        &stranger,
        1,
        base(),
        TxData::SetCandidateOn(SetCandidateOnData { pubkey }),
    );
    assert_eq!(deliver(&state, &foreign).0.code, code::IS_NOT_OWNER_OF_CANDIDATE);

    let own = send_tx(
        &owner,
        2,
        base(),
        TxData::SetCandidateOn(SetCandidateOnData { pubkey }),
    );
    assert_eq!(deliver(&state, &own).0.code, code::OK);

    // flipping again is a no-op error
    let again = send_tx(
        &owner,
        3,
        base(),
        TxData::SetCandidateOn(SetCandidateOnData { pubkey }),
    );
    assert_eq!(deliver(&state, &again).0.code, code::CANDIDATE_ALREADY_ONLINE);
}

// ============================================================================
// CHECKS
// ============================================================================

#[test]
fn redeem_check_pays_from_the_issuer() {
    let state = fresh_state();
    let issuer = key(1);
    let redeemer = key(2);
    state.accounts.add_balance(&addr_of(&issuer), &base(), &units(100));
    state.checker().reset();

    let check = Check::issue(
        b"c-1".to_vec(),
        params().chain_id,
        1_000,
        base(),
        units(50),
        "open sesame",
        &issuer,
    );
    let proof = make_proof("open sesame", &addr_of(&redeemer));
    let tx = send_tx(
        &redeemer,
        1,
        base(),
        TxData::RedeemCheck(RedeemCheckData {
            raw_check: check.encode(),
            proof,
        }),
    );
    let (resp, pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);

    let fee = BigUint::from(30u32) * ChainParams::commission_multiplier();
    assert_eq!(
        state.accounts.get_balance(&addr_of(&redeemer), &base()),
        units(50)
    );
    assert_eq!(
        state.accounts.get_balance(&addr_of(&issuer), &base()),
        units(50) - &fee
    );

    // the same check cannot be redeemed twice
    let replay = send_tx(
        &redeemer,
        2,
        base(),
        TxData::RedeemCheck(RedeemCheckData {
            raw_check: check.encode(),
            proof,
        }),
    );
    assert_eq!(deliver(&state, &replay).0.code, code::CHECK_USED);
    settle(&state, &pool);
}

#[test]
fn redeem_check_rejects_wrong_passphrase_and_expiry() {
    let state = fresh_state();
    let issuer = key(1);
    let redeemer = key(2);
    state.accounts.add_balance(&addr_of(&issuer), &base(), &units(100));
    state.checker().reset();

    let check = Check::issue(
        b"c-2".to_vec(),
        params().chain_id,
        1_000,
        base(),
        units(10),
        "right",
        &issuer,
    );
    let bad_proof = make_proof("wrong", &addr_of(&redeemer));
    let tx = send_tx(
        &redeemer,
        1,
        base(),
        TxData::RedeemCheck(RedeemCheckData {
            raw_check: check.encode(),
            proof: bad_proof,
        }),
    );
    assert_eq!(deliver(&state, &tx).0.code, code::CHECK_INVALID_LOCK);

    // expired: due block 50 < current block 100
    let expired = Check::issue(
        b"c-3".to_vec(),
        params().chain_id,
        50,
        base(),
        units(10),
        "right",
        &issuer,
    );
    let tx = send_tx(
        &redeemer,
        1,
        base(),
        TxData::RedeemCheck(RedeemCheckData {
            raw_check: expired.encode(),
            proof: make_proof("right", &addr_of(&redeemer)),
        }),
    );
    assert_eq!(deliver(&state, &tx).0.code, code::CHECK_EXPIRED);
}

// ============================================================================
// MULTISIG
// ============================================================================

#[test]
fn multisig_create_and_spend() {
    let state = fresh_state();
    let creator = key(1);
    let k1 = key(2);
    let k2 = key(3);
    let k3 = key(4);
    state
        .accounts
        .add_balance(&addr_of(&creator), &base(), &units(100));
    state.checker().reset();

    let data = CreateMultisigData {
        threshold: 2,
        weights: vec![1, 1, 1],
        addresses: vec![addr_of(&k1), addr_of(&k2), addr_of(&k3)],
    };
    let tx = send_tx(&creator, 1, base(), TxData::CreateMultisig(data.clone()));
    let (resp, create_pool) = deliver(&state, &tx);
    assert_eq!(resp.code, code::OK, "{}", resp.log);
    settle(&state, &create_pool);

    let wallet = lib_state::Multisig {
        threshold: data.threshold,
        weights: data.weights.clone(),
        addresses: data.addresses.clone(),
    }
    .address();
    assert!(state.accounts.get_multisig(&wallet).is_some());

    // fund the wallet and spend from it with two of three keys
    state.accounts.add_balance(&wallet, &base(), &units(50));
    state.checker().reset();

    let spend = Transaction::unsigned(
        1,
        params().chain_id,
        1,
        base(),
        TxData::Send(SendData {
            coin: base(),
            to: Address::new([9; 20]),
            value: units(10),
        }),
    )
    .sign_multi(wallet, &[&k1, &k3]);
    let (resp, pool) = deliver(&state, &spend);
    assert_eq!(resp.code, code::OK, "{}", resp.log);
    assert_eq!(
        state.accounts.get_balance(&Address::new([9; 20]), &base()),
        units(10)
    );
    settle(&state, &pool);
}

#[test]
fn multisig_below_threshold_is_rejected() {
    let state = fresh_state();
    let k1 = key(2);
    let k2 = key(3);
    let wallet = state.accounts.create_multisig(lib_state::Multisig {
        threshold: 2,
        weights: vec![1, 1],
        addresses: vec![addr_of(&k1), addr_of(&k2)],
    });
    state.accounts.add_balance(&wallet, &base(), &units(50));
    state.checker().reset();

    let spend = Transaction::unsigned(
        1,
        params().chain_id,
        1,
        base(),
        TxData::Send(SendData {
            coin: base(),
            to: Address::new([9; 20]),
            value: units(10),
        }),
    )
    .sign_multi(wallet, &[&k1]);
    let (resp, _) = deliver(&state, &spend);
    assert_eq!(resp.code, code::INCORRECT_MULTI_SIGNATURE);
}
