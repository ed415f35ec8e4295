//! Commission Table
//!
//! Per-kind gas constants. Gas is priced in thousandths of a base coin
//! (`ChainParams::commission_multiplier`), multiplied by the envelope gas
//! price at execution time. These values are PROTOCOL.

use lib_types::ChainParams;
use num_bigint::BigUint;

pub const SEND_TX: i64 = 10;
pub const CONVERT_TX: i64 = 100;
pub const DECLARE_CANDIDACY_TX: i64 = 10_000;
pub const DELEGATE_TX: i64 = 200;
pub const UNBOND_TX: i64 = 200;
pub const TOGGLE_CANDIDATE_STATUS_TX: i64 = 100;
pub const EDIT_CANDIDATE_TX: i64 = 10_000;
pub const REDEEM_CHECK_TX: i64 = 30;
pub const CREATE_MULTISIG_TX: i64 = 100;

/// Multisend: base price plus a delta per recipient beyond the first
pub const MULTISEND_BASE: i64 = 10;
pub const MULTISEND_DELTA: i64 = 5;

/// Every payload byte costs extra gas on top of the kind constant
pub const PAYLOAD_BYTE_GAS: i64 = 2;

/// Gas price of registering a coin, scaled by symbol length: short symbols
/// are scarce and expensive (3 letters = 1000 base coins, 7+ = 0.1)
pub const fn create_coin_gas(symbol_len: usize) -> i64 {
    match symbol_len {
        3 => 1_000_000,
        4 => 100_000,
        5 => 10_000,
        6 => 1_000,
        _ => 100,
    }
}

/// Floor below which no coin's reserve may fall (solvency guard)
pub fn min_coin_reserve() -> BigUint {
    ChainParams::unit() * 1000u32
}

/// Hard cap on any coin's `max_supply`
pub fn max_coin_supply() -> BigUint {
    BigUint::from(10u32).pow(15) * ChainParams::unit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_coin_gas_favors_long_symbols() {
        assert_eq!(create_coin_gas(3), 1_000_000);
        assert_eq!(create_coin_gas(4), 100_000);
        assert_eq!(create_coin_gas(5), 10_000);
        assert_eq!(create_coin_gas(6), 1_000);
        assert_eq!(create_coin_gas(7), 100);
        assert_eq!(create_coin_gas(10), 100);
    }

    #[test]
    fn test_three_letter_symbol_costs_a_thousand_coins() {
        let cost = BigUint::from(create_coin_gas(3) as u64) * ChainParams::commission_multiplier();
        assert_eq!(cost, ChainParams::unit() * 1000u32);
    }

    #[test]
    fn test_min_reserve_scale() {
        assert_eq!(min_coin_reserve(), BigUint::from(10u32).pow(21));
    }
}
