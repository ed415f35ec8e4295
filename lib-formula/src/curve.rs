//! Bonding-Curve Pricing (Pure Functions)
//!
//! Bancor-style constant-reserve-ratio pricing over arbitrary-precision
//! integers. With supply `S`, reserve `R` and ratio `c = crr/100`:
//!
//! - purchase return: `S * ((1 + deposit/R)^c - 1)`
//! - sale return:     `R * (1 - (1 - sold/S)^c)`
//! - purchase amount: `R * ((1 + wanted/S)^(1/c) - 1)`
//! - sale amount:     `S * (1 - (1 - wanted/R)^(1/c))`
//!
//! # Rules (enforced in code)
//!
//! - No floats - all arithmetic is integer, floored at every division
//! - `crr == 100` reduces to the exact linear forms
//! - Deterministic across all platforms - same inputs, same bits
//!
//! Callers are responsible for solvency: supply and reserve must be positive
//! wherever they divide, and `crr` must be in `[10, 100]`. Violations are
//! programmer errors, not recoverable conditions.

use crate::math::{pow_ratio, precision, reduce_exponent};
use num_bigint::BigUint;
use num_traits::Zero;

/// Lower bound of the constant reserve ratio, percent
pub const MIN_CRR: u32 = 10;

/// Upper bound of the constant reserve ratio, percent
pub const MAX_CRR: u32 = 100;

fn check_crr(crr: u32) {
    assert!(
        (MIN_CRR..=MAX_CRR).contains(&crr),
        "crr {} outside [{}, {}]",
        crr,
        MIN_CRR,
        MAX_CRR
    );
}

/// Coins minted for depositing `deposit` base coins
pub fn purchase_return(
    supply: &BigUint,
    reserve: &BigUint,
    crr: u32,
    deposit: &BigUint,
) -> BigUint {
    check_crr(crr);
    if deposit.is_zero() {
        return BigUint::zero();
    }
    if crr == MAX_CRR {
        return supply * deposit / reserve;
    }

    let (p, q) = reduce_exponent(crr, 100);
    let prec = precision();
    let grown = pow_ratio(&(reserve + deposit), reserve, p, q);
    supply * (grown - &prec) / prec
}

/// Base coins refunded for burning `sold` coins
pub fn sale_return(supply: &BigUint, reserve: &BigUint, crr: u32, sold: &BigUint) -> BigUint {
    check_crr(crr);
    if sold.is_zero() {
        return BigUint::zero();
    }
    if sold >= supply {
        // burning the whole supply (or more) drains the whole reserve
        return reserve.clone();
    }
    if crr == MAX_CRR {
        return reserve * sold / supply;
    }

    let (p, q) = reduce_exponent(crr, 100);
    let prec = precision();
    let remaining = pow_ratio(&(supply - sold), supply, p, q);
    reserve * (&prec - remaining) / prec
}

/// Base-coin deposit required to mint `wanted` coins
pub fn purchase_amount(
    supply: &BigUint,
    reserve: &BigUint,
    crr: u32,
    wanted: &BigUint,
) -> BigUint {
    check_crr(crr);
    if wanted.is_zero() {
        return BigUint::zero();
    }
    if crr == MAX_CRR {
        return reserve * wanted / supply;
    }

    // the exponent of the inverse curve is 1/c = q/p
    let (p, q) = reduce_exponent(crr, 100);
    let prec = precision();
    let grown = pow_ratio(&(supply + wanted), supply, q, p);
    reserve * (grown - &prec) / prec
}

/// Coins that must be burned to obtain `wanted_base` base coins
pub fn sale_amount(
    supply: &BigUint,
    reserve: &BigUint,
    crr: u32,
    wanted_base: &BigUint,
) -> BigUint {
    check_crr(crr);
    if wanted_base.is_zero() {
        return BigUint::zero();
    }
    if wanted_base >= reserve {
        // draining the whole reserve burns the whole supply
        return supply.clone();
    }
    if crr == MAX_CRR {
        return supply * wanted_base / reserve;
    }

    let (p, q) = reduce_exponent(crr, 100);
    let prec = precision();
    let remaining = pow_ratio(&(reserve - wanted_base), reserve, q, p);
    supply * (&prec - remaining) / prec
}
