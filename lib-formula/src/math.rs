//! Exact rational-power primitive
//!
//! The bonding-curve formulas need `(num/den)^(p/q)` for small rational
//! exponents. Floating point is banned on the execution path, so the power is
//! computed entirely in `BigUint` arithmetic:
//!
//! ```text
//! (num/den)^(p/q) * PREC  ==  iroot_q( num^p * PREC^q / den^p )
//! ```
//!
//! where `iroot_q` is the exact integer q-th root (floor) and `PREC = 10^18`
//! is the fixed-point scale. Every division floors. The result is therefore
//! a pure function of the inputs, bit-identical on every platform.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;

/// Fixed-point scale of [`pow_ratio`] results
pub fn precision() -> BigUint {
    BigUint::from(10u32).pow(18)
}

/// Reduce an exponent fraction to lowest terms
pub fn reduce_exponent(num: u32, den: u32) -> (u32, u32) {
    let g = num.gcd(&den);
    (num / g, den / g)
}

/// `floor((num/den)^(exp_num/exp_den) * PREC)`
///
/// `den` must be non-zero and the exponent fraction must be in lowest terms
/// with both parts non-zero; violations are programmer errors.
pub fn pow_ratio(num: &BigUint, den: &BigUint, exp_num: u32, exp_den: u32) -> BigUint {
    assert!(!den.is_zero(), "pow_ratio: zero denominator");
    assert!(exp_num > 0 && exp_den > 0, "pow_ratio: zero exponent part");

    let prec = precision();
    let scaled = num.pow(exp_num) * prec.pow(exp_den) / den.pow(exp_num);
    scaled.nth_root(exp_den)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prec() -> BigUint {
        precision()
    }

    #[test]
    fn test_reduce_exponent() {
        assert_eq!(reduce_exponent(50, 100), (1, 2));
        assert_eq!(reduce_exponent(25, 100), (1, 4));
        assert_eq!(reduce_exponent(100, 100), (1, 1));
        assert_eq!(reduce_exponent(33, 100), (33, 100));
        assert_eq!(reduce_exponent(10, 100), (1, 10));
    }

    #[test]
    fn test_identity_exponent() {
        let num = BigUint::from(7u32);
        let den = BigUint::from(4u32);
        // (7/4)^1 = 1.75
        assert_eq!(
            pow_ratio(&num, &den, 1, 1),
            BigUint::from(175u32) * BigUint::from(10u32).pow(16)
        );
    }

    #[test]
    fn test_perfect_square_root() {
        // 4^(1/2) = 2
        let four = BigUint::from(4u32);
        let one = BigUint::from(1u32);
        assert_eq!(pow_ratio(&four, &one, 1, 2), &prec() * 2u32);
    }

    #[test]
    fn test_perfect_fourth_root() {
        // 16^(1/4) = 2
        let num = BigUint::from(16u32);
        let one = BigUint::from(1u32);
        assert_eq!(pow_ratio(&num, &one, 1, 4), &prec() * 2u32);
    }

    #[test]
    fn test_fractional_base() {
        // (1/4)^(1/2) = 0.5
        let one = BigUint::from(1u32);
        let four = BigUint::from(4u32);
        assert_eq!(pow_ratio(&one, &four, 1, 2), prec() / 2u32);
    }

    #[test]
    fn test_result_floors() {
        // 2^(1/2) = 1.41421356237309504880...; the scaled floor is fixed
        let two = BigUint::from(2u32);
        let one = BigUint::from(1u32);
        let root = pow_ratio(&two, &one, 1, 2);
        assert_eq!(root, BigUint::from(1_414_213_562_373_095_048u64));
    }

    #[test]
    fn test_determinism() {
        let num = BigUint::from(987_654_321u64);
        let den = BigUint::from(123_456_789u64);
        let a = pow_ratio(&num, &den, 33, 100);
        let b = pow_ratio(&num, &den, 33, 100);
        assert_eq!(a, b);
    }

    #[test]
    fn test_monotone_in_base() {
        let den = BigUint::from(1000u32);
        let lo = pow_ratio(&BigUint::from(1500u32), &den, 1, 2);
        let hi = pow_ratio(&BigUint::from(1600u32), &den, 1, 2);
        assert!(lo < hi);
    }

    #[test]
    #[should_panic(expected = "zero denominator")]
    fn test_zero_denominator_is_programmer_error() {
        pow_ratio(&BigUint::from(1u32), &BigUint::zero(), 1, 2);
    }
}
