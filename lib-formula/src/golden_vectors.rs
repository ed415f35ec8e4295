//! Golden Vector Tests for the Bonding Curve
//!
//! These tests define EXACT expected outputs for specific inputs. If any of
//! these tests fail, it indicates a consensus-breaking change: every node
//! must compute these values bit-identically.
//!
//! # Updating Golden Vectors
//!
//! If you need to change the pricing math:
//! 1. Update the curve/power code
//! 2. Update these golden vectors with new expected values
//! 3. Treat the change as a protocol upgrade (app version bump)

#[cfg(test)]
mod tests {
    use crate::curve::{purchase_amount, purchase_return, sale_amount, sale_return};
    use num_bigint::BigUint;

    fn unit() -> BigUint {
        BigUint::from(10u32).pow(18)
    }

    // =========================================================================
    // GOLDEN VECTOR: linear coin (crr = 100)
    // =========================================================================

    /// Linear coin at 1:1 reserve; every conversion is the identity rate.
    ///
    /// supply = reserve = 10^21, deposit = 5 * 10^18:
    /// return = supply * deposit / reserve = 5 * 10^18 exactly.
    #[test]
    fn golden_linear_one_to_one() {
        let supply = &unit() * 1000u32;
        let reserve = &unit() * 1000u32;
        let deposit = &unit() * 5u32;

        assert_eq!(purchase_return(&supply, &reserve, 100, &deposit), deposit);
        assert_eq!(sale_return(&supply, &reserve, 100, &deposit), deposit);
        assert_eq!(purchase_amount(&supply, &reserve, 100, &deposit), deposit);
        assert_eq!(sale_amount(&supply, &reserve, 100, &deposit), deposit);
    }

    // =========================================================================
    // GOLDEN VECTOR: crr 50, doubling deposit
    // =========================================================================

    /// crr 50, supply = reserve = 10^18, deposit = 10^18.
    ///
    /// growth factor = (1 + 1)^(1/2) = sqrt(2)
    /// scaled floor  = 1_414_213_562_373_095_048
    /// return        = supply * (sqrt(2) - 1) = 414_213_562_373_095_048
    #[test]
    fn golden_sqrt_two_purchase() {
        let one = unit();
        let out = purchase_return(&one, &one, 50, &one);

        // GOLDEN VECTOR: this exact value MUST NOT change
        assert_eq!(out, BigUint::from(414_213_562_373_095_048u64));
    }

    /// crr 25, supply = reserve = 10^18, deposit = 10^18.
    ///
    /// growth factor = 2^(1/4) = 1.189207115002721066...
    /// return        = 189_207_115_002_721_066
    #[test]
    fn golden_fourth_root_purchase() {
        let one = unit();
        let out = purchase_return(&one, &one, 25, &one);

        // GOLDEN VECTOR: this exact value MUST NOT change
        assert_eq!(out, BigUint::from(189_207_115_002_721_066u64));
    }

    /// crr 50, supply = reserve = 10^18, selling half the supply.
    ///
    /// remaining factor = (1/2)^(1/2) = 0.707106781186547524...
    /// refund           = 292_893_218_813_452_476
    #[test]
    fn golden_half_supply_sale() {
        let one = unit();
        let half = &one / 2u32;
        let out = sale_return(&one, &one, 50, &half);

        // GOLDEN VECTOR: this exact value MUST NOT change
        assert_eq!(out, BigUint::from(292_893_218_813_452_476u64));
    }

    // =========================================================================
    // GOLDEN VECTOR: perfect powers stay exact at chain scale
    // =========================================================================

    /// crr 50 with the reserve quadrupling: sqrt(4) = 2 exactly, so the
    /// supply exactly doubles even at 10^24-unit magnitudes.
    #[test]
    fn golden_perfect_square_at_scale() {
        let supply = &unit() * 1_000_000u32;
        let reserve = &unit() * 1_000_000u32;
        let deposit = &reserve * 3u32;

        assert_eq!(purchase_return(&supply, &reserve, 50, &deposit), supply);
    }

    /// crr 50 inverse: minting 100% more supply costs 3x the reserve.
    #[test]
    fn golden_perfect_square_amount() {
        let supply = &unit() * 1_000_000u32;
        let reserve = &unit() * 1_000_000u32;

        assert_eq!(
            purchase_amount(&supply, &reserve, 50, &supply),
            &reserve * 3u32
        );
    }
}
