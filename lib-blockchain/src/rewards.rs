//! Block Reward Distribution
//!
//! The per-block reward is the height-scheduled emission plus every
//! commission collected in the block. It goes to the proposer's candidate:
//! the candidate's commission percentage to its reward address, the rest
//! pro-rata across the active stakes by base-coin-equivalent value. Division
//! dust is swept to the reward address so the distributed total is exact.

use lib_state::State;
use lib_types::PublicKey;
use num_bigint::BigUint;
use num_traits::Zero;

/// Pay `total` base coins to the candidate behind `pubkey`.
/// Returns false (and pays nothing) when the candidate is unknown.
pub fn distribute(state: &State, pubkey: &PublicKey, total: &BigUint) -> bool {
    if total.is_zero() {
        return true;
    }
    let Some(candidate) = state.candidates.get(pubkey) else {
        return false;
    };
    let base = state.coins.base_coin();

    let commission_cut = total * candidate.commission / 100u32;
    let mut distributed = commission_cut.clone();
    state
        .accounts
        .add_balance(&candidate.reward_address, &base, &commission_cut);

    let rest = total - &commission_cut;
    let mut stakes = state.candidates.stakes(pubkey);
    stakes.sort_by(|a, b| {
        b.base_value
            .cmp(&a.base_value)
            .then_with(|| (a.owner, a.coin).cmp(&(b.owner, b.coin)))
    });
    stakes.truncate(state.params().max_candidate_stakes);

    let total_base: BigUint = stakes.iter().map(|s| s.base_value.clone()).sum();
    if !total_base.is_zero() {
        for stake in &stakes {
            let share = &rest * &stake.base_value / &total_base;
            if share.is_zero() {
                continue;
            }
            state.accounts.add_balance(&stake.owner, &base, &share);
            distributed += &share;
        }
    }

    // rounding dust (and the whole rest, when nothing is staked) goes to the
    // reward address so the paid total is exactly `total`
    let dust = total - &distributed;
    state
        .accounts
        .add_balance(&candidate.reward_address, &base, &dust);
    true
}
