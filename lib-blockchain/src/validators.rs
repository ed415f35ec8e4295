//! Validator-Set Computation
//!
//! At end-block every stake is repriced into its base-coin equivalent (what
//! the staked coins would fetch on their bonding curve), candidates are
//! ranked, and the top `max_validators` online candidates with at least one
//! whole base coin of stake form the next validator set. The engine receives
//! only the diff against the previous set.

use crate::abi::ValidatorUpdate;
use lib_formula::sale_return;
use lib_state::{CandidateStatus, State};
use lib_types::{ChainParams, PublicKey};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use std::collections::BTreeMap;

/// Reprice every candidate's stakes and refresh the ranked totals.
/// A candidate's total counts only the value-ranked prefix of
/// `max_candidate_stakes` stakes; anything beyond it is inactive.
pub fn recalculate_stakes(state: &State) {
    let max_stakes = state.params().max_candidate_stakes;
    for candidate in state.candidates.all() {
        let stakes = state.candidates.stakes(&candidate.pubkey);

        let mut repriced: Vec<(lib_types::Address, lib_types::CoinSymbol, BigUint)> = stakes
            .iter()
            .map(|stake| {
                let base_value = if state.coins.is_base(&stake.coin) {
                    stake.value.clone()
                } else {
                    let coin = state
                        .coins
                        .get(&stake.coin)
                        .expect("staked coin must exist");
                    sale_return(&coin.volume, &coin.reserve, coin.crr, &stake.value)
                };
                (stake.owner, stake.coin, base_value)
            })
            .collect();

        for (owner, coin, base_value) in &repriced {
            state
                .candidates
                .set_stake_base_value(&candidate.pubkey, owner, coin, base_value.clone());
        }

        // ranked prefix: largest base values first, ties broken by key order
        repriced.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| (a.0, a.1).cmp(&(b.0, b.1))));
        let total: BigUint = repriced
            .iter()
            .take(max_stakes)
            .map(|(_, _, base_value)| base_value.clone())
            .sum();
        state
            .candidates
            .set_total_base_stake(&candidate.pubkey, total);
    }
}

/// The next validator set: top `max_validators` online candidates by total
/// base-equivalent stake, powered by whole base coins
pub fn compute_validator_set(state: &State) -> Vec<(PublicKey, u64)> {
    let unit = ChainParams::unit();
    let mut ranked: Vec<_> = state
        .candidates
        .all()
        .into_iter()
        .filter(|c| c.status == CandidateStatus::Online && !c.total_base_stake.is_zero())
        .collect();
    ranked.sort_by(|a, b| {
        b.total_base_stake
            .cmp(&a.total_base_stake)
            .then_with(|| a.pubkey.cmp(&b.pubkey))
    });

    ranked
        .into_iter()
        .take(state.params().max_validators)
        .filter_map(|c| {
            let power = (&c.total_base_stake / &unit).to_u64()?;
            if power == 0 {
                return None;
            }
            Some((c.pubkey, power))
        })
        .collect()
}

/// Diff two validator sets into engine updates: changed powers plus explicit
/// zero-power removals, in pubkey order
pub fn validator_updates(
    previous: &[(PublicKey, u64)],
    next: &[(PublicKey, u64)],
) -> Vec<ValidatorUpdate> {
    let prev: BTreeMap<PublicKey, u64> = previous.iter().copied().collect();
    let new: BTreeMap<PublicKey, u64> = next.iter().copied().collect();

    let mut updates = Vec::new();
    for (pubkey, power) in &new {
        if prev.get(pubkey) != Some(power) {
            updates.push(ValidatorUpdate {
                pubkey: *pubkey,
                power: *power,
            });
        }
    }
    for pubkey in prev.keys() {
        if !new.contains_key(pubkey) {
            updates.push(ValidatorUpdate {
                pubkey: *pubkey,
                power: 0,
            });
        }
    }
    updates.sort_by_key(|u| u.pubkey);
    updates
}
