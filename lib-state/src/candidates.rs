//! Candidates Store
//!
//! Validator candidates and their delegated stakes. A candidate record keys
//! on the consensus public key; stakes key on (pubkey, delegator, coin) so a
//! candidate's stakes form one contiguous tree range.
//!
//! The store never prices stakes itself: `base_value` and
//! `total_base_stake` are recomputed by the block processor, which owns the
//! coin pricing. Stake mutations report holdings deltas to the auditor;
//! slashing moves every stake into a frozen fund through the bus.

use crate::bus::Bus;
use crate::keys;
use crate::tree::VersionedTree;
use lib_types::{Address, BlockHeight, CoinSymbol, PublicKey};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Participation switch of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateStatus {
    /// Not considered for the validator set
    Offline,
    /// Ranked into the validator-set computation
    Online,
}

/// One candidate record as stored under the state tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub pubkey: PublicKey,
    pub owner: Address,
    pub reward_address: Address,
    /// Percentage of rewards kept by the candidate, in [0, 100]
    pub commission: u32,
    pub status: CandidateStatus,
    pub created_at: BlockHeight,
    /// Base-coin equivalent of all active stakes; refreshed at end-block
    pub total_base_stake: BigUint,
}

/// One delegated stake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub owner: Address,
    pub coin: CoinSymbol,
    pub value: BigUint,
    /// Base-coin equivalent at the last end-block repricing
    pub base_value: BigUint,
}

type Shared<T> = Arc<RwLock<T>>;
type StakeKey = (PublicKey, Address, CoinSymbol);

/// Typed view over the candidates section of the state tree
#[derive(Clone)]
pub struct CandidatesStore {
    tree: Shared<VersionedTree>,
    dirty_candidates: Shared<BTreeMap<PublicKey, Candidate>>,
    dirty_stakes: Shared<BTreeMap<StakeKey, Option<Stake>>>,
    bus: Bus,
}

impl CandidatesStore {
    pub fn new(tree: Shared<VersionedTree>, bus: Bus) -> Self {
        CandidatesStore {
            tree,
            dirty_candidates: Arc::new(RwLock::new(BTreeMap::new())),
            dirty_stakes: Arc::new(RwLock::new(BTreeMap::new())),
            bus,
        }
    }

    /// True when a candidate is declared under `pubkey`
    pub fn exists(&self, pubkey: &PublicKey) -> bool {
        self.get(pubkey).is_some()
    }

    /// The candidate record, if declared
    pub fn get(&self, pubkey: &PublicKey) -> Option<Candidate> {
        if let Some(candidate) = self.dirty_candidates.read().get(pubkey) {
            return Some(candidate.clone());
        }
        self.tree
            .read()
            .get(&keys::candidate_key(pubkey))
            .map(|raw| bincode::deserialize(&raw).expect("corrupt candidate record"))
    }

    /// Register a new candidate
    pub fn declare(&self, candidate: Candidate) {
        assert!(
            !self.exists(&candidate.pubkey),
            "candidate {} already declared",
            candidate.pubkey
        );
        self.dirty_candidates
            .write()
            .insert(candidate.pubkey, candidate);
    }

    /// Flip the participation switch
    pub fn set_status(&self, pubkey: &PublicKey, status: CandidateStatus) {
        let mut candidate = self.get(pubkey).expect("status of unknown candidate");
        candidate.status = status;
        self.dirty_candidates.write().insert(*pubkey, candidate);
    }

    /// Rotate control and reward addresses
    pub fn edit(&self, pubkey: &PublicKey, reward_address: Address, owner: Address) {
        let mut candidate = self.get(pubkey).expect("edit of unknown candidate");
        candidate.reward_address = reward_address;
        candidate.owner = owner;
        self.dirty_candidates.write().insert(*pubkey, candidate);
    }

    /// Value staked by `owner` in `coin` on this candidate
    pub fn stake_of(
        &self,
        pubkey: &PublicKey,
        owner: &Address,
        coin: &CoinSymbol,
    ) -> Option<BigUint> {
        self.get_stake(pubkey, owner, coin).map(|s| s.value)
    }

    fn get_stake(&self, pubkey: &PublicKey, owner: &Address, coin: &CoinSymbol) -> Option<Stake> {
        let key = (*pubkey, *owner, *coin);
        if let Some(pending) = self.dirty_stakes.read().get(&key) {
            return pending.clone();
        }
        self.tree
            .read()
            .get(&keys::stake_key(pubkey, owner, coin))
            .map(|raw| bincode::deserialize(&raw).expect("corrupt stake record"))
    }

    /// Merge `value` into the delegator's stake
    pub fn add_stake(
        &self,
        owner: &Address,
        pubkey: &PublicKey,
        coin: &CoinSymbol,
        value: &BigUint,
    ) {
        if value.is_zero() {
            return;
        }
        let mut stake = self.get_stake(pubkey, owner, coin).unwrap_or(Stake {
            owner: *owner,
            coin: *coin,
            value: BigUint::zero(),
            base_value: BigUint::zero(),
        });
        stake.value += value;
        self.dirty_stakes
            .write()
            .insert((*pubkey, *owner, *coin), Some(stake));
        self.bus
            .checker()
            .add_holdings(coin, &BigInt::from(value.clone()));
    }

    /// Withdraw `value` from the delegator's stake; an emptied stake entry is
    /// removed, not zeroed. Callers validate sufficiency first.
    pub fn sub_stake(
        &self,
        owner: &Address,
        pubkey: &PublicKey,
        coin: &CoinSymbol,
        value: &BigUint,
    ) {
        if value.is_zero() {
            return;
        }
        let mut stake = self
            .get_stake(pubkey, owner, coin)
            .expect("subtracting from a missing stake");
        assert!(
            stake.value >= *value,
            "stake underflow for {} on {}: has {}, subtracting {}",
            owner,
            pubkey,
            stake.value,
            value
        );
        stake.value -= value;
        let key = (*pubkey, *owner, *coin);
        if stake.value.is_zero() {
            self.dirty_stakes.write().insert(key, None);
        } else {
            self.dirty_stakes.write().insert(key, Some(stake));
        }
        self.bus
            .checker()
            .add_holdings(coin, &-BigInt::from(value.clone()));
    }

    /// All stakes of one candidate, sorted by (delegator, coin)
    pub fn stakes(&self, pubkey: &PublicKey) -> Vec<Stake> {
        let mut merged: BTreeMap<StakeKey, Stake> = self
            .tree
            .read()
            .scan_prefix(&keys::stakes_prefix(pubkey))
            .into_iter()
            .filter_map(|(k, raw)| {
                let (pk, owner, coin) = keys::parse_stake_key(&k)?;
                let stake: Stake = bincode::deserialize(&raw).expect("corrupt stake record");
                Some(((pk, owner, coin), stake))
            })
            .collect();
        for (key, pending) in self.dirty_stakes.read().iter() {
            if key.0 != *pubkey {
                continue;
            }
            match pending {
                Some(stake) => {
                    merged.insert(*key, stake.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_values().collect()
    }

    /// Number of distinct stake entries on one candidate
    pub fn stake_count(&self, pubkey: &PublicKey) -> usize {
        self.stakes(pubkey).len()
    }

    /// Store a repriced base-coin equivalent on one stake
    pub fn set_stake_base_value(
        &self,
        pubkey: &PublicKey,
        owner: &Address,
        coin: &CoinSymbol,
        base_value: BigUint,
    ) {
        if let Some(mut stake) = self.get_stake(pubkey, owner, coin) {
            stake.base_value = base_value;
            self.dirty_stakes
                .write()
                .insert((*pubkey, *owner, *coin), Some(stake));
        }
    }

    /// Store the repriced total of one candidate
    pub fn set_total_base_stake(&self, pubkey: &PublicKey, total: BigUint) {
        let mut candidate = self.get(pubkey).expect("repricing unknown candidate");
        candidate.total_base_stake = total;
        self.dirty_candidates.write().insert(*pubkey, candidate);
    }

    /// All declared candidates, sorted by pubkey
    pub fn all(&self) -> Vec<Candidate> {
        let mut merged: BTreeMap<PublicKey, Candidate> = self
            .tree
            .read()
            .scan_prefix(&[keys::PREFIX_CANDIDATE])
            .into_iter()
            .map(|(_, raw)| {
                let candidate: Candidate =
                    bincode::deserialize(&raw).expect("corrupt candidate record");
                (candidate.pubkey, candidate)
            })
            .collect();
        for (pubkey, candidate) in self.dirty_candidates.read().iter() {
            merged.insert(*pubkey, candidate.clone());
        }
        merged.into_values().collect()
    }

    /// Byzantine punishment: every stake of the offender is moved into a
    /// frozen fund releasing at `release_height`, and the candidate drops
    /// offline with zero ranked stake.
    pub fn slash(&self, pubkey: &PublicKey, release_height: BlockHeight) -> usize {
        let stakes = self.stakes(pubkey);
        for stake in &stakes {
            self.sub_stake(&stake.owner, pubkey, &stake.coin, &stake.value);
            self.bus.frozen_funds().add_fund(
                release_height,
                &stake.owner,
                Some(*pubkey),
                &stake.coin,
                &stake.value,
            );
        }
        self.set_total_base_stake(pubkey, BigUint::zero());
        self.set_status(pubkey, CandidateStatus::Offline);
        stakes.len()
    }

    /// Write pending records into the state tree
    pub fn flush(&self) {
        {
            let mut dirty = self.dirty_candidates.write();
            let mut tree = self.tree.write();
            for (pubkey, candidate) in dirty.iter() {
                let raw = bincode::serialize(candidate).expect("candidate record must encode");
                tree.set(keys::candidate_key(pubkey).to_vec(), raw);
            }
            dirty.clear();
        }
        {
            let mut dirty = self.dirty_stakes.write();
            let mut tree = self.tree.write();
            for ((pubkey, owner, coin), pending) in dirty.iter() {
                let key = keys::stake_key(pubkey, owner, coin).to_vec();
                match pending {
                    Some(stake) => {
                        let raw = bincode::serialize(stake).expect("stake record must encode");
                        tree.set(key, raw);
                    }
                    None => tree.delete(key),
                }
            }
            dirty.clear();
        }
    }

    /// Drop pending records
    pub fn rollback(&self) {
        self.dirty_candidates.write().clear();
        self.dirty_stakes.write().clear();
    }
}
