//! Frozen Funds Store
//!
//! Pending payouts keyed by their release height. Unbond and slashing append
//! funds; the block processor releases a whole height bucket at end-block,
//! crediting each owner through the accounts capability on the bus. Released
//! buckets are deleted atomically, so an invariant of the committed state is
//! that no bucket at or below the current height survives.

use crate::bus::{Bus, FrozenFundsBus};
use crate::keys;
use crate::tree::VersionedTree;
use lib_types::{Address, BlockHeight, CoinSymbol, PublicKey};
use num_bigint::{BigInt, BigUint};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One scheduled payout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenFund {
    pub owner: Address,
    /// The candidate the funds were staked on, when created by unbond/slash
    pub candidate: Option<PublicKey>,
    pub coin: CoinSymbol,
    pub value: BigUint,
}

type Shared<T> = Arc<RwLock<T>>;

/// Typed view over the frozen-funds section of the state tree
#[derive(Clone)]
pub struct FrozenFundsStore {
    tree: Shared<VersionedTree>,
    dirty: Shared<BTreeMap<BlockHeight, Option<Vec<FrozenFund>>>>,
    bus: Bus,
}

impl FrozenFundsStore {
    pub fn new(tree: Shared<VersionedTree>, bus: Bus) -> Self {
        let store = FrozenFundsStore {
            tree,
            dirty: Arc::new(RwLock::new(BTreeMap::new())),
            bus,
        };
        store.bus.register_frozen_funds(Arc::new(store.clone()));
        store
    }

    /// All funds releasing exactly at `height`
    pub fn funds_at(&self, height: BlockHeight) -> Vec<FrozenFund> {
        if let Some(pending) = self.dirty.read().get(&height) {
            return pending.clone().unwrap_or_default();
        }
        self.tree
            .read()
            .get(&keys::frozen_key(height))
            .map(|raw| bincode::deserialize(&raw).expect("corrupt frozen-fund bucket"))
            .unwrap_or_default()
    }

    /// Schedule a payout of `value` in `coin` to `owner` at `height`
    pub fn add_fund(
        &self,
        height: BlockHeight,
        owner: &Address,
        candidate: Option<PublicKey>,
        coin: &CoinSymbol,
        value: &BigUint,
    ) {
        let mut bucket = self.funds_at(height);
        bucket.push(FrozenFund {
            owner: *owner,
            candidate,
            coin: *coin,
            value: value.clone(),
        });
        self.dirty.write().insert(height, Some(bucket));
        self.bus
            .checker()
            .add_holdings(coin, &BigInt::from(value.clone()));
    }

    /// Pay out and delete the bucket at `height`. Returns the released funds
    /// so the caller can log and tag them.
    pub fn release(&self, height: BlockHeight) -> Vec<FrozenFund> {
        let funds = self.funds_at(height);
        if funds.is_empty() {
            return funds;
        }
        let accounts = self.bus.accounts();
        for fund in &funds {
            accounts.add_balance(&fund.owner, &fund.coin, &fund.value);
            self.bus
                .checker()
                .add_holdings(&fund.coin, &-BigInt::from(fund.value.clone()));
        }
        self.dirty.write().insert(height, None);
        funds
    }

    /// Write pending buckets into the state tree
    pub fn flush(&self) {
        let mut dirty = self.dirty.write();
        let mut tree = self.tree.write();
        for (height, pending) in dirty.iter() {
            let key = keys::frozen_key(*height).to_vec();
            match pending {
                Some(bucket) => {
                    let raw = bincode::serialize(bucket).expect("frozen bucket must encode");
                    tree.set(key, raw);
                }
                None => tree.delete(key),
            }
        }
        dirty.clear();
    }

    /// Drop pending buckets
    pub fn rollback(&self) {
        self.dirty.write().clear();
    }
}

impl FrozenFundsBus for FrozenFundsStore {
    fn add_fund(
        &self,
        height: BlockHeight,
        owner: &Address,
        candidate: Option<PublicKey>,
        coin: &CoinSymbol,
        value: &BigUint,
    ) {
        FrozenFundsStore::add_fund(self, height, owner, candidate, coin, value)
    }
}
