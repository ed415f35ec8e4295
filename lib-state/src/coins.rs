//! Coins Store
//!
//! Bonding-curve coin records keyed by symbol. The base coin is special: it
//! has no record, no reserve, and no crr; `is_base` short-circuits every
//! lookup. Volume and reserve mutations report their deltas to the
//! conservation auditor.

use crate::bus::Bus;
use crate::keys;
use crate::tree::VersionedTree;
use lib_types::CoinSymbol;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One bonding-curve coin as stored under the state tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub symbol: CoinSymbol,
    pub name: String,
    /// Circulating supply
    pub volume: BigUint,
    /// Base-coin backing
    pub reserve: BigUint,
    /// Constant reserve ratio, percent
    pub crr: u32,
    /// Hard cap on `volume`
    pub max_supply: BigUint,
}

type Shared<T> = Arc<RwLock<T>>;

/// Typed view over the coins section of the state tree
#[derive(Clone)]
pub struct CoinsStore {
    base_coin: CoinSymbol,
    tree: Shared<VersionedTree>,
    dirty: Shared<BTreeMap<CoinSymbol, Coin>>,
    bus: Bus,
}

impl CoinsStore {
    pub fn new(base_coin: CoinSymbol, tree: Shared<VersionedTree>, bus: Bus) -> Self {
        CoinsStore {
            base_coin,
            tree,
            dirty: Arc::new(RwLock::new(BTreeMap::new())),
            bus,
        }
    }

    /// True for the distinguished base coin
    pub fn is_base(&self, symbol: &CoinSymbol) -> bool {
        *symbol == self.base_coin
    }

    /// The base coin symbol this store was configured with
    pub fn base_coin(&self) -> CoinSymbol {
        self.base_coin
    }

    /// True when `symbol` is the base coin or a registered coin
    pub fn exists(&self, symbol: &CoinSymbol) -> bool {
        self.is_base(symbol) || self.get(symbol).is_some()
    }

    /// The coin record; `None` for unknown symbols and for the base coin
    pub fn get(&self, symbol: &CoinSymbol) -> Option<Coin> {
        if self.is_base(symbol) {
            return None;
        }
        if let Some(coin) = self.dirty.read().get(symbol) {
            return Some(coin.clone());
        }
        self.tree
            .read()
            .get(&keys::coin_key(symbol))
            .map(|raw| bincode::deserialize(&raw).expect("corrupt coin record"))
    }

    /// Register a freshly created coin
    pub fn create(&self, coin: Coin) {
        assert!(
            !self.exists(&coin.symbol),
            "coin {} already exists",
            coin.symbol
        );
        self.bus
            .checker()
            .add_volume(&coin.symbol, &BigInt::from(coin.volume.clone()));
        self.bus
            .checker()
            .add_reserve(&BigInt::from(coin.reserve.clone()));
        self.dirty.write().insert(coin.symbol, coin);
    }

    /// Grow the circulating supply
    pub fn add_volume(&self, symbol: &CoinSymbol, value: &BigUint) {
        if value.is_zero() {
            return;
        }
        let mut coin = self.get(symbol).expect("volume of unknown coin");
        coin.volume += value;
        self.dirty.write().insert(*symbol, coin);
        self.bus
            .checker()
            .add_volume(symbol, &BigInt::from(value.clone()));
    }

    /// Shrink the circulating supply. Callers validate first; underflow is fatal.
    pub fn sub_volume(&self, symbol: &CoinSymbol, value: &BigUint) {
        if value.is_zero() {
            return;
        }
        let mut coin = self.get(symbol).expect("volume of unknown coin");
        assert!(
            coin.volume >= *value,
            "volume underflow for {}: has {}, subtracting {}",
            symbol,
            coin.volume,
            value
        );
        coin.volume -= value;
        self.dirty.write().insert(*symbol, coin);
        self.bus
            .checker()
            .add_volume(symbol, &-BigInt::from(value.clone()));
    }

    /// Grow the base-coin reserve
    pub fn add_reserve(&self, symbol: &CoinSymbol, value: &BigUint) {
        if value.is_zero() {
            return;
        }
        let mut coin = self.get(symbol).expect("reserve of unknown coin");
        coin.reserve += value;
        self.dirty.write().insert(*symbol, coin);
        self.bus.checker().add_reserve(&BigInt::from(value.clone()));
    }

    /// Shrink the base-coin reserve. Callers validate first; underflow is fatal.
    pub fn sub_reserve(&self, symbol: &CoinSymbol, value: &BigUint) {
        if value.is_zero() {
            return;
        }
        let mut coin = self.get(symbol).expect("reserve of unknown coin");
        assert!(
            coin.reserve >= *value,
            "reserve underflow for {}: has {}, subtracting {}",
            symbol,
            coin.reserve,
            value
        );
        coin.reserve -= value;
        self.dirty.write().insert(*symbol, coin);
        self.bus
            .checker()
            .add_reserve(&-BigInt::from(value.clone()));
    }

    /// All registered coins, sorted by symbol (query surface)
    pub fn all(&self) -> Vec<Coin> {
        let mut merged: BTreeMap<CoinSymbol, Coin> = self
            .tree
            .read()
            .scan_prefix(&[keys::PREFIX_COIN])
            .into_iter()
            .map(|(_, raw)| {
                let coin: Coin = bincode::deserialize(&raw).expect("corrupt coin record");
                (coin.symbol, coin)
            })
            .collect();
        for (symbol, coin) in self.dirty.read().iter() {
            merged.insert(*symbol, coin.clone());
        }
        merged.into_values().collect()
    }

    /// Write pending records into the state tree
    pub fn flush(&self) {
        let mut dirty = self.dirty.write();
        let mut tree = self.tree.write();
        for (symbol, coin) in dirty.iter() {
            let raw = bincode::serialize(coin).expect("coin record must encode");
            tree.set(keys::coin_key(symbol).to_vec(), raw);
        }
        dirty.clear();
    }

    /// Drop pending records
    pub fn rollback(&self) {
        self.dirty.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Checker;
    use lib_types::ChainParams;

    fn store() -> (CoinsStore, Checker) {
        let params = ChainParams::for_testing();
        let tree = Arc::new(RwLock::new(VersionedTree::in_memory(4).unwrap()));
        let bus = Bus::new();
        let checker = Checker::new(&params);
        bus.register_checker(Arc::new(checker.clone()));
        (CoinsStore::new(params.base_coin, tree, bus), checker)
    }

    fn coin(symbol: &str) -> Coin {
        Coin {
            symbol: CoinSymbol::parse(symbol).unwrap(),
            name: format!("{} coin", symbol),
            volume: BigUint::from(1_000u32),
            reserve: BigUint::from(1_000u32),
            crr: 50,
            max_supply: BigUint::from(1_000_000u32),
        }
    }

    #[test]
    fn test_base_coin_is_special() {
        let (coins, _) = store();
        let base = coins.base_coin();
        assert!(coins.is_base(&base));
        assert!(coins.exists(&base));
        assert!(coins.get(&base).is_none());
    }

    #[test]
    fn test_create_and_get() {
        let (coins, _) = store();
        let abc = coin("ABC");
        coins.create(abc.clone());

        assert!(coins.exists(&abc.symbol));
        assert_eq!(coins.get(&abc.symbol), Some(abc));
        assert!(!coins.exists(&CoinSymbol::parse("DEF").unwrap()));
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn test_double_create_is_fatal() {
        let (coins, _) = store();
        coins.create(coin("ABC"));
        coins.create(coin("ABC"));
    }

    #[test]
    fn test_volume_and_reserve_mutations() {
        let (coins, _) = store();
        let abc = coin("ABC");
        let symbol = abc.symbol;
        coins.create(abc);

        coins.add_volume(&symbol, &BigUint::from(500u32));
        coins.sub_reserve(&symbol, &BigUint::from(100u32));

        let stored = coins.get(&symbol).unwrap();
        assert_eq!(stored.volume, BigUint::from(1_500u32));
        assert_eq!(stored.reserve, BigUint::from(900u32));
    }

    #[test]
    #[should_panic(expected = "reserve underflow")]
    fn test_reserve_underflow_is_fatal() {
        let (coins, _) = store();
        let abc = coin("ABC");
        let symbol = abc.symbol;
        coins.create(abc);
        coins.sub_reserve(&symbol, &BigUint::from(10_000u32));
    }

    #[test]
    fn test_flush_and_all() {
        let (coins, _) = store();
        coins.create(coin("AAA"));
        coins.create(coin("BBB"));
        coins.flush();
        coins.create(coin("CCC"));

        let all: Vec<String> = coins.all().iter().map(|c| c.symbol.to_string()).collect();
        assert_eq!(all, vec!["AAA", "BBB", "CCC"]);
    }
}
