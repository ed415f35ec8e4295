//! Accounts Store
//!
//! Balances, nonces, and multisig descriptors, keyed by address. All writes
//! land in an in-memory dirty map and reach the state tree only on flush;
//! every balance mutation reports its holdings delta to the conservation
//! auditor through the bus.
//!
//! Zero balances are never stored: subtracting a balance down to zero removes
//! the entry, keeping the committed byte image canonical.

use crate::bus::{AccountsBus, Bus};
use crate::keys;
use crate::tree::VersionedTree;
use lib_types::{Address, CoinSymbol, Nonce};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Multi-signature descriptor attached to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multisig {
    pub threshold: u32,
    pub weights: Vec<u32>,
    pub addresses: Vec<Address>,
}

impl Multisig {
    /// The deterministic address of this multisig wallet
    pub fn address(&self) -> Address {
        let mut hasher = Sha3_256::new();
        hasher.update(self.threshold.to_be_bytes());
        hasher.update((self.addresses.len() as u32).to_be_bytes());
        for (addr, weight) in self.addresses.iter().zip(&self.weights) {
            hasher.update(addr.as_bytes());
            hasher.update(weight.to_be_bytes());
        }
        let digest: [u8; 32] = hasher.finalize().into();
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address::new(out)
    }

    /// Voting weight of one signer, if they participate
    pub fn weight_of(&self, addr: &Address) -> Option<u32> {
        self.addresses
            .iter()
            .position(|a| a == addr)
            .map(|i| self.weights[i])
    }

    /// Sum of all signer weights
    pub fn total_weight(&self) -> u64 {
        self.weights.iter().map(|w| *w as u64).sum()
    }
}

/// One account record as stored under the state tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub nonce: Nonce,
    pub balances: BTreeMap<CoinSymbol, BigUint>,
    pub multisig: Option<Multisig>,
}

type Shared<T> = Arc<RwLock<T>>;

/// Typed view over the accounts section of the state tree
#[derive(Clone)]
pub struct AccountsStore {
    tree: Shared<VersionedTree>,
    dirty: Shared<BTreeMap<Address, Account>>,
    bus: Bus,
}

impl AccountsStore {
    pub fn new(tree: Shared<VersionedTree>, bus: Bus) -> Self {
        let store = AccountsStore {
            tree,
            dirty: Arc::new(RwLock::new(BTreeMap::new())),
            bus,
        };
        store.bus.register_accounts(Arc::new(store.clone()));
        store
    }

    /// The account record, if it exists
    pub fn get(&self, addr: &Address) -> Option<Account> {
        if let Some(account) = self.dirty.read().get(addr) {
            return Some(account.clone());
        }
        self.tree
            .read()
            .get(&keys::account_key(addr))
            .map(|raw| bincode::deserialize(&raw).expect("corrupt account record"))
    }

    /// True when the address has ever been written
    pub fn exists(&self, addr: &Address) -> bool {
        self.get(addr).is_some()
    }

    /// Balance of `coin` held by `addr` (zero when absent)
    pub fn get_balance(&self, addr: &Address, coin: &CoinSymbol) -> BigUint {
        self.get(addr)
            .and_then(|acc| acc.balances.get(coin).cloned())
            .unwrap_or_default()
    }

    /// All balances of `addr`, sorted by coin symbol
    pub fn balances(&self, addr: &Address) -> BTreeMap<CoinSymbol, BigUint> {
        self.get(addr).map(|acc| acc.balances).unwrap_or_default()
    }

    /// Current nonce of `addr` (zero when the account is unknown)
    pub fn get_nonce(&self, addr: &Address) -> Nonce {
        self.get(addr).map(|acc| acc.nonce).unwrap_or(0)
    }

    /// Record the nonce of the latest accepted transaction
    pub fn set_nonce(&self, addr: &Address, nonce: Nonce) {
        let mut account = self.get(addr).unwrap_or_default();
        account.nonce = nonce;
        self.dirty.write().insert(*addr, account);
    }

    /// Credit `value` of `coin` to `addr`
    pub fn add_balance(&self, addr: &Address, coin: &CoinSymbol, value: &BigUint) {
        if value.is_zero() {
            return;
        }
        let mut account = self.get(addr).unwrap_or_default();
        let balance = account.balances.entry(*coin).or_default();
        *balance += value;
        self.dirty.write().insert(*addr, account);
        self.bus
            .checker()
            .add_holdings(coin, &BigInt::from(value.clone()));
    }

    /// Debit `value` of `coin` from `addr`; the emptied entry is removed.
    /// Callers validate sufficiency first, so underflow here is fatal.
    pub fn sub_balance(&self, addr: &Address, coin: &CoinSymbol, value: &BigUint) {
        if value.is_zero() {
            return;
        }
        let mut account = self.get(addr).unwrap_or_default();
        let balance = account.balances.get(coin).cloned().unwrap_or_default();
        assert!(
            balance >= *value,
            "balance underflow for {} in {}: has {}, subtracting {}",
            addr,
            coin,
            balance,
            value
        );
        let remaining = balance - value;
        if remaining.is_zero() {
            account.balances.remove(coin);
        } else {
            account.balances.insert(*coin, remaining);
        }
        self.dirty.write().insert(*addr, account);
        self.bus
            .checker()
            .add_holdings(coin, &-BigInt::from(value.clone()));
    }

    /// Multisig descriptor of `addr`, if the account is a multisig wallet
    pub fn get_multisig(&self, addr: &Address) -> Option<Multisig> {
        self.get(addr).and_then(|acc| acc.multisig)
    }

    /// Attach a multisig descriptor at its derived address
    pub fn create_multisig(&self, multisig: Multisig) -> Address {
        let addr = multisig.address();
        let mut account = self.get(&addr).unwrap_or_default();
        account.multisig = Some(multisig);
        self.dirty.write().insert(addr, account);
        addr
    }

    /// Write pending records into the state tree
    pub fn flush(&self) {
        let mut dirty = self.dirty.write();
        let mut tree = self.tree.write();
        for (addr, account) in dirty.iter() {
            let raw = bincode::serialize(account).expect("account record must encode");
            tree.set(keys::account_key(addr).to_vec(), raw);
        }
        dirty.clear();
    }

    /// Drop pending records
    pub fn rollback(&self) {
        self.dirty.write().clear();
    }
}

impl AccountsBus for AccountsStore {
    fn add_balance(&self, addr: &Address, coin: &CoinSymbol, value: &BigUint) {
        AccountsStore::add_balance(self, addr, coin, value)
    }
}
