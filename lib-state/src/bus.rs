//! Cross-Cutting Store Bus
//!
//! The entity stores form a cyclic dependency graph (frozen funds credit
//! accounts, slashing freezes stakes, every store reports deltas to the
//! invariant checker). Direct references between stores would make that cycle
//! literal, so each store instead depends on the narrow capability trait of
//! what it needs and the concrete implementation is registered on this bus at
//! construction time.
//!
//! A capability trait exposes ONLY the operations a sibling store
//! legitimately needs. Widening one is a design decision, not a convenience.

use lib_types::{Address, BlockHeight, CoinSymbol, PublicKey};
use num_bigint::{BigInt, BigUint};
use parking_lot::RwLock;
use std::sync::Arc;

/// What other stores may ask of the accounts store
pub trait AccountsBus: Send + Sync {
    /// Credit `value` of `coin` to `addr`
    fn add_balance(&self, addr: &Address, coin: &CoinSymbol, value: &BigUint);
}

/// What other stores may ask of the frozen-funds store
pub trait FrozenFundsBus: Send + Sync {
    /// Schedule `value` of `coin` for release to `owner` at `height`
    fn add_fund(
        &self,
        height: BlockHeight,
        owner: &Address,
        candidate: Option<PublicKey>,
        coin: &CoinSymbol,
        value: &BigUint,
    );
}

/// Delta reporting into the conservation auditor
pub trait CheckerBus: Send + Sync {
    /// Net change of liquid+staked+frozen holdings of `coin`
    fn add_holdings(&self, coin: &CoinSymbol, delta: &BigInt);
    /// Net change of the circulating volume of `coin`
    fn add_volume(&self, coin: &CoinSymbol, delta: &BigInt);
    /// Net change of a coin's base-coin reserve
    fn add_reserve(&self, delta: &BigInt);
    /// Newly emitted base coin (block rewards)
    fn add_issued(&self, delta: &BigInt);
}

#[derive(Default)]
struct BusInner {
    accounts: Option<Arc<dyn AccountsBus>>,
    frozen_funds: Option<Arc<dyn FrozenFundsBus>>,
    checker: Option<Arc<dyn CheckerBus>>,
}

/// Registry of store capabilities, shared by every store of one state
#[derive(Clone, Default)]
pub struct Bus {
    inner: Arc<RwLock<BusInner>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_accounts(&self, accounts: Arc<dyn AccountsBus>) {
        self.inner.write().accounts = Some(accounts);
    }

    pub fn register_frozen_funds(&self, frozen_funds: Arc<dyn FrozenFundsBus>) {
        self.inner.write().frozen_funds = Some(frozen_funds);
    }

    pub fn register_checker(&self, checker: Arc<dyn CheckerBus>) {
        self.inner.write().checker = Some(checker);
    }

    /// The accounts capability. Missing registration is a wiring bug.
    pub fn accounts(&self) -> Arc<dyn AccountsBus> {
        self.inner
            .read()
            .accounts
            .clone()
            .expect("accounts store not registered on the bus")
    }

    /// The frozen-funds capability. Missing registration is a wiring bug.
    pub fn frozen_funds(&self) -> Arc<dyn FrozenFundsBus> {
        self.inner
            .read()
            .frozen_funds
            .clone()
            .expect("frozen-funds store not registered on the bus")
    }

    /// The checker capability. Missing registration is a wiring bug.
    pub fn checker(&self) -> Arc<dyn CheckerBus> {
        self.inner
            .read()
            .checker
            .clone()
            .expect("checker not registered on the bus")
    }
}
