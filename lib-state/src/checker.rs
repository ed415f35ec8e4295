//! Conservation Auditor
//!
//! Every store reports its deltas here through the bus while a block is being
//! applied. At commit the deltas must cancel out:
//!
//! - per non-base coin: holdings delta (balances + stakes + frozen) equals
//!   the volume delta,
//! - for the base coin: holdings delta plus the reserve delta equals the
//!   freshly issued emission.
//!
//! A mismatch means some executor created or destroyed value. That is not a
//! recoverable error: the node halts rather than commit divergent state.

use crate::bus::CheckerBus;
use lib_types::{ChainParams, CoinSymbol};
use num_bigint::BigInt;
use num_traits::Zero;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct CheckerInner {
    holdings: BTreeMap<CoinSymbol, BigInt>,
    volume: BTreeMap<CoinSymbol, BigInt>,
    reserve: BigInt,
    issued: BigInt,
}

/// Accumulates per-block value deltas and audits them at commit
#[derive(Clone)]
pub struct Checker {
    base_coin: CoinSymbol,
    inner: Arc<RwLock<CheckerInner>>,
}

impl Checker {
    pub fn new(params: &ChainParams) -> Self {
        Checker {
            base_coin: params.base_coin,
            inner: Arc::new(RwLock::new(CheckerInner::default())),
        }
    }

    /// Forget all accumulated deltas (rollback, or after genesis seeding)
    pub fn reset(&self) {
        *self.inner.write() = CheckerInner::default();
    }

    /// Verify the deltas cancel out, then reset for the next block
    pub fn audit_and_reset(&self) -> Result<(), String> {
        let mut inner = self.inner.write();

        for (coin, holdings) in &inner.holdings {
            if *coin == self.base_coin {
                continue;
            }
            let volume = inner.volume.get(coin).cloned().unwrap_or_default();
            if *holdings != volume {
                return Err(format!(
                    "coin {} holdings moved by {} but volume by {}",
                    coin, holdings, volume
                ));
            }
        }
        for (coin, volume) in &inner.volume {
            if *coin == self.base_coin {
                return Err("base coin has no volume record".to_string());
            }
            // a volume delta without any holdings delta is just as wrong
            if !inner.holdings.contains_key(coin) && !volume.is_zero() {
                return Err(format!("coin {} volume moved by {} from nowhere", coin, volume));
            }
        }

        let base_holdings = inner
            .holdings
            .get(&self.base_coin)
            .cloned()
            .unwrap_or_default();
        let balance = &base_holdings + &inner.reserve - &inner.issued;
        if !balance.is_zero() {
            return Err(format!(
                "base coin off by {}: holdings {}, reserves {}, issued {}",
                balance, base_holdings, inner.reserve, inner.issued
            ));
        }

        *inner = CheckerInner::default();
        Ok(())
    }
}

impl CheckerBus for Checker {
    fn add_holdings(&self, coin: &CoinSymbol, delta: &BigInt) {
        let mut inner = self.inner.write();
        *inner.holdings.entry(*coin).or_default() += delta;
    }

    fn add_volume(&self, coin: &CoinSymbol, delta: &BigInt) {
        let mut inner = self.inner.write();
        *inner.volume.entry(*coin).or_default() += delta;
    }

    fn add_reserve(&self, delta: &BigInt) {
        self.inner.write().reserve += delta;
    }

    fn add_issued(&self, delta: &BigInt) {
        self.inner.write().issued += delta;
    }
}
