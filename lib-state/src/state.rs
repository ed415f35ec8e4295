//! The Composite State
//!
//! Owns the versioned tree and every entity store, wires the bus at
//! construction, and drives the flush/audit/commit cycle. One `State` is the
//! canonical chain state; overlay copies of it (`check_state`,
//! `at_version`) share the committed snapshot and are discarded wholesale.
//!
//! Flush order is fixed (accounts, coins, candidates, frozen funds, checks):
//! the root hash does not depend on it, but a stable order keeps commit
//! behavior reproducible under a debugger.

use crate::accounts::{AccountsStore, Multisig};
use crate::app_state::AppState;
use crate::bus::Bus;
use crate::candidates::{Candidate, CandidateStatus, CandidatesStore};
use crate::checker::Checker;
use crate::checks::ChecksStore;
use crate::coins::{Coin, CoinsStore};
use crate::error::{StateError, StateResult};
use crate::frozen_funds::FrozenFundsStore;
use crate::tree::{Snapshot, VersionedTree};
use lib_types::{Address, ChainParams, CoinSymbol, PublicKey};
use num_bigint::BigUint;
use num_traits::Zero;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

type SharedTree = Arc<RwLock<VersionedTree>>;

/// The complete coin-aware state of the chain
pub struct State {
    params: ChainParams,
    tree: SharedTree,
    checker: Checker,
    pub accounts: AccountsStore,
    pub coins: CoinsStore,
    pub candidates: CandidatesStore,
    pub frozen_funds: FrozenFundsStore,
    pub checks: ChecksStore,
}

impl State {
    /// Wire a state over a freshly opened tree
    pub fn new(tree: VersionedTree, params: ChainParams) -> Self {
        Self::with_tree(Arc::new(RwLock::new(tree)), params)
    }

    fn with_tree(tree: SharedTree, params: ChainParams) -> Self {
        let bus = Bus::new();
        let checker = Checker::new(&params);
        bus.register_checker(Arc::new(checker.clone()));

        let accounts = AccountsStore::new(tree.clone(), bus.clone());
        let frozen_funds = FrozenFundsStore::new(tree.clone(), bus.clone());
        let coins = CoinsStore::new(params.base_coin, tree.clone(), bus.clone());
        let candidates = CandidatesStore::new(tree.clone(), bus);
        let checks = ChecksStore::new(tree.clone());

        State {
            params,
            tree,
            checker,
            accounts,
            coins,
            candidates,
            frozen_funds,
            checks,
        }
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    /// Version of the last committed tree
    pub fn version(&self) -> u64 {
        self.tree.read().version()
    }

    /// Root of the last committed tree
    pub fn root(&self) -> [u8; 32] {
        self.tree.read().root()
    }

    /// Flush every store, audit conservation, and commit the tree.
    /// An audit failure aborts before anything reaches disk.
    pub fn commit(&self) -> StateResult<([u8; 32], u64)> {
        self.accounts.flush();
        self.coins.flush();
        self.candidates.flush();
        self.frozen_funds.flush();
        self.checks.flush();

        self.checker
            .audit_and_reset()
            .map_err(StateError::InvariantViolated)?;

        self.tree.write().commit()
    }

    /// Discard everything staged since the last commit
    pub fn rollback(&self) {
        self.accounts.rollback();
        self.coins.rollback();
        self.candidates.rollback();
        self.frozen_funds.rollback();
        self.checks.rollback();
        self.checker.reset();
        self.tree.write().rollback();
    }

    /// A disposable overlay over the last committed version, for the mempool
    /// admission gate. Cheap to create, never persists.
    pub fn check_state(&self) -> State {
        let fork = self.tree.read().fork();
        Self::with_tree(Arc::new(RwLock::new(fork)), self.params.clone())
    }

    /// A read-only overlay over a retained historical version
    pub fn at_version(&self, version: u64) -> StateResult<State> {
        let snapshot: Snapshot = self.tree.read().load_at(version)?;
        let fork = self.tree.read().fork_snapshot(snapshot);
        Ok(Self::with_tree(
            Arc::new(RwLock::new(fork)),
            self.params.clone(),
        ))
    }

    /// Record the observed block time delta in non-Merkle metadata
    pub fn set_blocks_time_delta(&self, delta: u64) -> StateResult<()> {
        self.tree.read().set_blocks_time_delta(delta)
    }

    pub fn blocks_time_delta(&self) -> StateResult<Option<u64>> {
        self.tree.read().blocks_time_delta()
    }

    /// Record the application protocol version in non-Merkle metadata
    pub fn set_app_version(&self, app_version: u64) -> StateResult<()> {
        self.tree.read().set_app_version(app_version)
    }

    pub fn app_version(&self) -> StateResult<Option<u64>> {
        self.tree.read().app_version()
    }

    /// The persisted active validator set (pubkey, consensus power)
    pub fn validator_set(&self) -> Vec<(PublicKey, u64)> {
        self.tree
            .read()
            .get(&crate::keys::validator_set_key())
            .map(|raw| bincode::deserialize(&raw).expect("corrupt validator set record"))
            .unwrap_or_default()
    }

    /// Stage the new active validator set for the next commit
    pub fn set_validator_set(&self, set: &[(PublicKey, u64)]) {
        let raw = bincode::serialize(set).expect("validator set must encode");
        self.tree
            .write()
            .set(crate::keys::validator_set_key().to_vec(), raw);
    }

    // ------------------------------------------------------------------
    // Genesis
    // ------------------------------------------------------------------

    /// Validate and seed the genesis document. The caller commits afterwards.
    pub fn init_genesis(&self, app_state: &AppState) -> StateResult<()> {
        self.validate_genesis(app_state)?;

        for g in &app_state.coins {
            self.coins.create(Coin {
                symbol: parse_symbol(&g.symbol)?,
                name: g.name.clone(),
                volume: parse_value(&g.volume)?,
                reserve: parse_value(&g.reserve)?,
                crr: g.crr,
                max_supply: parse_value(&g.max_supply)?,
            });
        }

        for g in &app_state.accounts {
            let addr = parse_address(&g.address)?;
            if g.nonce > 0 {
                self.accounts.set_nonce(&addr, g.nonce);
            }
            for balance in &g.balances {
                self.accounts.add_balance(
                    &addr,
                    &parse_symbol(&balance.coin)?,
                    &parse_value(&balance.value)?,
                );
            }
            if let Some(ms) = &g.multisig {
                let multisig = Multisig {
                    threshold: ms.threshold,
                    weights: ms.weights.clone(),
                    addresses: ms
                        .addresses
                        .iter()
                        .map(|a| parse_address(a))
                        .collect::<StateResult<Vec<_>>>()?,
                };
                if multisig.address() != addr {
                    return Err(StateError::InvalidGenesis(format!(
                        "multisig address mismatch for {}",
                        g.address
                    )));
                }
                self.accounts.create_multisig(multisig);
            }
        }

        for g in &app_state.candidates {
            let pubkey = parse_pubkey(&g.pubkey)?;
            self.candidates.declare(Candidate {
                pubkey,
                owner: parse_address(&g.owner)?,
                reward_address: parse_address(&g.reward_address)?,
                commission: g.commission,
                status: if g.online {
                    CandidateStatus::Online
                } else {
                    CandidateStatus::Offline
                },
                created_at: app_state.start_height,
                total_base_stake: BigUint::zero(),
            });
            let mut total_base = BigUint::zero();
            for stake in &g.stakes {
                let owner = parse_address(&stake.owner)?;
                let coin = parse_symbol(&stake.coin)?;
                let value = parse_value(&stake.value)?;
                self.candidates.add_stake(&owner, &pubkey, &coin, &value);
                if self.coins.is_base(&coin) {
                    self.candidates
                        .set_stake_base_value(&pubkey, &owner, &coin, value.clone());
                    total_base += value;
                }
            }
            self.candidates.set_total_base_stake(&pubkey, total_base);
        }

        for g in &app_state.frozen_funds {
            let candidate = match &g.candidate {
                Some(raw) => Some(parse_pubkey(raw)?),
                None => None,
            };
            self.frozen_funds.add_fund(
                g.height,
                &parse_address(&g.owner)?,
                candidate,
                &parse_symbol(&g.coin)?,
                &parse_value(&g.value)?,
            );
        }

        // genesis value appears from nowhere by definition
        self.checker.reset();
        Ok(())
    }

    /// Conservation and well-formedness checks over the raw document
    fn validate_genesis(&self, app_state: &AppState) -> StateResult<()> {
        let mut volumes: BTreeMap<CoinSymbol, BigUint> = BTreeMap::new();
        for g in &app_state.coins {
            let symbol = parse_symbol(&g.symbol)?;
            if self.coins.is_base(&symbol) {
                return Err(StateError::InvalidGenesis(format!(
                    "base coin {} cannot be redefined",
                    symbol
                )));
            }
            if !(10..=100).contains(&g.crr) {
                return Err(StateError::InvalidGenesis(format!(
                    "coin {} has crr {} outside [10, 100]",
                    symbol, g.crr
                )));
            }
            if volumes.insert(symbol, parse_value(&g.volume)?).is_some() {
                return Err(StateError::InvalidGenesis(format!(
                    "coin {} declared twice",
                    symbol
                )));
            }
        }

        let mut holdings: BTreeMap<CoinSymbol, BigUint> = BTreeMap::new();
        let mut add = |symbol: CoinSymbol, value: BigUint| {
            *holdings.entry(symbol).or_default() += value;
        };
        for g in &app_state.accounts {
            for balance in &g.balances {
                add(parse_symbol(&balance.coin)?, parse_value(&balance.value)?);
            }
        }
        let mut seen_candidates = BTreeSet::new();
        for g in &app_state.candidates {
            if !seen_candidates.insert(parse_pubkey(&g.pubkey)?) {
                return Err(StateError::InvalidGenesis(format!(
                    "candidate {} declared twice",
                    g.pubkey
                )));
            }
            if g.commission > 100 {
                return Err(StateError::InvalidGenesis(format!(
                    "candidate {} has commission {} above 100",
                    g.pubkey, g.commission
                )));
            }
            for stake in &g.stakes {
                add(parse_symbol(&stake.coin)?, parse_value(&stake.value)?);
            }
        }
        for g in &app_state.frozen_funds {
            // release is driven block by block; a fund scheduled at or
            // before the start height could never mature
            if g.height <= app_state.start_height {
                return Err(StateError::InvalidGenesis(format!(
                    "frozen fund releases at {} but the chain starts at {}",
                    g.height, app_state.start_height
                )));
            }
            add(parse_symbol(&g.coin)?, parse_value(&g.value)?);
        }

        for (symbol, held) in &holdings {
            if self.coins.is_base(symbol) {
                continue;
            }
            match volumes.get(symbol) {
                None => {
                    return Err(StateError::InvalidGenesis(format!(
                        "coin {} is held but not declared",
                        symbol
                    )))
                }
                Some(volume) if volume != held => {
                    return Err(StateError::InvalidGenesis(format!(
                        "coin {} volume {} does not match holdings {}",
                        symbol, volume, held
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

fn parse_address(raw: &str) -> StateResult<Address> {
    Address::from_hex(raw)
        .map_err(|e| StateError::InvalidGenesis(format!("bad address {}: {}", raw, e)))
}

fn parse_pubkey(raw: &str) -> StateResult<PublicKey> {
    let s = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(s)
        .map_err(|e| StateError::InvalidGenesis(format!("bad pubkey {}: {}", raw, e)))?;
    if bytes.len() != PublicKey::LEN {
        return Err(StateError::InvalidGenesis(format!(
            "bad pubkey {}: expected {} bytes",
            raw,
            PublicKey::LEN
        )));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(PublicKey::new(out))
}

fn parse_symbol(raw: &str) -> StateResult<CoinSymbol> {
    CoinSymbol::parse(raw)
        .map_err(|e| StateError::InvalidGenesis(format!("bad coin symbol {}: {}", raw, e)))
}

fn parse_value(raw: &str) -> StateResult<BigUint> {
    raw.parse::<BigUint>()
        .map_err(|e| StateError::InvalidGenesis(format!("bad value {}: {}", raw, e)))
}
