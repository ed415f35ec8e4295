//! The Block Processor
//!
//! Drives the strictly serialized block lifecycle the consensus engine
//! expects:
//!
//! ```text
//! Idle ── begin_block ──▶ InBlock
//! InBlock ── deliver_tx ──▶ InBlock        (repeated)
//! InBlock ── end_block ──▶ Committing
//! Committing ── commit ──▶ Idle            (returns the new root)
//! ```
//!
//! Calls out of phase are wiring bugs in the engine adapter and fail hard.
//! Block application itself is single-threaded by contract; only `check_tx`
//! may run concurrently, and it works against a disposable overlay of the
//! last committed state that is replaced on every commit.

use crate::abi::{
    BeginBlockRequest, CommitResponse, EndBlockResponse, InfoResponse, ValidatorUpdate,
};
use crate::{rewards, slashing, validators};
use anyhow::{bail, Context, Result};
use lib_state::{AppState, CheckerBus, State, StateResult};
use lib_transaction::{code, run_tx, Response};
use lib_types::{Address, BlockHeight, PublicKey};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Protocol version carried in the app-hash handshake. Every bump is
/// protocol-breaking: replaying blocks across differing versions is refused.
pub const APP_VERSION: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    InBlock,
    Committing,
}

/// The application state machine behind the consensus engine
pub struct App {
    state: State,
    /// Overlay for the concurrent mempool admission gate
    mempool_state: Mutex<State>,
    phase: Phase,
    start_height: BlockHeight,
    current_height: BlockHeight,
    proposer: Option<PublicKey>,
    reward_pool: BigUint,
    total_gas_used: i64,
    max_gas: u64,
}

impl App {
    /// Wrap a state, refusing to continue over a different protocol version
    pub fn new(state: State) -> Result<Self> {
        if let Some(stored) = state.app_version()? {
            if stored != APP_VERSION {
                bail!(
                    "state was written by app version {}, this node runs {}",
                    stored,
                    APP_VERSION
                );
            }
        }
        let mempool_state = Mutex::new(state.check_state());
        Ok(App {
            state,
            mempool_state,
            phase: Phase::Idle,
            start_height: 0,
            current_height: 0,
            proposer: None,
            reward_pool: BigUint::zero(),
            total_gas_used: 0,
            max_gas: 0,
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Height of the last committed block
    pub fn last_block_height(&self) -> BlockHeight {
        self.start_height + self.state.version().saturating_sub(1)
    }

    /// A read-only state pinned at `height`, for historical queries
    pub fn state_at(&self, height: BlockHeight) -> StateResult<State> {
        let version = height.saturating_sub(self.start_height) + 1;
        self.state.at_version(version)
    }

    /// The engine's handshake probe
    pub fn info(&self) -> InfoResponse {
        InfoResponse {
            last_block_height: self.last_block_height(),
            app_hash: self.state.root(),
            app_version: APP_VERSION,
        }
    }

    /// Record the observed block-time delta in non-Merkle metadata
    pub fn set_blocks_time_delta(&self, delta: u64) -> StateResult<()> {
        self.state.set_blocks_time_delta(delta)
    }

    pub fn blocks_time_delta(&self) -> StateResult<Option<u64>> {
        self.state.blocks_time_delta()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Seed state from the genesis document and return the initial set
    pub fn init_chain(&mut self, app_state: &AppState) -> Result<Vec<ValidatorUpdate>> {
        if self.state.version() != 0 {
            bail!("chain is already initialized at version {}", self.state.version());
        }
        self.state
            .init_genesis(app_state)
            .context("seeding genesis state")?;

        validators::recalculate_stakes(&self.state);
        let set = validators::compute_validator_set(&self.state);
        self.state.set_validator_set(&set);
        self.state.set_app_version(APP_VERSION)?;
        self.state.commit().context("committing genesis state")?;

        self.start_height = app_state.start_height;
        self.max_gas = app_state.max_gas;
        *self.mempool_state.lock() = self.state.check_state();

        info!(
            start_height = self.start_height,
            validators = set.len(),
            "chain initialized"
        );
        Ok(validators::validator_updates(&[], &set))
    }

    /// Open a block: record the height and proposer, punish evidence
    pub fn begin_block(&mut self, req: BeginBlockRequest) -> Result<()> {
        if self.phase != Phase::Idle {
            bail!("begin_block in phase {:?}", self.phase);
        }
        let expected = self.last_block_height() + 1;
        if req.height != expected {
            bail!("begin_block at height {}, expected {}", req.height, expected);
        }

        self.current_height = req.height;
        self.proposer = req.proposer;
        self.reward_pool = BigUint::zero();
        self.total_gas_used = 0;

        for evidence in &req.evidence {
            slashing::punish_byzantine(&self.state, evidence, req.height);
        }

        self.phase = Phase::InBlock;
        debug!(height = req.height, evidence = req.evidence.len(), "block opened");
        Ok(())
    }

    /// Execute one transaction inside the open block
    pub fn deliver_tx(&mut self, raw: &[u8]) -> Response {
        if self.phase != Phase::InBlock {
            return Response::error(code::PANIC, "deliver_tx outside a block");
        }
        if self.max_gas > 0 && self.total_gas_used as u64 >= self.max_gas {
            return Response::error(code::BLOCK_GAS_EXHAUSTED, "Block gas budget exhausted");
        }

        let resp = run_tx(
            &self.state,
            raw,
            false,
            &mut self.reward_pool,
            self.current_height,
        );
        if resp.is_ok() {
            self.total_gas_used += resp.gas_used;
        } else {
            debug!(
                height = self.current_height,
                code = resp.code,
                log = %resp.log,
                "transaction rejected"
            );
        }
        resp
    }

    /// Validate one transaction against the mempool overlay
    pub fn check_tx(&self, raw: &[u8]) -> Response {
        let overlay = self.mempool_state.lock();
        let mut scratch_pool = BigUint::zero();
        run_tx(
            &overlay,
            raw,
            true,
            &mut scratch_pool,
            self.last_block_height() + 1,
        )
    }

    /// Close the block: release matured funds, distribute rewards, recompute
    /// the validator set
    pub fn end_block(&mut self) -> Result<EndBlockResponse> {
        if self.phase != Phase::InBlock {
            bail!("end_block in phase {:?}", self.phase);
        }

        let released = self.state.frozen_funds.release(self.current_height);
        if !released.is_empty() {
            debug!(
                height = self.current_height,
                funds = released.len(),
                "frozen funds released"
            );
        }

        let emission = self.state.params().emission_at(self.current_height);
        self.state
            .checker()
            .add_issued(&BigInt::from(emission.clone()));
        let total_reward = emission + &self.reward_pool;
        if !total_reward.is_zero() {
            let paid = self
                .proposer
                .map(|pubkey| rewards::distribute(&self.state, &pubkey, &total_reward))
                .unwrap_or(false);
            if !paid {
                // no proposer candidate to pay: park the reward at the zero
                // address rather than corrupt the base-coin accounting
                warn!(height = self.current_height, "block reward unclaimed");
                self.state.accounts.add_balance(
                    &Address::zero(),
                    &self.state.coins.base_coin(),
                    &total_reward,
                );
            }
        }
        self.reward_pool = BigUint::zero();

        validators::recalculate_stakes(&self.state);
        let next = validators::compute_validator_set(&self.state);
        let updates = validators::validator_updates(&self.state.validator_set(), &next);
        self.state.set_validator_set(&next);

        self.phase = Phase::Committing;
        Ok(EndBlockResponse {
            validator_updates: updates,
        })
    }

    /// Flush state, advance the version, refresh the mempool overlay
    pub fn commit(&mut self) -> Result<CommitResponse> {
        if self.phase != Phase::Committing {
            bail!("commit in phase {:?}", self.phase);
        }

        let (app_hash, version) = self
            .state
            .commit()
            .context("conservation audit or storage failure, halting")?;

        *self.mempool_state.lock() = self.state.check_state();
        self.phase = Phase::Idle;

        info!(
            height = self.current_height,
            app_hash = %hex::encode(app_hash),
            "block committed"
        );
        Ok(CommitResponse { app_hash, version })
    }
}
