//! Replicated state for the Volt state machine
//!
//! Layered bottom-up:
//!
//! - [`tree`] - the versioned, Merkleized key-value tree (sled-backed)
//! - [`keys`] - the canonical key layout inside that tree
//! - [`bus`] - narrow capability traits decoupling the entity stores
//! - entity stores ([`accounts`], [`coins`], [`candidates`],
//!   [`frozen_funds`], [`checks`]) - typed dirty-map views over the tree
//! - [`checker`] - the conservation auditor fed through the bus
//! - [`state`] - the composite wiring all of the above
//!
//! Everything here is consensus-critical. Store reads are cheap and
//! side-effect free; store writes stage into dirty maps that flush on commit
//! and vanish on rollback.

pub mod accounts;
pub mod app_state;
pub mod bus;
pub mod candidates;
pub mod checker;
pub mod checks;
pub mod coins;
pub mod error;
pub mod frozen_funds;
pub mod keys;
pub mod state;
pub mod tree;

pub use accounts::{Account, AccountsStore, Multisig};
pub use app_state::AppState;
pub use bus::{AccountsBus, Bus, CheckerBus, FrozenFundsBus};
pub use candidates::{Candidate, CandidateStatus, CandidatesStore, Stake};
pub use checker::Checker;
pub use checks::ChecksStore;
pub use coins::{Coin, CoinsStore};
pub use error::{StateError, StateResult};
pub use frozen_funds::{FrozenFund, FrozenFundsStore};
pub use state::State;
pub use tree::{Snapshot, VersionedTree};
