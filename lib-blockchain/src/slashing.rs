//! Byzantine Punishment
//!
//! Applied at begin-block for each piece of evidence the consensus engine
//! delivers. The outcome is deterministic: every stake of the offender moves
//! into a frozen fund releasing one unbond period later, and the candidate
//! drops offline. Evidence against an unknown key is ignored (the engine can
//! deliver evidence for validators slashed in an earlier block).

use crate::abi::Evidence;
use lib_state::State;
use lib_types::BlockHeight;
use tracing::warn;

/// Punish one offender. Returns the number of stakes frozen.
pub fn punish_byzantine(state: &State, evidence: &Evidence, height: BlockHeight) -> usize {
    if !state.candidates.exists(&evidence.pubkey) {
        return 0;
    }
    let release_height = height + state.params().unbond_period;
    let frozen = state.candidates.slash(&evidence.pubkey, release_height);
    warn!(
        height,
        pub_key = %evidence.pubkey,
        frozen_stakes = frozen,
        release_height,
        "validator slashed for byzantine behavior"
    );
    frozen
}
