//! Per-Kind Executors
//!
//! One module per transaction kind. Dispatch is a closed match over the
//! tagged data variant; adding a kind means adding a module, a variant, and
//! an arm here, all checked by the compiler.

pub mod buy_coin;
pub mod create_coin;
pub mod create_multisig;
pub mod declare_candidacy;
pub mod delegate;
pub mod edit_candidate;
pub mod multisend;
pub mod redeem_check;
pub mod sell_all_coin;
pub mod sell_coin;
pub mod send;
pub mod set_candidate;
pub mod unbond;

use crate::envelope::TxData;
use crate::executor::TxExecutor;

/// The executor implementation behind a data variant
pub fn executor_of(data: &TxData) -> &dyn TxExecutor {
    match data {
        TxData::Send(d) => d,
        TxData::Multisend(d) => d,
        TxData::SellCoin(d) => d,
        TxData::SellAllCoin(d) => d,
        TxData::BuyCoin(d) => d,
        TxData::CreateCoin(d) => d,
        TxData::DeclareCandidacy(d) => d,
        TxData::Delegate(d) => d,
        TxData::Unbond(d) => d,
        TxData::RedeemCheck(d) => d,
        TxData::SetCandidateOn(d) => set_candidate::online(d),
        TxData::SetCandidateOff(d) => set_candidate::offline(d),
        TxData::EditCandidate(d) => d,
        TxData::CreateMultisig(d) => d,
    }
}
