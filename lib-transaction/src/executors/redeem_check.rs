//! Redeem-Check Executor
//!
//! Cashes an off-chain check voucher. The ISSUER pays both the face value
//! and the commission, in the check's coin; the sender only proves knowledge
//! of the passphrase. The envelope's gas coin must therefore match the
//! check's coin, and every check can be redeemed at most once.

use crate::check::{Check, MAX_CHECK_NONCE_LEN};
use crate::code;
use crate::commissions;
use crate::envelope::{RedeemCheckData, Transaction};
use crate::executor::{
    common_tags, compute_commission, deduct_commission, insufficient_funds, SpendTally,
    TotalSpend, TxExecutor,
};
use crate::response::{tag, Response};
use lib_state::State;
use lib_types::BlockHeight;
use num_bigint::BigUint;

impl RedeemCheckData {
    fn decode_check(&self) -> Result<Check, Response> {
        let check = Check::decode(&self.raw_check)
            .map_err(|e| Response::error(code::DECODE_ERROR, format!("Unable to decode check: {}", e)))?;
        if check.nonce.len() > MAX_CHECK_NONCE_LEN {
            return Err(Response::error_with_info(
                code::TOO_LONG_NONCE,
                format!("Check nonce is longer than {} bytes", MAX_CHECK_NONCE_LEN),
                [("nonce_length", check.nonce.len().to_string())],
            ));
        }
        if !check.verify_issuer_signature() {
            return Err(Response::error(
                code::DECODE_ERROR,
                "Invalid issuer signature on check",
            ));
        }
        Ok(check)
    }
}

impl TxExecutor for RedeemCheckData {
    fn basic_check(&self, tx: &Transaction, state: &State) -> Option<Response> {
        let check = match self.decode_check() {
            Ok(check) => check,
            Err(resp) => return Some(resp),
        };
        if check.chain_id != state.params().chain_id {
            return Some(Response::error_with_info(
                code::WRONG_CHAIN_ID,
                "Wrong chain id in check",
                [("check_chain_id", format!("{:#04x}", check.chain_id.tag()))],
            ));
        }
        if !state.coins.exists(&check.coin) {
            return Some(Response::error_with_info(
                code::COIN_NOT_EXISTS,
                format!("Coin {} not exists", check.coin),
                [("coin", check.coin.to_string())],
            ));
        }
        if tx.gas_coin != check.coin {
            return Some(Response::error_with_info(
                code::WRONG_GAS_COIN,
                "Gas coin must match the check's coin",
                [
                    ("gas_coin", tx.gas_coin.to_string()),
                    ("check_coin", check.coin.to_string()),
                ],
            ));
        }
        None
    }

    fn gas(&self) -> i64 {
        commissions::REDEEM_CHECK_TX
    }

    fn total_spend(&self, tx: &Transaction, state: &State) -> Result<TotalSpend, Response> {
        // the sender spends nothing; the issuer covers value and commission
        let _ = compute_commission(tx, state)?;
        Ok(SpendTally::new().into_vec())
    }

    fn run(
        &self,
        tx: &Transaction,
        state: &State,
        is_check: bool,
        reward_pool: &mut BigUint,
        current_block: BlockHeight,
    ) -> Response {
        let sender = tx.sender();

        if let Some(resp) = self.basic_check(tx, state) {
            return resp;
        }
        let check = match self.decode_check() {
            Ok(check) => check,
            Err(resp) => return resp,
        };

        if check.due_block < current_block {
            return Response::error_with_info(
                code::CHECK_EXPIRED,
                format!("Check expired at block {}", check.due_block),
                [
                    ("due_block", check.due_block.to_string()),
                    ("current_block", current_block.to_string()),
                ],
            );
        }
        let hash = check.hash();
        if state.checks.is_used(&hash) {
            return Response::error(code::CHECK_USED, "Check already redeemed");
        }
        if !check.verify_proof(&sender, &self.proof) {
            return Response::error(
                code::CHECK_INVALID_LOCK,
                "Proof does not open the check's lock",
            );
        }

        let fee = match compute_commission(tx, state) {
            Ok(fee) => fee,
            Err(resp) => return resp,
        };

        let issuer = check.issuer();
        let needed = &check.value + &fee.in_gas_coin;
        if state.accounts.get_balance(&issuer, &check.coin) < needed {
            return insufficient_funds(&issuer, &needed, &check.coin);
        }

        if !is_check {
            state.checks.mark_used(&hash);
            deduct_commission(state, &issuer, &tx.gas_coin, &fee, reward_pool);
            state.accounts.sub_balance(&issuer, &check.coin, &check.value);
            state.accounts.add_balance(&sender, &check.coin, &check.value);
            state.accounts.set_nonce(&sender, tx.nonce);
        }

        let mut tags = common_tags(tx, &sender);
        tags.push(tag("tx.check_issuer", hex::encode(issuer.as_bytes())));
        tags.push(tag("tx.coin", check.coin.to_string()));
        Response::ok(tx.gas(), tags)
    }
}
