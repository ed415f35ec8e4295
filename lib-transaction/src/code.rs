//! Response Codes
//!
//! Numeric codes returned to the consensus engine and to clients. Codes are
//! PROTOCOL: wallets and explorers branch on them, so renumbering is a
//! breaking change. Families are spaced by hundreds.

pub const OK: u32 = 0;

// ===== decode / policy (1xx) =====
pub const WRONG_NONCE: u32 = 101;
pub const COIN_NOT_EXISTS: u32 = 102;
pub const COIN_RESERVE_NOT_SUFFICIENT: u32 = 103;
pub const TX_TOO_LARGE: u32 = 105;
pub const DECODE_ERROR: u32 = 106;
pub const INSUFFICIENT_FUNDS: u32 = 107;
pub const TX_PAYLOAD_TOO_LARGE: u32 = 109;
pub const INVALID_MULTISEND_DATA: u32 = 111;
pub const COIN_SUPPLY_OVERFLOW: u32 = 112;
pub const TOO_LOW_GAS_PRICE: u32 = 114;
pub const WRONG_CHAIN_ID: u32 = 115;
pub const COIN_RESERVE_UNDERFLOW: u32 = 116;
pub const CROSS_CONVERT: u32 = 117;
pub const TOO_HIGH_GAS_PRICE: u32 = 118;
pub const WRONG_GAS_COIN: u32 = 119;
pub const COMMISSION_COIN_NOT_SUFFICIENT: u32 = 120;
pub const BLOCK_GAS_EXHAUSTED: u32 = 121;

// ===== coin creation (2xx) =====
pub const COIN_ALREADY_EXISTS: u32 = 201;
pub const WRONG_CRR: u32 = 202;
pub const INVALID_COIN_SYMBOL: u32 = 203;
pub const INVALID_COIN_NAME: u32 = 204;
pub const WRONG_COIN_SUPPLY: u32 = 205;

// ===== conversion guards (3xx) =====
pub const MINIMUM_VALUE_TO_BUY_REACHED: u32 = 301;
pub const MAXIMUM_VALUE_TO_SELL_REACHED: u32 = 302;

// ===== candidates and stakes (4xx) =====
pub const CANDIDATE_EXISTS: u32 = 401;
pub const WRONG_COMMISSION: u32 = 402;
pub const CANDIDATE_NOT_FOUND: u32 = 403;
pub const STAKE_NOT_FOUND: u32 = 404;
pub const INSUFFICIENT_STAKE: u32 = 405;
pub const IS_NOT_OWNER_OF_CANDIDATE: u32 = 406;
pub const STAKE_SHOULD_BE_POSITIVE: u32 = 408;
pub const TOO_LOW_STAKE: u32 = 409;
pub const CANDIDATE_ALREADY_ONLINE: u32 = 410;
pub const CANDIDATE_ALREADY_OFFLINE: u32 = 411;

// ===== checks (5xx) =====
pub const CHECK_INVALID_LOCK: u32 = 501;
pub const CHECK_EXPIRED: u32 = 502;
pub const CHECK_USED: u32 = 503;
pub const TOO_LONG_NONCE: u32 = 506;

// ===== multisig (6xx) =====
pub const INCORRECT_WEIGHTS: u32 = 601;
pub const MULTISIG_EXISTS: u32 = 602;
pub const MULTISIG_NOT_EXISTS: u32 = 603;
pub const INCORRECT_MULTI_SIGNATURE: u32 = 604;
pub const TOO_LARGE_OWNERS_LIST: u32 = 605;

// ===== system (9xx) =====
/// Internal invariant violation; block application must abort
pub const PANIC: u32 = 999;
