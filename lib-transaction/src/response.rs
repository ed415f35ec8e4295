//! Execution Responses
//!
//! Transaction outcomes are values, not exceptions: every executor returns a
//! `Response` carrying a numeric code, a human-readable log line, a
//! machine-readable info map, and (on success) the indexer tags.

use crate::code;
use std::collections::BTreeMap;

/// Outcome of checking or delivering one transaction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    pub code: u32,
    pub log: String,
    /// Typed context for clients (e.g. `has_reserve`, `required`)
    pub info: BTreeMap<String, String>,
    pub gas_used: i64,
    pub gas_wanted: i64,
    /// Key/value pairs consumed by the indexer, e.g. `tx.type`, `tx.from`
    pub tags: Vec<(String, String)>,
}

impl Response {
    /// Successful execution
    pub fn ok(gas: i64, tags: Vec<(String, String)>) -> Self {
        Response {
            code: code::OK,
            gas_used: gas,
            gas_wanted: gas,
            tags,
            ..Default::default()
        }
    }

    /// Failure without structured context
    pub fn error(error_code: u32, log: impl Into<String>) -> Self {
        Response {
            code: error_code,
            log: log.into(),
            ..Default::default()
        }
    }

    /// Failure with a machine-readable info map
    pub fn error_with_info<const N: usize>(
        error_code: u32,
        log: impl Into<String>,
        info: [(&str, String); N],
    ) -> Self {
        Response {
            code: error_code,
            log: log.into(),
            info: info
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == code::OK
    }
}

/// Build an indexer tag pair
pub fn tag(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response() {
        let r = Response::ok(10, vec![tag("tx.type", "01")]);
        assert!(r.is_ok());
        assert_eq!(r.gas_used, 10);
        assert_eq!(r.gas_wanted, 10);
        assert_eq!(r.tags.len(), 1);
    }

    #[test]
    fn test_error_with_info() {
        let r = Response::error_with_info(
            code::COIN_NOT_EXISTS,
            "Coin ABC not exists",
            [("coin", "ABC".to_string())],
        );
        assert!(!r.is_ok());
        assert_eq!(r.info.get("coin"), Some(&"ABC".to_string()));
        assert_eq!(r.gas_used, 0);
    }
}
