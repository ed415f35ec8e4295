//! Spent-Check Registry
//!
//! A redeemed check must never pay out twice. The registry stores one marker
//! per spent check hash; markers are never deleted.

use crate::keys;
use crate::tree::VersionedTree;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

type Shared<T> = Arc<RwLock<T>>;

/// Typed view over the spent-check section of the state tree
#[derive(Clone)]
pub struct ChecksStore {
    tree: Shared<VersionedTree>,
    dirty: Shared<BTreeSet<[u8; 32]>>,
}

impl ChecksStore {
    pub fn new(tree: Shared<VersionedTree>) -> Self {
        ChecksStore {
            tree,
            dirty: Arc::new(RwLock::new(BTreeSet::new())),
        }
    }

    /// True when the check hash has already been redeemed
    pub fn is_used(&self, hash: &[u8; 32]) -> bool {
        if self.dirty.read().contains(hash) {
            return true;
        }
        self.tree.read().get(&keys::used_check_key(hash)).is_some()
    }

    /// Mark a check hash as redeemed
    pub fn mark_used(&self, hash: &[u8; 32]) {
        self.dirty.write().insert(*hash);
    }

    /// Write pending markers into the state tree
    pub fn flush(&self) {
        let mut dirty = self.dirty.write();
        let mut tree = self.tree.write();
        for hash in dirty.iter() {
            tree.set(keys::used_check_key(hash).to_vec(), vec![1]);
        }
        dirty.clear();
    }

    /// Drop pending markers
    pub fn rollback(&self) {
        self.dirty.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_query() {
        let tree = Arc::new(RwLock::new(VersionedTree::in_memory(4).unwrap()));
        let checks = ChecksStore::new(tree);

        let hash = [7u8; 32];
        assert!(!checks.is_used(&hash));

        checks.mark_used(&hash);
        assert!(checks.is_used(&hash));

        checks.flush();
        assert!(checks.is_used(&hash));
        assert!(!checks.is_used(&[8u8; 32]));
    }

    #[test]
    fn test_rollback_unmarks_pending() {
        let tree = Arc::new(RwLock::new(VersionedTree::in_memory(4).unwrap()));
        let checks = ChecksStore::new(tree);

        checks.mark_used(&[7u8; 32]);
        checks.rollback();
        assert!(!checks.is_used(&[7u8; 32]));
    }
}
