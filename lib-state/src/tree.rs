//! Versioned Merkleized Key-Value Tree
//!
//! The canonical committed state lives in one sorted map. Mutations go into
//! a working overlay and become visible to consensus only at [`VersionedTree::commit`],
//! which advances the version, recomputes the root hash, persists the delta
//! to sled, and retains the previous version for historical queries.
//!
//! # Invariants
//!
//! - The root is a pure function of the committed key/value set. Insertion
//!   order cannot affect it: the hash runs over the sorted map.
//! - `commit` is atomic: either the whole overlay lands or none of it.
//! - At most `keep_last` versions are retained; older historical queries fail
//!   with `SnapshotUnavailable`.
//!
//! On disk the tree uses two sled trees: `state` (the Merkleized payload) and
//! `meta` (non-Merkle metadata such as the last version and the observed
//! blocks-time-delta).

use crate::error::{StateError, StateResult};
use sha3::{Digest, Sha3_256};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const TREE_STATE: &str = "state";
const TREE_META: &str = "meta";

const META_VERSION: &[u8] = b"version";
const META_APP_VERSION: &[u8] = b"app_version";
const META_BLOCKS_TIME_DELTA: &[u8] = b"blocks_time_delta";

/// One committed, immutable version of the state
#[derive(Clone)]
pub struct Snapshot {
    version: u64,
    root: [u8; 32],
    entries: Arc<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl Snapshot {
    /// Version this snapshot was committed as
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Merkle root of this snapshot
    pub fn root(&self) -> [u8; 32] {
        self.root
    }

    /// Point lookup
    pub fn get(&self, key: &[u8]) -> Option<&Vec<u8>> {
        self.entries.get(key)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Persist {
    db: sled::Db,
    state: sled::Tree,
    meta: sled::Tree,
}

/// The versioned state tree
pub struct VersionedTree {
    persist: Option<Persist>,
    committed: Snapshot,
    dirty: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    retained: BTreeMap<u64, Snapshot>,
    keep_last: u64,
}

impl VersionedTree {
    /// Open (or create) a persistent tree at `path`
    pub fn open<P: AsRef<Path>>(path: P, keep_last: u64) -> StateResult<Self> {
        assert!(keep_last >= 1, "keep_last must be at least 1");
        let db = sled::open(path)?;
        Self::from_db(db, keep_last)
    }

    /// Open a throwaway tree backed by a temporary sled database
    pub fn in_memory(keep_last: u64) -> StateResult<Self> {
        assert!(keep_last >= 1, "keep_last must be at least 1");
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, keep_last)
    }

    fn from_db(db: sled::Db, keep_last: u64) -> StateResult<Self> {
        let state = db.open_tree(TREE_STATE)?;
        let meta = db.open_tree(TREE_META)?;

        let mut entries = BTreeMap::new();
        for item in state.iter() {
            let (k, v) = item?;
            entries.insert(k.to_vec(), v.to_vec());
        }

        let version = match meta.get(META_VERSION)? {
            Some(raw) => decode_u64(&raw)?,
            None => 0,
        };
        let root = hash_entries(&entries);
        let committed = Snapshot {
            version,
            root,
            entries: Arc::new(entries),
        };

        let mut retained = BTreeMap::new();
        retained.insert(version, committed.clone());

        Ok(VersionedTree {
            persist: Some(Persist { db, state, meta }),
            committed,
            dirty: BTreeMap::new(),
            retained,
            keep_last,
        })
    }

    /// Last committed version
    pub fn version(&self) -> u64 {
        self.committed.version
    }

    /// Root of the last committed version
    pub fn root(&self) -> [u8; 32] {
        self.committed.root
    }

    /// Read through the working overlay into the committed state
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        if let Some(pending) = self.dirty.get(key) {
            return pending.clone();
        }
        self.committed.entries.get(key).cloned()
    }

    /// Stage a write
    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.dirty.insert(key, Some(value));
    }

    /// Stage a deletion
    pub fn delete(&mut self, key: Vec<u8>) {
        self.dirty.insert(key, None);
    }

    /// All live entries under `prefix`, overlay merged over committed,
    /// in ascending key order
    pub fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self
            .committed
            .entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (k, pending) in self.dirty.range(prefix.to_vec()..) {
            if !k.starts_with(prefix) {
                break;
            }
            match pending {
                Some(v) => {
                    merged.insert(k.clone(), v.clone());
                }
                None => {
                    merged.remove(k);
                }
            }
        }
        merged.into_iter().collect()
    }

    /// Discard the working overlay
    pub fn rollback(&mut self) {
        self.dirty.clear();
    }

    /// Apply the overlay, advance the version, persist, and prune
    pub fn commit(&mut self) -> StateResult<([u8; 32], u64)> {
        let mut next: BTreeMap<Vec<u8>, Vec<u8>> = (*self.committed.entries).clone();
        for (k, pending) in &self.dirty {
            match pending {
                Some(v) => {
                    next.insert(k.clone(), v.clone());
                }
                None => {
                    next.remove(k);
                }
            }
        }

        let version = self.committed.version + 1;
        let root = hash_entries(&next);

        if let Some(persist) = &self.persist {
            let mut batch = sled::Batch::default();
            for (k, pending) in &self.dirty {
                match pending {
                    Some(v) => batch.insert(k.as_slice(), v.as_slice()),
                    None => batch.remove(k.as_slice()),
                }
            }
            persist.state.apply_batch(batch)?;
            persist
                .meta
                .insert(META_VERSION, version.to_be_bytes().to_vec())?;
            persist.db.flush()?;
        }

        self.dirty.clear();
        self.committed = Snapshot {
            version,
            root,
            entries: Arc::new(next),
        };
        self.retained.insert(version, self.committed.clone());

        let oldest_kept = version.saturating_sub(self.keep_last.saturating_sub(1));
        self.retained = self.retained.split_off(&oldest_kept);

        Ok((root, version))
    }

    /// The latest committed snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.committed.clone()
    }

    /// A retained historical snapshot
    pub fn load_at(&self, version: u64) -> StateResult<Snapshot> {
        self.retained
            .get(&version)
            .cloned()
            .ok_or(StateError::SnapshotUnavailable { height: version })
    }

    /// A disposable working copy over the committed state. Forks share the
    /// committed entries (cheap Arc clone), never persist, and are dropped
    /// wholesale when a new block commits.
    pub fn fork(&self) -> VersionedTree {
        self.fork_snapshot(self.committed.clone())
    }

    /// A disposable working copy over an arbitrary snapshot
    pub fn fork_snapshot(&self, snapshot: Snapshot) -> VersionedTree {
        VersionedTree {
            persist: None,
            committed: snapshot,
            dirty: BTreeMap::new(),
            retained: BTreeMap::new(),
            keep_last: self.keep_last,
        }
    }

    // ------------------------------------------------------------------
    // Non-Merkle metadata
    // ------------------------------------------------------------------

    /// Record the application protocol version
    pub fn set_app_version(&self, app_version: u64) -> StateResult<()> {
        self.put_meta(META_APP_VERSION, app_version)
    }

    /// Application protocol version, if recorded
    pub fn app_version(&self) -> StateResult<Option<u64>> {
        self.read_meta(META_APP_VERSION)
    }

    /// Record the observed seconds between recent blocks
    pub fn set_blocks_time_delta(&self, delta: u64) -> StateResult<()> {
        self.put_meta(META_BLOCKS_TIME_DELTA, delta)
    }

    /// Observed seconds between recent blocks, if recorded
    pub fn blocks_time_delta(&self) -> StateResult<Option<u64>> {
        self.read_meta(META_BLOCKS_TIME_DELTA)
    }

    fn put_meta(&self, key: &[u8], value: u64) -> StateResult<()> {
        if let Some(persist) = &self.persist {
            persist.meta.insert(key, value.to_be_bytes().to_vec())?;
        }
        Ok(())
    }

    fn read_meta(&self, key: &[u8]) -> StateResult<Option<u64>> {
        match &self.persist {
            Some(persist) => match persist.meta.get(key)? {
                Some(raw) => Ok(Some(decode_u64(&raw)?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }
}

fn decode_u64(raw: &[u8]) -> StateResult<u64> {
    if raw.len() != 8 {
        return Err(StateError::Storage(format!(
            "corrupt meta entry of {} bytes",
            raw.len()
        )));
    }
    let mut be = [0u8; 8];
    be.copy_from_slice(raw);
    Ok(u64::from_be_bytes(be))
}

/// Hash of a committed entry set: SHA3-256 over the length-framed, sorted
/// (key, value) sequence
fn hash_entries(entries: &BTreeMap<Vec<u8>, Vec<u8>>) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update((entries.len() as u64).to_be_bytes());
    for (k, v) in entries {
        hasher.update((k.len() as u32).to_be_bytes());
        hasher.update(k);
        hasher.update((v.len() as u32).to_be_bytes());
        hasher.update(v);
    }
    hasher.finalize().into()
}
