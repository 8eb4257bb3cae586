//! Deterministic fingerprint of ledger state.

use sha2::{Digest, Sha256};

use pegsettle_store::KvStore;
use pegsettle_types::constants::STATE_DIGEST_DOMAIN;

/// Hex SHA-256 over every `(key, value)` pair in key order.
///
/// Each key and value is preceded by its length as a big-endian u64, so
/// two stores digest equal only if they hold the same entries.
#[must_use]
pub fn state_digest(store: &dyn KvStore) -> String {
    let mut hasher = Sha256::new();
    hasher.update(STATE_DIGEST_DOMAIN);
    let mut entries = 0_u64;
    for (key, value) in store.iterate(&[]) {
        hasher.update((key.len() as u64).to_be_bytes());
        hasher.update(&key);
        hasher.update((value.len() as u64).to_be_bytes());
        hasher.update(&value);
        entries += 1;
    }
    hasher.update(entries.to_be_bytes());
    hex::encode(hasher.finalize())
}
