use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

/// Per-record RNG seed derived from a run seed and the record's input position.
pub fn record_seed(seed: u64, index: usize) -> u64 {
    stable_hash_with(|hasher| {
        seed.hash(hasher);
        index.hash(hasher);
    })
}
