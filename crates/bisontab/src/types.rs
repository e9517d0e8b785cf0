//! Collection aliases shared across the crate.

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;
pub type Set<T> = indexmap::IndexSet<T, BuildHasherDefault<FxHasher>>;
