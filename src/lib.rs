//! Lock-free key-value storage.
//!
//! # lfkv::HashTable
//! A concurrent hash table with a fixed number of buckets where every bucket is a lock-free
//! singly linked chain, and unlinked entries are reclaimed through a table-scoped epoch-based
//! garbage collector.

mod ebr;

pub mod hash_table;
pub use hash_table::HashTable;

#[cfg(not(feature = "equivalent"))]
mod equivalent;
pub use equivalent::Equivalent;

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::atomic;

#[cfg(feature = "loom")]
pub(crate) use loom::sync::atomic;
