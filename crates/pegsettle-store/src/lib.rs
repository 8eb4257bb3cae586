//! # pegsettle-store
//!
//! Storage plumbing shared by every keeper:
//!
//! - [`KvStore`]: ordered byte-key store with prefix iteration
//! - [`MemStore`]: in-memory `BTreeMap` store
//! - [`CacheStore`]: write buffer used for atomic execution
//! - [`Codec`]: length-prefixed record encoding
//! - [`Context`]: store handle, block header, and event sink for one execution
//! - [`run_batch`]: ordered multi-entry execution under a [`BatchMode`](pegsettle_types::BatchMode)

pub mod batch;
pub mod codec;
pub mod context;
pub mod kv;

pub use batch::run_batch;
pub use codec::Codec;
pub use context::Context;
pub use kv::{apply_writes, CacheStore, KvIter, KvPair, KvStore, MemStore};
