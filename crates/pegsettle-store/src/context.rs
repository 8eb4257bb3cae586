//! Per-transaction execution context.

use serde::{de::DeserializeOwned, Serialize};

use pegsettle_types::{BlockHeader, Event, Result};

use crate::codec::Codec;
use crate::kv::{apply_writes, CacheStore, KvStore};

/// Store handle, block header, and event sink for one execution.
pub struct Context<'s> {
    store: &'s mut dyn KvStore,
    header: BlockHeader,
    events: Vec<Event>,
}

impl<'s> Context<'s> {
    pub fn new(store: &'s mut dyn KvStore, header: BlockHeader) -> Self {
        Self {
            store,
            header,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(&self) -> BlockHeader {
        self.header
    }

    #[must_use]
    pub fn block_height(&self) -> i64 {
        self.header.height
    }

    #[must_use]
    pub fn store(&self) -> &dyn KvStore {
        &*self.store
    }

    pub fn store_mut(&mut self) -> &mut dyn KvStore {
        &mut *self.store
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Decode the record at `key`, if any.
    pub fn load<T: DeserializeOwned>(&self, codec: &Codec, key: &[u8]) -> Result<Option<T>> {
        self.store.get(key).map(|raw| codec.decode(&raw)).transpose()
    }

    pub fn save<T: Serialize>(&mut self, codec: &Codec, key: &[u8], value: &T) -> Result<()> {
        let raw = codec.encode(value)?;
        self.store.set(key, raw);
        Ok(())
    }

    /// Decode every record under `prefix`, in key order.
    pub fn load_all<T: DeserializeOwned>(&self, codec: &Codec, prefix: &[u8]) -> Result<Vec<(Vec<u8>, T)>> {
        self.store
            .iterate(prefix)
            .map(|(key, raw)| codec.decode(&raw).map(|v| (key, v)))
            .collect()
    }

    /// Run `f` against a write buffer. Writes and events reach this context
    /// only if `f` returns `Ok`; on `Err` the store is exactly as before.
    pub fn atomic<T>(&mut self, f: impl FnOnce(&mut Context<'_>) -> Result<T>) -> Result<T> {
        let mut cache = CacheStore::new(&*self.store);
        let (out, events) = {
            let mut child = Context::new(&mut cache, self.header);
            let out = f(&mut child)?;
            (out, child.take_events())
        };
        let writes = cache.into_writes();
        tracing::debug!(writes = writes.len(), events = events.len(), "Committing cached writes");
        apply_writes(&mut *self.store, writes);
        self.events.extend(events);
        Ok(out)
    }
}
