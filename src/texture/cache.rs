//! Single-flight texture cache
//!
//! Bundles are keyed by the canonical serialization of their resolved
//! parameters. The first caller for a key computes the bundle while later
//! callers for the same key block until it is ready, so each key is built at
//! most once until the cache is cleared.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::core::error::Error;
use crate::core::types::Result;
use super::buffer::TextureBundle;

enum Slot {
    /// Some thread is computing this key.
    Pending,
    Ready(Arc<TextureBundle>),
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<String, Slot>,
    hits: u64,
    misses: u64,
    /// Set by [`TextureCache::close`]; nothing lands afterwards.
    closed: bool,
}

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Finished bundles currently held.
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups answered without computing, 0 when unused.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Texture cache with at-most-once computation per key.
pub struct TextureCache {
    name: String,
    state: Mutex<CacheState>,
    ready: Condvar,
}

impl TextureCache {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(CacheState::default()),
            ready: Condvar::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Bundles are only inserted whole, so a poisoned map is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the bundle for `key`, running `create` only if no bundle exists
    /// and no other thread is already building it.
    ///
    /// If `create` fails or panics, the in-flight slot is released and one of
    /// the waiting callers takes over the computation. On a closed cache, or
    /// one closed while `create` runs, this returns [`Error::Disposed`].
    pub fn get_or_create<F>(&self, key: &str, create: F) -> Result<Arc<TextureBundle>>
    where
        F: FnOnce() -> Result<TextureBundle>,
    {
        let mut state = self.lock();
        loop {
            if state.closed {
                return Err(Error::Disposed);
            }
            match state.slots.get(key) {
                Some(Slot::Ready(bundle)) => {
                    let bundle = Arc::clone(bundle);
                    state.hits += 1;
                    log::debug!("[{}] cache hit", self.name);
                    return Ok(bundle);
                }
                Some(Slot::Pending) => {
                    state = self.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
                }
                None => break,
            }
        }

        state.misses += 1;
        state.slots.insert(key.to_string(), Slot::Pending);
        drop(state);
        log::debug!("[{}] cache miss, generating", self.name);

        let flight = InFlight { cache: self, key, landed: false };
        let bundle = Arc::new(create()?);
        if flight.land(Arc::clone(&bundle)) {
            Ok(bundle)
        } else {
            log::debug!("[{}] closed while generating, discarding bundle", self.name);
            bundle.release_gpu();
            Err(Error::Disposed)
        }
    }

    /// Finished bundle for `key`, without computing.
    pub fn get(&self, key: &str) -> Option<Arc<TextureBundle>> {
        match self.lock().slots.get(key) {
            Some(Slot::Ready(bundle)) => Some(Arc::clone(bundle)),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.lock().slots.get(key), Some(Slot::Ready(_)))
    }

    /// Number of finished bundles.
    pub fn len(&self) -> usize {
        self.lock()
            .slots
            .values()
            .filter(|s| matches!(s, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entries: state
                .slots
                .values()
                .filter(|s| matches!(s, Slot::Ready(_)))
                .count(),
        }
    }

    /// Drop every finished bundle and destroy its GPU textures.
    ///
    /// Computations in flight are left alone and land after the clear.
    /// Calling this on an empty cache is a no-op.
    pub fn clear(&self) {
        let released: Vec<Arc<TextureBundle>> = {
            let mut state = self.lock();
            let old = std::mem::take(&mut state.slots);
            let mut released = Vec::new();
            for (key, slot) in old {
                match slot {
                    Slot::Pending => {
                        state.slots.insert(key, Slot::Pending);
                    }
                    Slot::Ready(bundle) => released.push(bundle),
                }
            }
            released
        };

        if !released.is_empty() {
            log::debug!("[{}] cleared {} bundles", self.name, released.len());
        }
        for bundle in &released {
            bundle.release_gpu();
        }
    }

    /// Clear the cache and refuse further work. Idempotent.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
        self.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// Marks a key as in flight. Dropping it without landing (error or panic in
/// the factory closure) frees the slot and wakes waiters.
struct InFlight<'a> {
    cache: &'a TextureCache,
    key: &'a str,
    landed: bool,
}

impl InFlight<'_> {
    /// Publish the bundle. Returns `false` if the cache was closed first.
    fn land(mut self, bundle: Arc<TextureBundle>) -> bool {
        let mut state = self.cache.lock();
        if state.closed {
            return false;
        }
        state.slots.insert(self.key.to_string(), Slot::Ready(bundle));
        self.landed = true;
        drop(state);
        self.cache.ready.notify_all();
        true
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.landed {
            return;
        }
        let mut state = self.cache.lock();
        if matches!(state.slots.get(self.key), Some(Slot::Pending)) {
            state.slots.remove(self.key);
        }
        drop(state);
        self.cache.ready.notify_all();
    }
}
