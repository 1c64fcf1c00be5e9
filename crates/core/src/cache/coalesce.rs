//! Collapses concurrent identical requests into one underlying call.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::debug;

use crate::error::Result;

pub type SharedRequest<V> = Shared<BoxFuture<'static, Result<V>>>;

struct Slot<V> {
    id: u64,
    request: SharedRequest<V>,
}

/// Map from request key to the shared future currently serving it.
///
/// Every started request is driven by a spawned task, so it runs to completion
/// even if all callers stop awaiting it. A slot is released when its request
/// finishes or when [`RequestCoalescer::forget`] detaches it.
pub struct RequestCoalescer<K, V> {
    slots: Arc<Mutex<HashMap<K, Slot<V>>>>,
    next_id: Arc<AtomicU64>,
}

impl<K, V> Clone for RequestCoalescer<K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<K, V> Default for RequestCoalescer<K, V> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<K, V> RequestCoalescer<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the request in flight for `key`, or start one with `start`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run<F>(&self, key: K, start: F) -> SharedRequest<V>
    where
        F: FnOnce() -> BoxFuture<'static, Result<V>>,
    {
        let mut slots = lock(&self.slots);
        if let Some(slot) = slots.get(&key) {
            debug!(?key, "joining in-flight request");
            return slot.request.clone();
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = start();
        let released = Arc::clone(&self.slots);
        let slot_key = key.clone();
        let shared = async move {
            let result = request.await;
            let mut slots = lock(&released);
            if slots.get(&slot_key).is_some_and(|slot| slot.id == id) {
                slots.remove(&slot_key);
            }
            result
        }
        .boxed()
        .shared();

        debug!(?key, "starting request");
        slots.insert(
            key,
            Slot {
                id,
                request: shared.clone(),
            },
        );
        tokio::spawn(shared.clone());
        shared
    }

    /// Detach the request in flight for `key`. Callers already joined keep
    /// their outcome; the next call to [`run`](Self::run) starts afresh.
    pub fn forget(&self, key: &K) {
        if lock(&self.slots).remove(key).is_some() {
            debug!(?key, "detached in-flight request");
        }
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        lock(&self.slots).contains_key(key)
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
