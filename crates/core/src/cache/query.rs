use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tracing::debug;

use super::coalesce::{RequestCoalescer, lock};
use crate::error::Result;

struct Entries<K, V> {
    values: HashMap<K, V>,
    generations: HashMap<K, u64>,
}

impl<K: Eq + Hash, V> Entries<K, V> {
    fn generation(&self, key: &K) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }
}

/// Cached query results keyed by `K`, with coalesced fetching.
///
/// Each key carries an invalidation generation. A fetch records the generation
/// it started under and only stores its result if no invalidation happened in
/// the meantime.
pub struct QueryCache<K, V> {
    entries: Arc<Mutex<Entries<K, V>>>,
    requests: RequestCoalescer<K, V>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            requests: self.requests.clone(),
        }
    }
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries {
                values: HashMap::new(),
                generations: HashMap::new(),
            })),
            requests: RequestCoalescer::default(),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `key` from cache, join its in-flight fetch, or start `fetch`.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let request = {
            let entries = lock(&self.entries);
            if let Some(value) = entries.values.get(&key) {
                debug!(?key, "cache hit");
                return Ok(value.clone());
            }

            let generation = entries.generation(&key);
            let store = Arc::clone(&self.entries);
            let store_key = key.clone();
            self.requests.run(key, move || {
                let fetch = fetch();
                async move {
                    let result = fetch.await;
                    if let Ok(ref value) = result {
                        let mut entries = lock(&store);
                        if entries.generation(&store_key) == generation {
                            entries.values.insert(store_key, value.clone());
                        } else {
                            debug!(key = ?store_key, "discarding response fetched before invalidation");
                        }
                    }
                    result
                }
                .boxed()
            })
        };

        request.await
    }

    /// Mark `key` stale: drop its value and detach any fetch in flight.
    pub fn invalidate(&self, key: &K) {
        let mut entries = lock(&self.entries);
        *entries.generations.entry(key.clone()).or_insert(0) += 1;
        entries.values.remove(key);
        self.requests.forget(key);
    }

    pub fn peek(&self, key: &K) -> Option<V> {
        lock(&self.entries).values.get(key).cloned()
    }

    pub fn is_fetching(&self, key: &K) -> bool {
        self.requests.is_in_flight(key)
    }
}
