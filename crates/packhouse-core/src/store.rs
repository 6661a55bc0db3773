//! # Generic In-Memory Store
//!
//! Thread-safe, cloneable keyed store used by every service in the
//! workspace. All operations are synchronous (the RwLock is
//! `parking_lot`, not `tokio::sync`) because locks are never held
//! across `.await` points. `parking_lot::RwLock` is non-poisonable —
//! a panicking writer does not permanently corrupt the store.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

/// Thread-safe, cloneable in-memory keyed store.
#[derive(Debug)]
pub struct Store<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync,
{
    data: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for Store<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.data.write().insert(key, value)
    }

    /// Retrieve a record by key.
    pub fn get(&self, key: &K) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<V> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None`
    /// if the key is absent.
    pub fn update(&self, key: &K, f: impl FnOnce(&mut V)) -> Option<V> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(key) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure may inspect the current state, validate preconditions,
    /// mutate the record, and return `Ok(R)` or `Err(E)`. The entire
    /// operation runs under a single write lock, eliminating TOCTOU races
    /// between read and update.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        key: &K,
        f: impl FnOnce(&mut V) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(key).map(f)
    }

    /// Remove a record by key.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.data.write().remove(key)
    }

    /// Check if a record exists.
    pub fn contains(&self, key: &K) -> bool {
        self.data.read().contains_key(key)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for Store<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn insert_get_roundtrip() {
        let store: Store<Uuid, String> = Store::new();
        let id = Uuid::new_v4();
        assert!(store.insert(id, "a".to_string()).is_none());
        assert_eq!(store.get(&id), Some("a".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_mutates_in_place() {
        let store: Store<Uuid, u32> = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, 1);
        let updated = store.update(&id, |v| *v += 1);
        assert_eq!(updated, Some(2));
        assert_eq!(store.get(&id), Some(2));
    }

    #[test]
    fn update_missing_returns_none() {
        let store: Store<Uuid, u32> = Store::new();
        assert!(store.update(&Uuid::new_v4(), |v| *v += 1).is_none());
    }

    #[test]
    fn try_update_rejects_without_mutating() {
        let store: Store<Uuid, u32> = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, 5);

        let result: Option<Result<(), &str>> = store.try_update(&id, |v| {
            if *v >= 5 {
                Err("at capacity")
            } else {
                *v += 1;
                Ok(())
            }
        });
        assert_eq!(result, Some(Err("at capacity")));
        assert_eq!(store.get(&id), Some(5));
    }

    #[test]
    fn remove_returns_value() {
        let store: Store<Uuid, u32> = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, 9);
        assert_eq!(store.remove(&id), Some(9));
        assert!(store.is_empty());
    }
}
