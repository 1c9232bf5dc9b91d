//! Per-key critical sections.
//!
//! A `KeyedMutex` hands out one `Mutex` per key. The outer map lock is held
//! only long enough to find or create a slot, so work on different keys never
//! serializes, while a read-modify-write on the same key always does.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

pub struct KeyedMutex<K, V> {
    slots: RwLock<HashMap<K, Arc<Mutex<V>>>>,
}

impl<K, V> KeyedMutex<K, V>
where
    K: Eq + Hash + Copy,
    V: Default,
{
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Run `f` with exclusive access to the value for `key`, creating it first
    /// if this is the first time the key is seen.
    pub fn with<R>(&self, key: K, f: impl FnOnce(&mut V) -> R) -> R {
        let slot = self.slot_or_insert(key);
        let mut guard = lock(&slot);
        f(&mut guard)
    }

    /// Like [`KeyedMutex::with`] but never creates a slot; returns `None` for
    /// unknown keys.
    pub fn with_existing<R>(&self, key: K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let slot = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()?;
        let mut guard = lock(&slot);
        Some(f(&mut guard))
    }

    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot_or_insert(&self, key: K) -> Arc<Mutex<V>> {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key).or_default())
    }
}

impl<K, V> Default for KeyedMutex<K, V>
where
    K: Eq + Hash + Copy,
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

// Protected values are plain data and stay valid after a panic.
fn lock<V>(slot: &Mutex<V>) -> MutexGuard<'_, V> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn with_existing_does_not_create_slots() {
        let map: KeyedMutex<u64, Vec<u32>> = KeyedMutex::new();
        assert!(map.with_existing(1, |v| v.len()).is_none());
        assert!(map.is_empty());

        map.with(1, |v| v.push(10));
        assert_eq!(map.with_existing(1, |v| v.clone()), Some(vec![10]));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn same_key_updates_are_serialized() {
        let map: Arc<KeyedMutex<u64, u64>> = Arc::new(KeyedMutex::new());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let map = Arc::clone(&map);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        map.with(42, |counter| {
                            let current = *counter;
                            thread::yield_now();
                            *counter = current + 1;
                        });
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(map.with(42, |counter| *counter), 8000);
    }
}
