use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Lock a record, recovering the guard if a previous holder panicked.
///
/// Operations validate before they mutate, so a poisoned record is still consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identity keyed store owning one entity type, with one lock per record.
pub(crate) struct Arena<K, V> {
    records: RwLock<HashMap<K, Arc<Mutex<V>>>>,
}

impl<K, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Arena<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn get(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(key).cloned()
    }

    /// Copy of the record, taken under its lock.
    pub(crate) fn read(&self, key: &K) -> Option<V> {
        let record = self.get(key)?;
        let value = lock(&record).clone();
        Some(value)
    }

    /// Insert a new record; returns `false` and leaves the store untouched on a duplicate key.
    pub(crate) fn insert(&self, key: K, value: V) -> bool {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&key) {
            return false;
        }
        records.insert(key, Arc::new(Mutex::new(value)));
        true
    }

    pub(crate) fn handles(&self) -> Vec<Arc<Mutex<V>>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.values().cloned().collect()
    }

    pub(crate) fn values(&self) -> Vec<V> {
        self.handles()
            .iter()
            .map(|record| lock(record).clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
