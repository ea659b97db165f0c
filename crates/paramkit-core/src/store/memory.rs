use crate::{
    Value,
    store::{ParamStore, StorePath, WatchCallback, WatchId},
};
use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

///
/// MemoryStore
///
/// In-process store. Writes that do not change the stored value are
/// dropped without firing watches; callbacks run after both maps are
/// unlocked.
///

#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<StorePath, Value>>,
    watchers: RwLock<BTreeMap<WatchId, (StorePath, WatchCallback)>>,
    next_watch: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed values without firing watches.
    #[must_use]
    pub fn with_values<I, P>(values: I) -> Self
    where
        I: IntoIterator<Item = (P, Value)>,
        P: Into<StorePath>,
    {
        let store = Self::new();
        store
            .values
            .write()
            .extend(values.into_iter().map(|(p, v)| (p.into(), v)));

        store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    #[must_use]
    pub fn watch_count(&self) -> usize {
        self.watchers.read().len()
    }

    /// Copy of every stored entry in path order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(StorePath, Value)> {
        self.values
            .read()
            .iter()
            .map(|(p, v)| (p.clone(), v.clone()))
            .collect()
    }

    fn fire(&self, path: &StorePath) {
        let callbacks: Vec<WatchCallback> = self
            .watchers
            .read()
            .values()
            .filter(|(watched, _)| watched == path)
            .map(|(_, cb)| cb.clone())
            .collect();

        for cb in callbacks {
            cb(path);
        }
    }
}

impl ParamStore for MemoryStore {
    fn get(&self, path: &StorePath) -> Option<Value> {
        self.values.read().get(path).cloned()
    }

    fn set(&self, path: &StorePath, value: Value) {
        let changed = {
            let mut values = self.values.write();
            match values.get(path) {
                Some(current) if current.same(&value) => false,
                _ => {
                    values.insert(path.clone(), value);
                    true
                }
            }
        };

        if changed {
            tracing::trace!(path = %path, "store value changed");
            self.fire(path);
        }
    }

    fn remove(&self, path: &StorePath) -> bool {
        let removed = self.values.write().remove(path).is_some();
        if removed {
            self.fire(path);
        }

        removed
    }

    fn watch(&self, path: &StorePath, callback: WatchCallback) -> WatchId {
        let id = WatchId(self.next_watch.fetch_add(1, Ordering::Relaxed));
        self.watchers.write().insert(id, (path.clone(), callback));

        id
    }

    fn unwatch(&self, id: WatchId) {
        self.watchers.write().remove(&id);
    }
}
