use crate::{
    Constraints, Error, ParamValue, Value,
    constraint::ConstraintError,
    param::{CacheState, ChangeEvent, ParamInfo, SubscriptionId},
    store::{ParamStore, StorePath, WatchId},
};
use arc_swap::ArcSwap;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::{
    fmt,
    sync::{
        Arc, Weak,
        atomic::{AtomicU8, AtomicU64, Ordering},
    },
};

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

///
/// ParamSet
///
/// Cached, observable view of one parameter class over a store.
///
/// Reads are lock-free snapshots. Writes and invalidations are serialized by
/// a per-set writer lock; the cache is published before observers run and
/// observers are always called with the lock released. The writer lock is
/// re-entrant so a store that fires watches synchronously from `set` can
/// call back into the same set.
///
/// Deliveries for one set are serialized, and an event is dropped when the
/// slot has already moved past its value. Racing changes therefore end with
/// observers having seen the value the cache holds; intermediate values may
/// be skipped.
///

#[derive(Clone)]
pub struct ParamSet {
    inner: Arc<Inner>,
}

struct Inner {
    class: String,
    store: Arc<dyn ParamStore>,
    slots: Vec<Slot>,
    emits_change_signal: bool,
    writer: ReentrantMutex<()>,
    dispatch: ReentrantMutex<()>,
    observers: RwLock<Vec<Observer>>,
    watches: Mutex<Vec<WatchId>>,
    next_subscription: AtomicU64,
}

struct Slot {
    info: ParamInfo,
    value: ArcSwap<Value>,
    state: AtomicU8,
    constraints: RwLock<Option<Constraints>>,
}

struct Observer {
    id: SubscriptionId,
    index: Option<usize>,
    callback: Callback,
}

impl ParamSet {
    /// Bind a parameter table to a store.
    ///
    /// Each slot is seeded from its default, then overlaid with the stored
    /// value if one is present and well-formed. A watch is registered on
    /// every key.
    pub fn open(
        class: impl Into<String>,
        table: Vec<ParamInfo>,
        store: Arc<dyn ParamStore>,
        emits_change_signal: bool,
    ) -> Result<Self, Error> {
        let class = class.into();
        let table = validate_table(&class, table)?;

        let slots = table
            .into_iter()
            .map(|info| Slot {
                constraints: RwLock::new(info.constraints),
                value: ArcSwap::from_pointee(Value::zero(info.kind)),
                state: AtomicU8::new(CacheState::Uninitialized as u8),
                info,
            })
            .collect();

        let inner = Arc::new(Inner {
            class,
            store,
            slots,
            emits_change_signal,
            writer: ReentrantMutex::new(()),
            dispatch: ReentrantMutex::new(()),
            observers: RwLock::new(Vec::new()),
            watches: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        });

        // watch before the overlay read so no store write can fall between
        for slot in &inner.slots {
            slot.value.store(Arc::new(slot.info.default.clone()));
            slot.set_state(CacheState::DefaultSeeded);

            let weak: Weak<Inner> = Arc::downgrade(&inner);
            let index = slot.info.index;
            let id = inner.store.watch(
                &slot.info.key,
                Arc::new(move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.refresh(index);
                    }
                }),
            );
            inner.watches.lock().push(id);

            let _guard = inner.writer.lock();
            let value = inner.load_stored(slot);
            slot.value.store(Arc::new(value));
            slot.set_state(CacheState::StoreOverlaid);

            slot.set_state(CacheState::Cached);
        }

        tracing::debug!(class = %inner.class, params = inner.slots.len(), "parameter set opened");

        Ok(Self { inner })
    }

    #[must_use]
    pub fn class(&self) -> &str {
        &self.inner.class
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    #[must_use]
    pub fn emits_change_signal(&self) -> bool {
        self.inner.emits_change_signal
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ParamStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn info(&self, index: usize) -> Option<&ParamInfo> {
        self.inner.slots.get(index).map(|s| &s.info)
    }

    pub fn infos(&self) -> impl Iterator<Item = &ParamInfo> {
        self.inner.slots.iter().map(|s| &s.info)
    }

    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.info(index).map(|i| i.name.as_ref())
    }

    #[must_use]
    pub fn doc(&self, index: usize) -> Option<&str> {
        self.info(index).map(|i| i.doc.as_ref())
    }

    #[must_use]
    pub fn key(&self, index: usize) -> Option<&StorePath> {
        self.info(index).map(|i| &i.key)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.inner.slots.iter().position(|s| s.info.name == name)
    }

    #[must_use]
    pub fn state(&self, index: usize) -> Option<CacheState> {
        self.inner.slots.get(index).map(Slot::state)
    }

    //
    // reads
    //

    /// Effective value. A parameter gated by a companion toggle reads as its
    /// sentinel while the companion is false.
    pub fn get(&self, index: usize) -> Result<Value, Error> {
        let slot = self.inner.slot(index)?;

        if let Some(gate) = &slot.info.gate {
            let enabled = self.inner.slots[gate.companion]
                .value
                .load()
                .as_bool()
                .unwrap_or(false);
            if !enabled {
                return Ok(gate.sentinel.clone());
            }
        }

        Ok(slot.value.load().as_ref().clone())
    }

    /// Cached value, ignoring any companion gate.
    pub fn value(&self, index: usize) -> Result<Value, Error> {
        Ok(self.inner.slot(index)?.value.load().as_ref().clone())
    }

    pub fn default_value(&self, index: usize) -> Result<Value, Error> {
        Ok(self.inner.slot(index)?.info.default.clone())
    }

    /// Typed read used by generated getters. Never fails: a bad index or a
    /// value of the wrong shape is logged and reads as `T::default()`.
    #[must_use]
    pub fn read<T: ParamValue + Default>(&self, index: usize) -> T {
        self.typed(index, self.get(index))
    }

    #[must_use]
    pub fn read_default<T: ParamValue + Default>(&self, index: usize) -> T {
        self.typed(index, self.default_value(index))
    }

    fn typed<T: ParamValue + Default>(&self, index: usize, value: Result<Value, Error>) -> T {
        match value {
            Ok(v) => T::from_value(&v).unwrap_or_else(|| {
                tracing::warn!(class = %self.inner.class, index, value = %v, "typed read mismatch");
                T::default()
            }),
            Err(e) => {
                tracing::warn!(class = %self.inner.class, error = %e, "typed read failed");
                T::default()
            }
        }
    }

    //
    // writes
    //

    /// Write a value. Returns `Ok(false)` when the value equals the cached
    /// one, in which case neither the store nor any observer is touched.
    pub fn set(&self, index: usize, value: Value) -> Result<bool, Error> {
        let inner = &self.inner;
        let slot = inner.slot(index)?;

        let normalized = slot
            .info
            .kind
            .normalize(&value)
            .ok_or_else(|| Error::KindMismatch {
                class: inner.class.clone(),
                name: slot.info.name.to_string(),
                expected: slot.info.kind,
                got: value.variant_name(),
            })?;
        let constrained = slot.constrain(normalized)?;

        {
            let _guard = inner.writer.lock();
            if slot.value.load().same(&constrained) {
                return Ok(false);
            }

            slot.value.store(Arc::new(constrained.clone()));
            inner.store.set(&slot.info.key, constrained.clone());
        }

        inner.notify(index, constrained);

        Ok(true)
    }

    pub fn write<T: ParamValue>(&self, index: usize, value: T) -> Result<bool, Error> {
        self.set(index, value.into_value())
    }

    /// Delete the stored entry; the slot falls back to its default.
    /// Returns whether the store held a value.
    pub fn remove(&self, index: usize) -> Result<bool, Error> {
        let inner = &self.inner;
        let slot = inner.slot(index)?;

        let (removed, changed) = {
            let _guard = inner.writer.lock();
            let default = slot.info.default.clone();
            let changed = !slot.value.load().same(&default);
            if changed {
                slot.value.store(Arc::new(default));
            }

            (inner.store.remove(&slot.info.key), changed)
        };

        if changed {
            inner.notify(index, slot.info.default.clone());
        }

        Ok(removed)
    }

    /// Re-read one slot from the store, as a watch callback would.
    pub fn refresh(&self, index: usize) -> Result<bool, Error> {
        self.inner.slot(index)?;

        Ok(self.inner.refresh(index))
    }

    //
    // constraints
    //

    pub fn bind_constraints(&self, index: usize, constraints: Constraints) -> Result<(), Error> {
        constraints.check()?;
        let slot = self.inner.slot(index)?;
        *slot.constraints.write() = Some(constraints);

        Ok(())
    }

    #[must_use]
    pub fn constraints(&self, index: usize) -> Option<Constraints> {
        self.inner.slots.get(index).and_then(|s| *s.constraints.read())
    }

    //
    // observers
    //

    /// Observe one parameter. Only parameters declared with a change hook
    /// can be observed individually.
    pub fn subscribe<F>(&self, index: usize, callback: F) -> Result<SubscriptionId, Error>
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let slot = self.inner.slot(index)?;
        if !slot.info.notify {
            return Err(Error::NotObservable {
                class: self.inner.class.clone(),
                name: slot.info.name.to_string(),
            });
        }

        Ok(self.inner.add_observer(Some(index), Arc::new(callback)))
    }

    /// Typed form of `subscribe`, used by generated `on_*_changed` hooks.
    pub fn observe<T, F>(&self, index: usize, callback: F) -> Result<SubscriptionId, Error>
    where
        T: ParamValue + Default,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(index, move |event| {
            callback(T::from_value(&event.value).unwrap_or_default());
        })
    }

    /// Observe the class-wide change signal.
    pub fn subscribe_all<F>(&self, callback: F) -> Result<SubscriptionId, Error>
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        if !self.inner.emits_change_signal {
            return Err(Error::NotObservable {
                class: self.inner.class.clone(),
                name: "*".to_string(),
            });
        }

        Ok(self.inner.add_observer(None, Arc::new(callback)))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.inner.observers.write();
        let before = observers.len();
        observers.retain(|o| o.id != id);

        observers.len() != before
    }
}

impl fmt::Debug for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSet")
            .field("class", &self.inner.class)
            .field("len", &self.inner.slots.len())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn slot(&self, index: usize) -> Result<&Slot, Error> {
        self.slots.get(index).ok_or_else(|| Error::IndexOutOfRange {
            class: self.class.clone(),
            index,
            len: self.slots.len(),
        })
    }

    // stored value if present and well-formed, otherwise the default
    fn load_stored(&self, slot: &Slot) -> Value {
        let Some(raw) = self.store.get(&slot.info.key) else {
            return slot.info.default.clone();
        };

        let Some(value) = slot.info.kind.coerce(&raw) else {
            tracing::warn!(
                class = %self.class,
                key = %slot.info.key,
                value = %raw,
                expected = %slot.info.kind,
                "malformed stored value, using default"
            );
            return slot.info.default.clone();
        };

        match slot.constrain(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(class = %self.class, key = %slot.info.key, error = %e, "stored value rejected, using default");
                slot.info.default.clone()
            }
        }
    }

    fn refresh(&self, index: usize) -> bool {
        let slot = &self.slots[index];

        let changed = {
            let _guard = self.writer.lock();
            slot.set_state(CacheState::Invalidated);
            tracing::trace!(class = %self.class, key = %slot.info.key, "slot invalidated");

            let fresh = self.load_stored(slot);
            let changed = !slot.value.load().same(&fresh);
            if changed {
                slot.value.store(Arc::new(fresh.clone()));
            }
            slot.set_state(CacheState::Cached);

            changed.then_some(fresh)
        };

        match changed {
            Some(value) => {
                self.notify(index, value);
                true
            }
            None => false,
        }
    }

    fn add_observer(&self, index: Option<usize>, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push(Observer {
            id,
            index,
            callback,
        });

        id
    }

    fn notify(&self, index: usize, value: Value) {
        let slot = &self.slots[index];
        let callbacks: Vec<Callback> = self
            .observers
            .read()
            .iter()
            .filter(|o| match o.index {
                Some(i) => slot.info.notify && i == index,
                None => self.emits_change_signal,
            })
            .map(|o| o.callback.clone())
            .collect();

        if callbacks.is_empty() {
            return;
        }

        let _dispatch = self.dispatch.lock();
        tracing::debug!(
            class = %self.class,
            param = %slot.info.name,
            observers = callbacks.len(),
            "dispatching change"
        );

        let event = ChangeEvent { index, value };
        for cb in callbacks {
            // a newer change already delivered its own event
            if !slot.value.load().same(&event.value) {
                tracing::trace!(class = %self.class, param = %slot.info.name, "stale change dropped");
                break;
            }
            cb(&event);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for id in self.watches.get_mut().drain(..) {
            self.store.unwatch(id);
        }
    }
}

impl Slot {
    fn state(&self) -> CacheState {
        CacheState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: CacheState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn constrain(&self, value: Value) -> Result<Value, ConstraintError> {
        let Some(constraints) = *self.constraints.read() else {
            return Ok(value);
        };

        match value {
            Value::Int(v) => constraints.apply(v).map(Value::Int),
            Value::UInt(v) => {
                let clamped = constraints.apply(i64::try_from(v).unwrap_or(i64::MAX))?;
                Ok(Value::UInt(u64::try_from(clamped).unwrap_or(0)))
            }
            other => Ok(other),
        }
    }
}

// index order, companion shape and normalized defaults
fn validate_table(class: &str, mut table: Vec<ParamInfo>) -> Result<Vec<ParamInfo>, Error> {
    let invalid = |reason: String| Error::InvalidTable {
        class: class.to_string(),
        reason,
    };

    let kinds: Vec<_> = table.iter().map(|i| i.kind).collect();

    for (position, info) in table.iter_mut().enumerate() {
        if info.index != position {
            return Err(invalid(format!(
                "'{}' has index {} at position {position}",
                info.name, info.index
            )));
        }

        info.default = info.kind.normalize(&info.default).ok_or_else(|| {
            invalid(format!(
                "default {} of '{}' is not a {}",
                info.default, info.name, info.kind
            ))
        })?;

        if let Some(gate) = &info.gate {
            match kinds.get(gate.companion) {
                Some(crate::ParamKind::Bool) if gate.companion != position => {}
                _ => {
                    return Err(invalid(format!(
                        "'{}' is gated on index {}, which is not a Bool parameter",
                        info.name, gate.companion
                    )));
                }
            }
        }

        if let Some(c) = &info.constraints {
            if !info.kind.is_integer() {
                return Err(invalid(format!(
                    "'{}' is constrained but is a {}",
                    info.name, info.kind
                )));
            }
            c.check().map_err(|e| invalid(format!("'{}': {e}", info.name)))?;

            let default = match info.default {
                Value::Int(v) => Some(v),
                Value::UInt(v) => Some(i64::try_from(v).unwrap_or(i64::MAX)),
                _ => None,
            };
            if let Some(v) = default.filter(|v| !c.contains(*v)) {
                return Err(invalid(format!(
                    "default {v} of '{}' is outside [{}, {}]",
                    info.name, c.min, c.max
                )));
            }
        }
    }

    Ok(table)
}
