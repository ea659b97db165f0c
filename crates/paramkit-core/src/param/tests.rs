use super::*;
use crate::{
    Error, MemoryStore, ParamStore,
    store::{WatchCallback, WatchId},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

const ROOT: &str = "User parameter:BaseApp/Preferences/View";

// 0 UseVBO (hook), 1 Size (constrained), 2 HasColor, 3 Color (gated), 4 Font
fn table() -> Vec<ParamInfo> {
    vec![
        ParamInfo::new(0, "UseVBO", ParamKind::Bool, false)
            .with_key(format!("{ROOT}/UseVBO"))
            .with_doc("Use vertex buffer objects")
            .with_notify(),
        ParamInfo::new(1, "Size", ParamKind::Int, 5)
            .with_key(format!("{ROOT}/Size"))
            .with_constraints(Constraints::new(1, 10, 1)),
        ParamInfo::new(2, "HasColor", ParamKind::Bool, true).with_key(format!("{ROOT}/HasColor")),
        ParamInfo::new(3, "Color", ParamKind::Hex, 0xFF00_00FFu32)
            .with_key(format!("{ROOT}/Color"))
            .with_gate(2, 0u32),
        ParamInfo::new(4, "Font", ParamKind::String, "Sans").with_key(format!("{ROOT}/Font")),
    ]
}

fn open(store: &Arc<MemoryStore>, signal: bool) -> ParamSet {
    ParamSet::open("Gui::ViewParams", table(), store.clone(), signal).unwrap()
}

fn counter() -> (Arc<AtomicUsize>, impl Fn(&ChangeEvent) + Send + Sync + 'static) {
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = hits.clone();

    (hits, move |_: &ChangeEvent| {
        seen.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn empty_store_reads_defaults() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);

    assert!(!params.read::<bool>(0));
    assert_eq!(params.read::<i64>(1), 5);
    assert_eq!(params.read::<String>(4), "Sans");
    assert!(store.is_empty(), "opening never writes the store");
}

#[test]
fn store_value_wins_over_default() {
    let store = Arc::new(MemoryStore::with_values([
        (format!("{ROOT}/UseVBO"), Value::Bool(true)),
        (format!("{ROOT}/Size"), Value::Text("7".into())),
    ]));
    let params = open(&store, false);

    assert!(params.read::<bool>(0));
    assert_eq!(params.read::<i64>(1), 7);
    assert!(!params.read_default::<bool>(0));
}

#[test]
fn malformed_stored_value_falls_back_to_default() {
    let store = Arc::new(MemoryStore::with_values([(
        format!("{ROOT}/Size"),
        Value::Text("large".into()),
    )]));
    let params = open(&store, false);

    assert_eq!(params.read::<i64>(1), 5);
}

#[test]
fn slots_end_cached_after_open() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);

    for i in 0..params.len() {
        assert_eq!(params.state(i), Some(CacheState::Cached));
    }
    assert_eq!(store.watch_count(), params.len());
}

#[test]
fn same_value_write_is_a_no_op() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);
    let (hits, cb) = counter();
    params.subscribe(0, cb).unwrap();

    assert!(!params.write(0, false).unwrap());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(store.is_empty());

    assert!(params.write(0, true).unwrap());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        store.get(&StorePath::new(format!("{ROOT}/UseVBO"))),
        Some(Value::Bool(true))
    );
}

#[test]
fn external_change_notifies_once() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);
    let (hits, cb) = counter();
    params.subscribe(0, cb).unwrap();

    let key = StorePath::new(format!("{ROOT}/UseVBO"));
    store.set(&key, Value::Bool(true));
    store.set(&key, Value::Bool(true));

    assert!(params.read::<bool>(0));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn external_removal_restores_default() {
    let store = Arc::new(MemoryStore::with_values([(
        format!("{ROOT}/Font"),
        Value::Text("Mono".into()),
    )]));
    let params = open(&store, false);
    assert_eq!(params.read::<String>(4), "Mono");

    store.remove(&StorePath::new(format!("{ROOT}/Font")));

    assert_eq!(params.read::<String>(4), "Sans");
}

#[test]
fn parameter_without_hook_is_not_observable() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);

    assert!(matches!(
        params.subscribe(4, |_| {}),
        Err(Error::NotObservable { .. })
    ));
    assert!(matches!(
        params.subscribe_all(|_| {}),
        Err(Error::NotObservable { .. })
    ));
}

#[test]
fn class_signal_sees_every_change() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, true);
    let (hits, cb) = counter();
    params.subscribe_all(cb).unwrap();

    params.write(4, "Mono".to_string()).unwrap();
    params.write(1, 6i64).unwrap();
    params.write(1, 6i64).unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn unsubscribe_stops_delivery() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);
    let (hits, cb) = counter();
    let id = params.subscribe(0, cb).unwrap();

    assert!(params.unsubscribe(id));
    params.write(0, true).unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(!params.unsubscribe(id));
}

#[test]
fn gated_parameter_reads_sentinel_when_companion_off() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);

    assert_eq!(params.read::<u32>(3), 0xFF00_00FF);

    params.write(2, false).unwrap();
    assert_eq!(params.read::<u32>(3), 0);
    assert_eq!(params.value(3).unwrap(), Value::UInt(0xFF00_00FF));

    params.write(2, true).unwrap();
    assert_eq!(params.read::<u32>(3), 0xFF00_00FF);
}

#[test]
fn constrained_write_clamps() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);

    params.write(1, 99i64).unwrap();
    assert_eq!(params.read::<i64>(1), 10);

    params
        .bind_constraints(1, Constraints::new(1, 10, 1).rejecting())
        .unwrap();
    assert!(matches!(params.write(1, 0i64), Err(Error::Constraint(_))));
    assert_eq!(params.read::<i64>(1), 10);
}

#[test]
fn constrained_store_value_is_clamped_on_load() {
    let store = Arc::new(MemoryStore::with_values([(
        format!("{ROOT}/Size"),
        Value::Int(-4),
    )]));
    let params = open(&store, false);

    assert_eq!(params.read::<i64>(1), 1);
}

#[test]
fn wrong_kind_write_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);

    let err = params.set(0, Value::Int(1)).unwrap_err();
    assert!(matches!(err, Error::KindMismatch { .. }));
}

#[test]
fn remove_falls_back_and_notifies() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);
    let (hits, cb) = counter();
    params.subscribe(0, cb).unwrap();

    params.write(0, true).unwrap();
    assert!(params.remove(0).unwrap());
    assert!(!params.read::<bool>(0));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(!params.remove(0).unwrap());
}

#[test]
fn typed_observer_receives_native_value() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    params
        .observe::<bool, _>(0, move |v| sink.lock().push(v))
        .unwrap();

    params.write(0, true).unwrap();
    params.write(0, false).unwrap();

    assert_eq!(*seen.lock(), vec![true, false]);
}

#[test]
fn observer_can_read_the_new_value() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);
    let reader = params.clone();
    let seen = Arc::new(parking_lot::Mutex::new(None));
    let sink = seen.clone();
    params
        .subscribe(0, move |_| *sink.lock() = Some(reader.read::<bool>(0)))
        .unwrap();

    params.write(0, true).unwrap();

    assert_eq!(*seen.lock(), Some(true));
}

#[test]
fn dropping_the_set_releases_watches() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);
    assert_eq!(store.watch_count(), 5);

    drop(params);

    assert_eq!(store.watch_count(), 0);
}

#[test]
fn lookups_by_name() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);

    assert_eq!(params.index_of("Color"), Some(3));
    assert_eq!(params.name(0), Some("UseVBO"));
    assert_eq!(params.doc(0), Some("Use vertex buffer objects"));
    assert!(params.get(9).is_err());
    assert_eq!(params.read::<i64>(9), 0);
}

#[test]
fn sparse_table_is_rejected() {
    let store: Arc<dyn ParamStore> = Arc::new(MemoryStore::new());
    let table = vec![ParamInfo::new(1, "A", ParamKind::Bool, false)];

    assert!(matches!(
        ParamSet::open("X", table, store, false),
        Err(Error::InvalidTable { .. })
    ));
}

#[test]
fn gate_on_non_bool_is_rejected() {
    let store: Arc<dyn ParamStore> = Arc::new(MemoryStore::new());
    let table = vec![
        ParamInfo::new(0, "A", ParamKind::Int, 0),
        ParamInfo::new(1, "B", ParamKind::Int, 0).with_gate(0, 0),
    ];

    assert!(ParamSet::open("X", table, store, false).is_err());
}

#[test]
fn int_default_widens_for_float() {
    let store: Arc<dyn ParamStore> = Arc::new(MemoryStore::new());
    let table = vec![ParamInfo::new(0, "Scale", ParamKind::Float, 2)];
    let params = ParamSet::open("X", table, store, false).unwrap();

    assert!((params.read::<f64>(0) - 2.0).abs() < f64::EPSILON);
}

#[test]
fn concurrent_writers_converge() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, true);

    std::thread::scope(|s| {
        for t in 0..4i64 {
            let params = params.clone();
            s.spawn(move || {
                for i in 0..50 {
                    params.write(1, 1 + (t * 50 + i) % 10).unwrap();
                }
            });
        }
    });

    let cached = params.value(1).unwrap();
    let stored = store.get(&StorePath::new(format!("{ROOT}/Size"))).unwrap();
    assert_eq!(cached, stored);
}

// store that takes a write on the watched key while the watch is installed
struct WriteOnWatch {
    inner: MemoryStore,
    value: Value,
}

impl ParamStore for WriteOnWatch {
    fn get(&self, path: &StorePath) -> Option<Value> {
        self.inner.get(path)
    }

    fn set(&self, path: &StorePath, value: Value) {
        self.inner.set(path, value);
    }

    fn remove(&self, path: &StorePath) -> bool {
        self.inner.remove(path)
    }

    fn watch(&self, path: &StorePath, callback: WatchCallback) -> WatchId {
        self.inner.set(path, self.value.clone());
        self.inner.watch(path, callback)
    }

    fn unwatch(&self, id: WatchId) {
        self.inner.unwatch(id);
    }
}

#[test]
fn store_write_during_open_is_not_lost() {
    let store = Arc::new(WriteOnWatch {
        inner: MemoryStore::new(),
        value: Value::Bool(true),
    });
    let params = ParamSet::open("Gui::ViewParams", table(), store.clone(), false).unwrap();

    let key = StorePath::new(format!("{ROOT}/UseVBO"));
    assert_eq!(store.get(&key), Some(Value::Bool(true)));
    assert_eq!(params.value(0).unwrap(), Value::Bool(true));
}

#[test]
fn default_outside_constraints_is_rejected() {
    let store: Arc<dyn ParamStore> = Arc::new(MemoryStore::new());
    let table = vec![
        ParamInfo::new(0, "Level", ParamKind::Int, 15).with_constraints(Constraints::new(0, 10, 1)),
    ];

    let err = ParamSet::open("X", table, store.clone(), false).unwrap_err();
    assert!(matches!(err, Error::InvalidTable { ref reason, .. } if reason.contains("outside")));

    let table = vec![
        ParamInfo::new(0, "Level", ParamKind::UInt, 10u64).with_constraints(Constraints::new(0, 10, 1)),
    ];
    assert!(ParamSet::open("X", table, store, false).is_ok());
}

#[test]
fn observers_never_end_on_a_stale_value() {
    let store = Arc::new(MemoryStore::new());
    let params = open(&store, false);

    let writer = params.clone();
    params
        .subscribe(0, move |event| {
            if event.value == Value::Bool(true) {
                writer.write(0, false).unwrap();
            }
        })
        .unwrap();

    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    params
        .subscribe(0, move |event| sink.lock().push(event.value.clone()))
        .unwrap();

    params.write(0, true).unwrap();

    assert_eq!(params.value(0).unwrap(), Value::Bool(false));
    assert_eq!(*seen.lock(), vec![Value::Bool(false)]);
}
