//! Persistence Integration Tests
//!
//! Saves a navigation path through a shared store and restores it into a
//! fresh engine:
//! 1. Round-trip through MemoryStore and FileStore
//! 2. Saved paths that no longer fit the dataset or config
//! 3. Malformed or unavailable stored values
//!
//! Run with: cargo test --test persistence_integration

use drilldown::{
    DrillDownConfig, DrillDownEngine, FileStore, MemoryStore, Node, PathEntry, PathStore,
    PersistedPath, StoreError,
};
use std::sync::Arc;

const KEY: &str = "commission-by-region";

fn dataset() -> Vec<Node> {
    vec![
        Node::new("amer", "AMER", 500.0).with_children(vec![
            Node::new("us", "US", 400.0).with_children(vec![
                Node::new("us-west", "West", 250.0)
                    .with_children(vec![Node::new("rep-1", "Dana", 250.0).with_meta("quota", 0.8)]),
                Node::new("us-east", "East", 150.0),
            ]),
            Node::new("ca", "Canada", 100.0),
        ]),
        Node::new("emea", "EMEA", 300.0)
            .with_children(vec![Node::new("de", "Germany", 300.0)]),
    ]
}

fn config() -> DrillDownConfig {
    DrillDownConfig::default().with_persistence_key(KEY)
}

/// Store that fails every call.
struct BrokenStore;

impl PathStore for BrokenStore {
    fn save(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }
    fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Poisoned)
    }
    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }
}

#[test]
fn memory_round_trip_restores_position() {
    let store = Arc::new(MemoryStore::new());

    let mut first = DrillDownEngine::with_store(dataset(), config(), store.clone());
    assert!(first.drill_down("amer"));
    assert!(first.drill_down("us"));
    let saved_state = first.state();

    let second = DrillDownEngine::with_store(dataset(), config(), store.clone());
    assert_eq!(second.state(), saved_state);
    assert_eq!(second.current_depth(), 2);
    assert_eq!(second.current_data()[0].id, "us-west");
}

#[test]
fn file_round_trip_restores_position() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());

    let mut first = DrillDownEngine::with_store(dataset(), config(), store.clone());
    assert!(first.go_to_path(&["AMER", "US", "West"]));

    let second = DrillDownEngine::with_store(dataset(), config(), store);
    assert_eq!(second.current_path(), first.current_path());
    assert_eq!(second.breadcrumbs(), first.breadcrumbs());
    assert_eq!(second.current_data(), first.current_data());
}

#[test]
fn restore_without_breadcrumbs_keeps_them_empty() {
    let store = Arc::new(MemoryStore::new());
    let mut first = DrillDownEngine::with_store(dataset(), config(), store.clone());
    first.drill_down("emea");

    let second =
        DrillDownEngine::with_store(dataset(), config().with_breadcrumbs(false), store.clone());
    assert_eq!(second.current_depth(), 1);
    assert!(second.breadcrumbs().is_empty());
}

#[test]
fn saved_path_deeper_than_max_depth_starts_at_root() {
    let store = Arc::new(MemoryStore::new());
    let mut first = DrillDownEngine::with_store(dataset(), config(), store.clone());
    first.go_to_path(&["AMER", "US", "West"]);

    let second = DrillDownEngine::with_store(dataset(), config().with_max_depth(2), store.clone());
    assert_eq!(second.current_depth(), 0);
    assert_eq!(second.current_data(), second.root_data());
}

#[test]
fn saved_path_through_a_leaf_starts_at_root() {
    let store = Arc::new(MemoryStore::new());
    let mut first = DrillDownEngine::with_store(dataset(), config(), store.clone());
    first.go_to_path(&["AMER", "US"]);

    // Same ids, but US lost its children
    let mut changed = dataset();
    changed[0].children[0].children.clear();

    let second = DrillDownEngine::with_store(changed, config(), store.clone());
    assert_eq!(second.current_depth(), 0);
}

#[test]
fn saved_path_with_unknown_id_starts_at_root() {
    let store = Arc::new(MemoryStore::new());
    let saved = PersistedPath::now(
        vec![PathEntry {
            id: "apac".into(),
            name: "APAC".into(),
            level: 0,
        }],
        vec![],
    );
    store.save(KEY, &saved.encode().unwrap()).unwrap();

    let engine = DrillDownEngine::with_store(dataset(), config(), store);
    assert_eq!(engine.current_depth(), 0);
}

#[test]
fn malformed_saved_value_starts_at_root() {
    let store = Arc::new(MemoryStore::new());
    for garbage in ["", "{", "[]", "null", r#"{"currentPath": 7}"#] {
        store.save(KEY, garbage).unwrap();
        let mut engine = DrillDownEngine::with_store(dataset(), config(), store.clone());
        assert_eq!(engine.current_depth(), 0, "value {:?}", garbage);
        assert!(engine.drill_down("amer"));
    }
}

#[test]
fn broken_store_never_surfaces() {
    let mut engine = DrillDownEngine::with_store(dataset(), config(), Arc::new(BrokenStore));
    assert_eq!(engine.current_depth(), 0);
    assert!(engine.drill_down("amer"));
    assert!(engine.drill_up());
    engine.reset();
}

#[test]
fn separate_keys_do_not_interfere() {
    let store = Arc::new(MemoryStore::new());
    let mut left = DrillDownEngine::with_store(
        dataset(),
        DrillDownConfig::default().with_persistence_key("left"),
        store.clone(),
    );
    let mut right = DrillDownEngine::with_store(
        dataset(),
        DrillDownConfig::default().with_persistence_key("right"),
        store.clone(),
    );
    left.drill_down("amer");
    right.drill_down("emea");

    let restored = DrillDownEngine::with_store(
        dataset(),
        DrillDownConfig::default().with_persistence_key("left"),
        store.clone(),
    );
    assert_eq!(restored.current_path()[0].id, "amer");
    assert_eq!(store.len().unwrap(), 2);
}

#[test]
fn file_store_keys_differing_in_punctuation_stay_apart() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let keyed = |key: &str| {
        DrillDownEngine::with_store(
            dataset(),
            DrillDownConfig::default().with_persistence_key(key),
            store.clone(),
        )
    };

    let mut dotted = keyed("chart.1");
    assert!(dotted.drill_down("amer"));
    let mut spaced = keyed("chart 1");
    assert!(spaced.drill_down("emea"));

    assert_eq!(keyed("chart.1").current_path()[0].id, "amer");
    assert_eq!(keyed("chart 1").current_path()[0].id, "emea");
    assert_eq!(keyed("chart_1").current_depth(), 0);
}
