mod common;

use common::{ab_store, key, keyed_store};
use dataset::{DatasetBuilder, Filter, ItemState, LoadOptions, NumberFormat, Replacement};
use serde_json::json;
use std::rc::Rc;

#[test]
fn set_value_modifies_and_dirties() {
    let (mut dataset, log) = ab_store();

    dataset.set_value(&Filter::id(1), "name", "z").unwrap();

    assert_eq!(dataset.get_info(&Filter::id(1)).unwrap()["name"], json!("z"));
    assert_eq!(
        dataset.get_item(&Filter::id(1)).unwrap().state(),
        ItemState::Modified
    );
    assert!(dataset.is_dirty());
    assert_eq!(log.count("modify"), 1);
    assert_eq!(log.entries(), vec!["modify 1 name", "dirty true"]);
}

#[test]
fn local_add_becomes_current() {
    let (mut dataset, _) = ab_store();

    dataset
        .add_data(vec![json!({"id": 3, "name": "c"})], LoadOptions::local())
        .unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(
        dataset.get_item(&Filter::id(3)).unwrap().state(),
        ItemState::Added
    );
    assert!(dataset.is_dirty());
    assert_eq!(dataset.current().unwrap().key(), &key(3));
}

#[test]
fn remove_then_erase() {
    let (mut dataset, _) = ab_store();

    dataset.remove(&Filter::id(2));
    let removed = dataset.dirty_data().removed;
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0]["id"], json!(2));

    dataset.erase(&Filter::id(2));
    assert!(dataset.get_info(&Filter::id(2)).is_none());
    assert!(dataset.dirty_data().is_empty());
    assert!(dataset.get_items(&Filter::dirty()).is_empty());
}

#[test]
fn info_survives_removal_until_erased() {
    let (mut dataset, _) = ab_store();
    let before = dataset.get_info(&Filter::id(2)).cloned().unwrap();

    dataset.remove(&Filter::id(2));
    let item = dataset.get_item(&Filter::id(2)).unwrap();
    assert_eq!(item.record(), Some(&before));
    assert!(item.is_dirty());

    dataset.erase(&Filter::id(2));
    assert!(dataset.get_item(&Filter::id(2)).is_none());
}

#[test]
fn erase_versus_remove_visibility() {
    let (mut dataset, _) = keyed_store(vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
    dataset.select_all(true);

    dataset.remove(&Filter::id(2));
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.keys(&Filter::all()), vec![key(1), key(3)]);
    assert_eq!(dataset.keys(&Filter::dirty()), vec![key(2)]);

    dataset.erase(&Filter::id(3));
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.keys(&Filter::all()), vec![key(1)]);
    assert_eq!(dataset.keys(&Filter::selected()), vec![key(1)]);
    assert!(dataset.keys(&Filter::id(3)).is_empty());
}

#[test]
fn select_unselect_fires_twice() {
    let (mut dataset, log) = ab_store();

    dataset.select(&Filter::id(1), true);
    dataset.select(&Filter::id(1), false);

    assert!(dataset.keys(&Filter::selected()).is_empty());
    assert_eq!(log.count("selection"), 2);
}

#[test]
fn redundant_selection_is_deduplicated_unless_forced() {
    let (mut dataset, log) = ab_store();

    dataset.select(&Filter::id(1), false);
    dataset.select(&Filter::id(1), false);
    assert_eq!(log.count("selection"), 0);

    dataset.select_forced(&Filter::id(1), true);
    dataset.select_forced(&Filter::id(1), false);
    assert_eq!(log.count("selection"), 2);
    assert!(dataset.keys(&Filter::selected()).is_empty());
}

#[test]
fn stateful_reload_without_previous_current() {
    let (mut dataset, _) = keyed_store(vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
    dataset.set_current(&Filter::id(2)).unwrap();

    dataset
        .set_data(
            vec![json!({"id": 3}), json!({"id": 4})],
            LoadOptions::stateful(),
        )
        .unwrap();

    assert_eq!(dataset.current().unwrap().key(), &key(3));
}

#[test]
fn scroll_edges_and_gaps() {
    let (mut dataset, log) = keyed_store(vec![
        json!({"id": 1}),
        json!({"id": 2}),
        json!({"id": 3}),
        json!({"id": 4}),
    ]);

    assert!(!dataset.scroll(-1));
    dataset.remove(&Filter::id(2));
    dataset.set_current(&Filter::id(1)).unwrap();
    log.clear();

    assert!(dataset.scroll(1));
    assert_eq!(dataset.current().unwrap().key(), &key(3));
    assert!(dataset.scroll(1));
    assert!(!dataset.scroll(1));
    assert_eq!(dataset.current().unwrap().key(), &key(4));
    assert_eq!(log.entries(), vec!["current 3", "current 4"]);
}

#[test]
fn notification_order_on_remove() {
    let (mut dataset, log) = ab_store();
    dataset.select(&Filter::id(2), true);
    log.clear();

    dataset.remove(&Filter::id(1));

    assert_eq!(
        log.entries(),
        vec!["remove 1", "dataset 1", "current 2", "selection 2", "dirty true"]
    );
}

#[test]
fn rejected_edit_is_reported_separately() {
    let log = Rc::new(common::Log::default());
    let mut dataset = DatasetBuilder::new()
        .key_properties(["id"])
        .format("qty", NumberFormat)
        .observer(log.clone())
        .build()
        .unwrap();
    dataset
        .set_data(vec![json!({"id": 1, "qty": 3})], LoadOptions::default())
        .unwrap();
    log.clear();

    dataset.set_current_value("qty", "three").unwrap();
    dataset.set_current_value("qty", "1,200").unwrap();

    assert_eq!(
        log.entries(),
        vec!["rejected 1", "modify 1 qty", "dirty true"]
    );
    assert_eq!(dataset.current_value("qty"), "1,200");
}

#[test]
fn commit_cycle_with_replace() {
    let (mut dataset, _) = ab_store();
    dataset.set_value(&Filter::id(1), "name", "edited").unwrap();
    dataset
        .add_record(json!({"id": "new-1", "name": "c"}), LoadOptions::local())
        .unwrap();

    let dirty = dataset.dirty_data();
    assert_eq!(dirty.added.len(), 1);
    assert_eq!(dirty.modified.len(), 1);

    dataset
        .replace(vec![
            Replacement::new(json!({"id": 1, "name": "edited"})),
            Replacement::of("new-1", json!({"id": 3, "name": "c"})),
        ])
        .unwrap();

    assert!(!dataset.is_dirty());
    assert_eq!(dataset.keys(&Filter::all()), vec![key(1), key(2), key(3)]);
}

#[test]
fn missing_identity_fails_fast() {
    assert!(DatasetBuilder::new().build().is_err());
}
