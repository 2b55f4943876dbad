//! Integration tests for typed collections over the in-memory document store.


use std::sync::Arc;

use entities::{Account, Person};
use serde_json::json;
use sourced_mapping::{
    CollectionsExt, ConversionErrorKind, Document, DocumentStore, Entity, Filter,
    InMemoryDocumentStore, Mapper, MappingError, StoreError,
};

#[test]
fn insert_get_delete_with_renamed_key() {
    let model = Mapper::new().build::<Person>().unwrap();
    let store = InMemoryDocumentStore::new();
    let people = store.collection(&model);

    let person = Person::new(1, &["x", "y"]);
    people.insert(&person).unwrap();

    let found = people.get(&1).unwrap().unwrap();
    assert_eq!(found.data.names, vec!["x", "y"]);
    assert_eq!(found.version, 1);

    assert!(people.delete(&person).unwrap());
    assert_eq!(store.count("people", &Filter::All).unwrap(), 0);
}

#[test]
fn stored_documents_use_resolved_names() {
    let model = Mapper::new().build::<Person>().unwrap();
    let store = InMemoryDocumentStore::new();
    let people = store.collection(&model);

    people.insert(&Person::new(1, &["x"])).unwrap();
    people.update(&Person::new(1, &["x", "z"])).unwrap();

    let raw = store.find("people", &Filter::eq("_id", 1)).unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(
        raw[0].data,
        Document::new().with("_id", 1).with("nm", json!(["x", "z"]))
    );
    assert!(store.find("people", &Filter::eq("id", 1)).unwrap().is_empty());

    let by_names = people
        .find_by("names", &vec!["x".to_string(), "z".to_string()])
        .unwrap();
    assert_eq!(by_names.len(), 1);
    assert_eq!(by_names[0].version, 2);
}

#[test]
fn deleting_an_instance_removes_exactly_its_document() {
    let model = Mapper::new().build::<Person>().unwrap();
    let store = InMemoryDocumentStore::new();
    let people = store.collection(&model);

    let everyone: Vec<_> = (1..=5).map(|id| Person::new(id, &["p"])).collect();
    for person in &everyone {
        people.insert(person).unwrap();
    }

    assert!(people.delete(&everyone[2]).unwrap());
    assert!(!people.delete(&everyone[2]).unwrap());

    let remaining: Vec<i32> = people
        .all()
        .unwrap()
        .into_iter()
        .map(|found| found.data.id)
        .collect();
    assert_eq!(remaining, vec![1, 2, 4, 5]);
}

#[test]
fn duplicate_keys_are_rejected() {
    let model = Mapper::new().build::<Person>().unwrap();
    let store = InMemoryDocumentStore::new();
    let people = store.collection(&model);

    people.insert(&Person::new(1, &["a"])).unwrap();
    let err = people.insert(&Person::new(1, &["b"])).unwrap_err();
    assert_eq!(
        err,
        MappingError::Store(StoreError::DuplicateKey {
            collection: "people".into()
        })
    );
}

#[test]
fn versioned_updates_detect_conflicts() {
    let model = Mapper::new().build::<Account>().unwrap();
    let store = InMemoryDocumentStore::new();
    let accounts = store.collection(&model);

    let mut account = Account::new("acc-1", "ada", 100);
    accounts.insert(&account).unwrap();

    account.balance = 80;
    assert_eq!(accounts.update_versioned(&account, 1).unwrap(), 2);

    account.balance = 50;
    let err = accounts.update_versioned(&account, 1).unwrap_err();
    assert!(matches!(
        err,
        MappingError::Store(StoreError::ConcurrencyConflict {
            expected: 1,
            actual: 2,
            ..
        })
    ));
    assert_eq!(accounts.get(&"acc-1".to_string()).unwrap().unwrap().data.balance, 80);
}

#[test]
fn update_of_unknown_entity_is_not_found() {
    let model = Mapper::new().build::<Account>().unwrap();
    let store = InMemoryDocumentStore::new();
    let err = store
        .collection(&model)
        .update(&Account::new("ghost", "nobody", 0))
        .unwrap_err();
    assert!(matches!(err, MappingError::Store(StoreError::NotFound { .. })));
}

#[test]
fn upsert_inserts_then_replaces() {
    let model = Mapper::new().build::<Account>().unwrap();
    let store = InMemoryDocumentStore::new();
    let accounts = store.collection(&model);

    let mut account = Account::new("acc-1", "ada", 10);
    assert_eq!(accounts.upsert(&account).unwrap(), 1);
    account.closed_at = Some(1_700_000_000);
    assert_eq!(accounts.upsert(&account).unwrap(), 2);

    assert_eq!(accounts.count(&Filter::All).unwrap(), 1);
    let stored = accounts.get(&"acc-1".to_string()).unwrap().unwrap();
    assert_eq!(stored.data.closed_at, Some(1_700_000_000));
}

#[test]
fn concurrent_upserts_of_a_new_entity_all_succeed() {
    let model = Mapper::new().build::<Account>().unwrap();
    let store = InMemoryDocumentStore::new();

    std::thread::scope(|scope| {
        for balance in 0..8 {
            let model = Arc::clone(&model);
            let store = store.clone();
            scope.spawn(move || {
                store
                    .collection(&model)
                    .upsert(&Account::new("acc-1", "ada", balance))
                    .unwrap();
            });
        }
    });

    let accounts = store.collection(&model);
    assert_eq!(accounts.count(&Filter::All).unwrap(), 1);
    assert_eq!(accounts.get(&"acc-1".to_string()).unwrap().unwrap().version, 8);
}

#[test]
fn skipped_fields_are_not_stored() {
    let model = Mapper::new().build::<Account>().unwrap();
    assert_eq!(Account::COLLECTION, "accounts");
    assert_eq!(model.key_field(), "id");

    let store = InMemoryDocumentStore::new();
    let accounts = store.collection(&model);
    accounts.insert(&Account::new("acc-1", "ada", 10)).unwrap();

    let raw = &store.find("accounts", &Filter::All).unwrap()[0].data;
    assert!(!raw.contains("cached_label"));
    assert_eq!(raw.get("closed_at"), Some(&json!(null)));

    let read = accounts.all().unwrap().remove(0).data;
    assert_eq!(read.cached_label, "");
    assert_eq!(read.owner, "ada");
}

#[test]
fn documents_missing_required_fields_fail_to_materialize() {
    let model = Mapper::new().build::<Person>().unwrap();
    let store = InMemoryDocumentStore::new();
    store
        .insert("people", &Filter::eq("_id", 1), Document::new().with("_id", 1))
        .unwrap();
    store
        .insert(
            "people",
            &Filter::eq("_id", 2),
            Document::new().with("_id", 2).with("nm", json!(["ok"])),
        )
        .unwrap();

    let people = store.collection(&model);
    match people.get(&1).unwrap_err() {
        MappingError::Conversion(err) => {
            assert_eq!(err.path, "nm");
            assert_eq!(err.kind, ConversionErrorKind::Missing);
        }
        other => panic!("unexpected error {:?}", other),
    }

    // The broken document does not affect reads of its neighbours.
    assert_eq!(people.get(&2).unwrap().unwrap().data.names, vec!["ok"]);
}

#[test]
fn models_and_stores_are_shared_across_threads() {
    let model = Mapper::new().build::<Person>().unwrap();
    let store = InMemoryDocumentStore::new();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let model = Arc::clone(&model);
            let store = store.clone();
            scope.spawn(move || {
                let people = store.collection(&model);
                for n in 0..10 {
                    let id = worker * 10 + n;
                    people.insert(&Person::new(id, &["t"])).unwrap();
                    assert_eq!(people.get(&id).unwrap().unwrap().data.id, id);
                }
            });
        }
    });

    assert_eq!(store.count("people", &Filter::All).unwrap(), 40);
}
