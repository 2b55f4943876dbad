//! Integration tests for materializing entities out of documents.

mod containers;

use std::collections::{BTreeSet, LinkedList, VecDeque};

use containers::{Bag, Sorted};
use proptest::prelude::*;
use serde_json::json;
use sourced_mapping::bind::{ConstructorKind, ContainerShape};
use sourced_mapping::{
    Bytes, CollectionsExt, ConversionErrorKind, Document, Entity, InMemoryDocumentStore, Mapper,
};

#[derive(Debug, Clone, PartialEq, Entity)]
#[entity(collection = "shelves")]
struct Shelf {
    id: i64,
    labels: Vec<String>,
    queue: VecDeque<i32>,
    history: LinkedList<u16>,
    heights: Box<[f64]>,
    rgb: [u8; 3],
    grid: Vec<Vec<u8>>,
    layers: VecDeque<Box<[i16]>>,
    sorted: Sorted<i32>,
    bag: Bag<String>,
    tags: BTreeSet<String>,
    note: Option<String>,
    blob: Bytes,
}

fn shelf() -> Shelf {
    Shelf {
        id: 1,
        labels: vec!["c".into(), "a".into(), "b".into()],
        queue: VecDeque::from(vec![3, 1, 2]),
        history: [9u16, 8, 7].into_iter().collect(),
        heights: vec![1.5, -2.25].into_boxed_slice(),
        rgb: [255, 0, 128],
        grid: vec![vec![1, 2], vec![], vec![3]],
        layers: VecDeque::from(vec![vec![-1i16, 2].into_boxed_slice(), Box::default()]),
        sorted: Sorted::new(vec![5, 3, 4]),
        bag: ["z", "y"].into_iter().map(String::from).collect(),
        tags: ["red", "blue"].into_iter().map(String::from).collect(),
        note: None,
        blob: Bytes(vec![0xde, 0xad]),
    }
}

#[test]
fn every_container_round_trips_through_the_store() {
    let model = Mapper::new().build::<Shelf>().unwrap();
    let store = InMemoryDocumentStore::new();
    let shelves = store.collection(&model);

    let shelf = shelf();
    shelves.insert(&shelf).unwrap();
    let read = shelves.get(&1i64).unwrap().unwrap().data;

    assert_eq!(read, shelf);
    assert_eq!(read.sorted.as_slice(), &[3, 4, 5]);
    assert_eq!(read.bag.iter().collect::<Vec<_>>(), vec!["z", "y"]);
}

#[test]
fn stored_form_is_plain_arrays() {
    let model = Mapper::new().build::<Shelf>().unwrap();
    let doc = model.to_document(&shelf());

    assert_eq!(doc.get("labels"), Some(&json!(["c", "a", "b"])));
    assert_eq!(doc.get("queue"), Some(&json!([3, 1, 2])));
    assert_eq!(doc.get("grid"), Some(&json!([[1, 2], [], [3]])));
    assert_eq!(doc.get("layers"), Some(&json!([[-1, 2], []])));
    assert_eq!(doc.get("tags"), Some(&json!(["blue", "red"])));
    assert_eq!(doc.get("note"), Some(&json!(null)));
    assert_eq!(doc.get("blob"), Some(&json!("3q0=")));
}

#[test]
fn shapes_describe_reconstruction() {
    let model = Mapper::new().build::<Shelf>().unwrap();
    let shape = |property: &str| model.property(property).unwrap().shape().unwrap().clone();

    assert!(shape("id").is_scalar());
    assert!(matches!(shape("labels").container, ContainerShape::Array { .. }));
    assert!(!shape("labels").coerced);
    assert!(shape("heights").coerced);
    assert!(shape("rgb").coerced);
    assert_eq!(shape("grid").depth(), 2);
    assert_eq!(shape("layers").depth(), 2);
    assert!(shape("note").nullable);

    let constructor = |property: &str| match &shape(property).container {
        ContainerShape::Sequence { constructor, .. } => *constructor,
        other => panic!("{} is not a sequence: {:?}", property, other),
    };
    assert_eq!(constructor("queue").kind, ConstructorKind::FromVec);
    assert_eq!(constructor("history").kind, ConstructorKind::FromIterator);
    assert_eq!(constructor("sorted").name, "Sorted::new");
    assert_eq!(constructor("bag").kind, ConstructorKind::FromIterator);
}

#[test]
fn missing_required_scalar_is_an_error() {
    let model = Mapper::new().build::<Shelf>().unwrap();
    let mut doc = model.to_document(&shelf());
    doc.remove("id");

    let err = model.from_document(&doc).unwrap_err();
    assert_eq!(err.path, "id");
    assert_eq!(err.kind, ConversionErrorKind::Missing);
}

#[test]
fn null_required_scalar_is_an_error() {
    let model = Mapper::new().build::<Shelf>().unwrap();
    let mut doc = model.to_document(&shelf());
    doc.insert("id", json!(null));

    let err = model.from_document(&doc).unwrap_err();
    assert!(matches!(err.kind, ConversionErrorKind::TypeMismatch { found: "null", .. }));
}

#[test]
fn missing_optional_field_is_none() {
    let model = Mapper::new().build::<Shelf>().unwrap();
    let mut doc = model.to_document(&Shelf {
        note: Some("fragile".into()),
        ..shelf()
    });
    assert_eq!(model.from_document(&doc).unwrap().note.as_deref(), Some("fragile"));

    doc.remove("note");
    assert_eq!(model.from_document(&doc).unwrap().note, None);
}

#[test]
fn conversion_errors_locate_the_element() {
    let model = Mapper::new().build::<Shelf>().unwrap();

    let mut doc = model.to_document(&shelf());
    doc.insert("grid", json!([[1], [2, 300]]));
    let err = model.from_document(&doc).unwrap_err();
    assert_eq!(err.path, "grid[1][1]");
    assert!(matches!(err.kind, ConversionErrorKind::OutOfRange { .. }));

    let mut doc = model.to_document(&shelf());
    doc.insert("queue", json!([1, "2"]));
    assert_eq!(model.from_document(&doc).unwrap_err().path, "queue[1]");

    let mut doc = model.to_document(&shelf());
    doc.insert("rgb", json!([1, 2]));
    assert_eq!(
        model.from_document(&doc).unwrap_err().kind,
        ConversionErrorKind::Length {
            expected: 3,
            found: 2
        }
    );

    let mut doc = model.to_document(&shelf());
    doc.insert("labels", json!({"0": "a"}));
    assert!(matches!(
        model.from_document(&doc).unwrap_err().kind,
        ConversionErrorKind::TypeMismatch {
            expected: "array",
            ..
        }
    ));
}

#[test]
fn documents_from_json_materialize() {
    let model = Mapper::new().build::<Shelf>().unwrap();
    let doc: Document = serde_json::from_value(json!({
        "id": 2,
        "labels": [],
        "queue": [],
        "history": [],
        "heights": [],
        "rgb": [0, 0, 0],
        "grid": [],
        "layers": [],
        "sorted": [2, 1],
        "bag": [],
        "tags": ["a", "a"],
        "blob": ""
    }))
    .unwrap();

    let read = model.from_document(&doc).unwrap();
    assert_eq!(read.id, 2);
    assert_eq!(read.sorted.as_slice(), &[1, 2]);
    assert_eq!(read.tags.len(), 1);
    assert_eq!(read.note, None);
    assert!(read.blob.0.is_empty());
}

fn arb_shelf() -> impl Strategy<Value = Shelf> {
    (
        any::<i64>(),
        prop::collection::vec(".{0,8}", 0..6),
        prop::collection::vec(any::<i32>(), 0..6),
        prop::collection::vec(any::<u16>(), 0..6),
        prop::collection::vec(-1.0e9f64..1.0e9, 0..6),
        any::<[u8; 3]>(),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..4),
        prop::collection::vec(prop::collection::vec(any::<i16>(), 0..4), 0..4),
        prop::collection::vec(any::<i32>(), 0..6),
        prop::option::of(".{0,8}"),
        prop::collection::vec(any::<u8>(), 0..16),
    )
        .prop_map(
            |(id, labels, queue, history, heights, rgb, grid, layers, sorted, note, blob)| Shelf {
                id,
                bag: labels.iter().cloned().collect(),
                tags: labels.iter().cloned().collect(),
                labels,
                queue: queue.into(),
                history: history.into_iter().collect(),
                heights: heights.into_boxed_slice(),
                rgb,
                grid,
                layers: layers.into_iter().map(Vec::into_boxed_slice).collect(),
                sorted: Sorted::new(sorted),
                note,
                blob: Bytes(blob),
            },
        )
}

proptest! {
    #[test]
    fn round_trip_preserves_order_and_length(shelf in arb_shelf()) {
        let model = Mapper::new().build::<Shelf>().unwrap();
        let doc = model.to_document(&shelf);
        let read = model.from_document(&doc).unwrap();

        prop_assert_eq!(read.labels.len(), shelf.labels.len());
        prop_assert_eq!(&read.labels, &shelf.labels);
        prop_assert!(read.queue.iter().eq(shelf.queue.iter()));
        prop_assert!(read.history.iter().eq(shelf.history.iter()));
        prop_assert_eq!(&read.grid, &shelf.grid);
        prop_assert_eq!(read, shelf);
    }

    #[test]
    fn vec_deque_of_arrays_round_trips(layers in prop::collection::vec(prop::collection::vec(any::<i16>(), 0..5), 0..5)) {
        let model = Mapper::new().build::<Shelf>().unwrap();
        let original = Shelf {
            layers: layers.iter().cloned().map(Vec::into_boxed_slice).collect(),
            ..shelf()
        };
        let read = model.from_document(&model.to_document(&original)).unwrap();
        let read: Vec<Vec<i16>> = read.layers.into_iter().map(Vec::from).collect();
        prop_assert_eq!(read, layers);
    }
}
