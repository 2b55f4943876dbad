//! Integration tests for positional projections.

use serde_json::json;
use sourced_mapping::{
    BindError, CollectionsExt, Document, DocumentStore, Entity, Filter, InMemoryDocumentStore,
    Mapper, MappingError, Projector,
};

#[derive(Debug, Clone, PartialEq, Entity)]
#[entity(collection = "people")]
struct Person {
    #[entity(id, rename = "_id")]
    id: i32,
    #[entity(rename = "nm")]
    names: Vec<String>,
    age: Option<u8>,
    city: String,
}

fn seed(store: &InMemoryDocumentStore, mapper: &mut Mapper) {
    let model = mapper.build::<Person>().unwrap();
    let people = store.collection(&model);
    for (id, name, age, city) in [(1, "ada", Some(36), "london"), (2, "alan", None, "london"), (3, "grace", Some(85), "nyc")] {
        people
            .insert(&Person {
                id,
                names: vec![name.to_string()],
                age,
                city: city.to_string(),
            })
            .unwrap();
    }
}

#[test]
fn projects_selected_properties_in_order() {
    let mut mapper = Mapper::new();
    let store = InMemoryDocumentStore::new();
    seed(&store, &mut mapper);

    let model = mapper.build::<Person>().unwrap();
    let projector: Projector<(Vec<String>, i32)> = mapper.projector(&model, &["names", "id"]).unwrap();
    assert_eq!(projector.fields(), &["nm".to_string(), "_id".to_string()]);

    let people = store.collection(&model);
    let rows = people
        .project(&projector, &model.filter_eq("city", &"london".to_string()).unwrap())
        .unwrap();
    assert_eq!(
        rows,
        vec![(vec!["ada".to_string()], 1), (vec!["alan".to_string()], 2)]
    );
}

#[test]
fn nullable_slots_project_as_none() {
    let mut mapper = Mapper::new();
    let store = InMemoryDocumentStore::new();
    seed(&store, &mut mapper);

    let model = mapper.build::<Person>().unwrap();
    let projector: Projector<(i32, Option<u8>)> = mapper.projector(&model, &["id", "age"]).unwrap();
    let rows = store.collection(&model).project(&projector, &Filter::All).unwrap();
    assert_eq!(rows, vec![(1, Some(36)), (2, None), (3, Some(85))]);
}

#[test]
fn width_must_match_property_count() {
    let mut mapper = Mapper::new();
    let model = mapper.build::<Person>().unwrap();

    let err = mapper
        .projector::<Person, (i32, String)>(&model, &["id"])
        .err()
        .unwrap();
    assert_eq!(err, BindError::ProjectionArity { expected: 2, found: 1 });

    let err = mapper
        .projector::<Person, (i32,)>(&model, &["nope"])
        .err()
        .unwrap();
    assert!(matches!(err, BindError::UnknownProperty { .. }));
}

#[test]
fn projection_errors_name_the_position() {
    let mut mapper = Mapper::new();
    let model = mapper.build::<Person>().unwrap();
    let store = InMemoryDocumentStore::new();
    store
        .insert(
            "people",
            &Filter::eq("_id", 9),
            Document::new().with("_id", 9).with("nm", json!("not a list")),
        )
        .unwrap();

    let projector: Projector<(i32, Vec<String>)> = mapper.projector(&model, &["id", "names"]).unwrap();
    match store.collection(&model).project(&projector, &Filter::All).unwrap_err() {
        MappingError::Conversion(err) => assert_eq!(err.path, "#1"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn six_wide_projection() {
    let mut mapper = Mapper::new();
    let model = mapper.build::<Person>().unwrap();
    let projector: Projector<(i32, Vec<String>, Option<u8>, String, i64, Vec<String>)> = mapper
        .projector(&model, &["id", "names", "age", "city", "id", "names"])
        .unwrap();

    let doc = model.to_document(&Person {
        id: 4,
        names: vec!["x".into()],
        age: Some(1),
        city: "paris".into(),
    });
    let row = projector.read(&doc).unwrap();
    assert_eq!(row.0, 4);
    assert_eq!(row.3, "paris");
    assert_eq!(row.4, 4i64);
    assert_eq!(row.5, vec!["x"]);
}
