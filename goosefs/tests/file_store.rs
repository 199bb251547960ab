use goosefs::{file::JsonFileStore, prelude::*};
use serde_json::{Value, json};
use std::{fs, path::Path};
use tempfile::tempdir;

fn person_schema() -> Schema {
    Schema::new()
        .field("fname", FieldSpec::new(FieldType::String).trim())
        .field("lname", FieldSpec::new(FieldType::String).trim())
        .field("email", FieldSpec::new(FieldType::String).trim().lowercase())
        .field("age", FieldSpec::new(FieldType::Number).default_value(0))
}

async fn open(dir: &Path) -> Store<JsonFileStore> {
    let backend = JsonFileStore::builder()
        .data_dir(dir)
        .build()
        .await
        .unwrap();

    let store = Store::new(backend);
    store.register_model("Person", person_schema()).await.unwrap();
    store.connect().await.unwrap();
    store
}

fn read_file(dir: &Path, collection: &str) -> Value {
    let path = dir.join(format!("{}.data.json", collection.to_lowercase()));
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn connect_creates_a_file_per_registered_model() {
    let dir = tempdir().unwrap();
    let _store = open(dir.path()).await;

    assert_eq!(read_file(dir.path(), "Person"), json!([]));
}

#[tokio::test]
async fn saved_documents_can_be_found_by_id() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut john = people
        .new_instance(json!({ "fname": "  John ", "lname": "Doe", "email": "John@Example.COM", "age": "42" }))
        .unwrap();
    let saved = john.save().await.unwrap();
    assert!(saved.was_insert());

    let id = john.id().unwrap().to_string();
    let found = people
        .find_one(Some(Query::by_id(id.as_str())))
        .await
        .unwrap()
        .exec();

    assert_eq!(found, saved.document);
    assert_eq!(found.get("fname"), Some(&json!("John")));
    assert_eq!(found.get("email"), Some(&json!("john@example.com")));
    assert_eq!(found.get("age"), Some(&json!(42)));
    assert_eq!(read_file(dir.path(), "Person"), json!([found.into_value()]));
}

#[tokio::test]
async fn saving_twice_overwrites_in_place() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut john = people.new_instance(json!({ "fname": "John" })).unwrap();
    assert_eq!(john.save().await.unwrap().updated, 0);

    john.set("lname", "Doe").unwrap();
    let second = john.save().await.unwrap();

    assert_eq!(second.updated, 1);
    assert_eq!(people.find(None).await.unwrap().len(), 1);
    assert_eq!(read_file(dir.path(), "Person")[0]["lname"], json!("Doe"));
}

#[tokio::test]
async fn updates_never_insert() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut stranger = people
        .new_instance(json!({ "_id": "missing", "fname": "Nobody" }))
        .unwrap();
    let result = stranger.update().await.unwrap();

    assert_eq!(result.affected, 0);
    assert!(people.find(None).await.unwrap().is_empty());
    assert_eq!(read_file(dir.path(), "Person"), json!([]));
}

#[tokio::test]
async fn updates_require_an_id() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut john = people.new_instance(json!({ "fname": "John" })).unwrap();
    let err = john.update().await.unwrap_err();

    assert!(matches!(err, DocumentStoreError::InvalidArgument(message) if message == "Item _id required"));
}

#[tokio::test]
async fn updates_replace_the_stored_document() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut john = people.new_instance(json!({ "fname": "John", "age": 30 })).unwrap();
    john.save().await.unwrap();

    john.set("age", 31).unwrap();
    let result = john.update().await.unwrap();

    assert_eq!(result.affected, 1);
    assert_eq!(read_file(dir.path(), "Person")[0]["age"], json!(31));
}

#[tokio::test]
async fn saved_ids_cannot_be_reassigned() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut john = people.new_instance(json!({ "fname": "John" })).unwrap();
    john.save().await.unwrap();
    let id = john.id().unwrap().to_string();

    let err = john.set("_id", "other").unwrap_err();
    assert!(matches!(err, DocumentStoreError::InvalidArgument(_)));

    john.set("lname", "Doe").unwrap();
    assert_eq!(john.save().await.unwrap().updated, 1);
    assert_eq!(john.id(), Some(id.as_str()));

    let stored = people.find(None).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id(), Some(id.as_str()));
}

#[tokio::test]
async fn numeric_ids_can_be_updated_and_removed() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut first = people.new_instance(json!({ "_id": 7, "fname": "John" })).unwrap();
    first.save().await.unwrap();
    assert_eq!(first.id(), Some("7"));

    let mut edit = people.new_instance(json!({ "_id": 7, "fname": "Johnny" })).unwrap();
    assert_eq!(edit.update().await.unwrap().affected, 1);
    assert_eq!(read_file(dir.path(), "Person")[0]["fname"], json!("Johnny"));

    assert_eq!(edit.remove(None).await.unwrap().deleted_count, 1);
    assert_eq!(read_file(dir.path(), "Person"), json!([]));
}

#[tokio::test]
async fn delete_many_removes_exactly_the_matches() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    for (fname, lname) in [("John", "Doe"), ("Jane", "Doe"), ("Mary", "Major")] {
        people
            .new_instance(json!({ "fname": fname, "lname": lname }))
            .unwrap()
            .save()
            .await
            .unwrap();
    }

    let result = people
        .delete_many(Query::new().eq("lname", "Doe"))
        .await
        .unwrap();
    assert_eq!(result, DeleteResult::new(2));

    let survivors = read_file(dir.path(), "Person");
    assert_eq!(survivors.as_array().map(Vec::len), Some(1));
    assert_eq!(survivors[0]["fname"], json!("Mary"));
}

#[tokio::test]
async fn delete_many_with_no_match_still_succeeds() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let result = people
        .delete_many(Query::new().eq("lname", "Nobody"))
        .await
        .unwrap();

    assert_eq!(result.deleted_count, 0);
    assert!(result.acknowledged);
}

#[tokio::test]
async fn empty_queries_are_rejected() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    assert!(matches!(
        people.delete_many(Query::new()).await,
        Err(DocumentStoreError::InvalidArgument(_))
    ));
    assert!(matches!(
        people.find_one(None).await,
        Err(DocumentStoreError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn defaults_fill_missing_fields() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let saved = people
        .new_instance(json!({ "fname": "John" }))
        .unwrap()
        .save()
        .await
        .unwrap();

    assert_eq!(saved.document.get("age"), Some(&json!(0)));
}

#[tokio::test]
async fn unparseable_numbers_fail_validation_and_write_nothing() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut bad = people
        .new_instance(json!({ "fname": "John", "age": "abc" }))
        .unwrap();
    let err = bad.save().await.unwrap_err();

    assert!(matches!(err, DocumentStoreError::Validation(_)));
    assert!(bad.id().is_none());
    assert_eq!(read_file(dir.path(), "Person"), json!([]));
}

#[tokio::test]
async fn find_one_reports_missing_documents() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let err = people
        .find_one(Some(Query::new().eq("fname", "Nobody")))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, DocumentStoreError::DocumentNotFound(_, collection) if collection == "Person"));
}

#[tokio::test]
async fn the_john_doe_lifecycle() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut john = people
        .new_instance(json!({ "fname": "John", "lname": "Doe", "email": "john@doe.com" }))
        .unwrap();
    john.save().await.unwrap();

    let matches = people
        .find(Some(Query::new().eq("fname", "John").eq("lname", "Doe")))
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);

    let result = john.remove(None).await.unwrap();
    assert_eq!(result.deleted_count, 1);
    assert_eq!(read_file(dir.path(), "Person"), json!([]));
}

#[tokio::test]
async fn remove_one_returns_the_removed_document() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut john = people.new_instance(json!({ "fname": "John" })).unwrap();
    john.save().await.unwrap();

    let found = people
        .find_one(Some(Query::new().eq("fname", "John")))
        .await
        .unwrap();
    let removed = found.remove_one().await.unwrap();
    assert_eq!(removed.id(), john.id());

    let err = found.remove_one().await.unwrap_err();
    assert!(matches!(err, DocumentStoreError::DocumentNotFound(..)));
}

#[tokio::test]
async fn remove_with_a_query_targets_other_documents() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    let mut john = people.new_instance(json!({ "fname": "John" })).unwrap();
    john.save().await.unwrap();
    people
        .new_instance(json!({ "fname": "Jane" }))
        .unwrap()
        .save()
        .await
        .unwrap();

    let result = john
        .remove(Some(Query::new().eq("fname", "Jane")))
        .await
        .unwrap();

    assert_eq!(result.deleted_count, 1);
    let left = people.find(None).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id(), john.id());
}

#[tokio::test]
async fn reset_empties_one_collection() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    for fname in ["John", "Jane"] {
        people
            .new_instance(json!({ "fname": fname }))
            .unwrap()
            .save()
            .await
            .unwrap();
    }

    assert_eq!(people.reset().await.unwrap().affected, 2);
    assert_eq!(read_file(dir.path(), "Person"), json!([]));
}

#[tokio::test]
async fn unregistered_collections_load_lazily_and_are_created_empty() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;

    store.register_model("Ghost", Schema::new()).await.unwrap();
    let ghosts = store.model("Ghost").await.unwrap();

    assert!(!store.is_loaded("Ghost").await);
    assert!(ghosts.find(None).await.unwrap().is_empty());
    assert!(store.is_loaded("Ghost").await);
    assert_eq!(read_file(dir.path(), "ghost"), json!([]));
}

#[tokio::test]
async fn disconnect_drops_memory_and_reloads_from_disk() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();

    people
        .new_instance(json!({ "fname": "John" }))
        .unwrap()
        .save()
        .await
        .unwrap();

    store.disconnect().await;
    assert!(!store.is_loaded("Person").await);

    let reloaded = people.find(None).await.unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].get("fname"), Some(&json!("John")));
}

#[tokio::test]
async fn data_survives_a_new_store_over_the_same_directory() {
    let dir = tempdir().unwrap();
    {
        let store = open(dir.path()).await;
        let people = store.model("Person").await.unwrap();
        people
            .new_instance(json!({ "_id": "p1", "fname": "John" }))
            .unwrap()
            .save()
            .await
            .unwrap();
    }

    let store = open(dir.path()).await;
    let people = store.model("Person").await.unwrap();
    let john = people.find_one(Some(Query::by_id("p1"))).await.unwrap();

    assert_eq!(john.get("fname"), Some(&json!("John")));
}

#[tokio::test]
async fn reset_all_empties_every_collection() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;
    store
        .register_model("Alarm", Schema::new().field("label", FieldType::String))
        .await
        .unwrap();

    let people = store.model("Person").await.unwrap();
    let alarms = store.model("Alarm").await.unwrap();
    people
        .new_instance(json!({ "fname": "John" }))
        .unwrap()
        .save()
        .await
        .unwrap();
    alarms
        .new_instance(json!({ "label": "wake up" }))
        .unwrap()
        .save()
        .await
        .unwrap();

    store.reset_all().await.unwrap();

    assert_eq!(read_file(dir.path(), "Person"), json!([]));
    assert_eq!(read_file(dir.path(), "Alarm"), json!([]));
    assert!(people.find(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_files_surface_on_load() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("person.data.json"), "{ not json").unwrap();

    let store = Store::new(JsonFileStore::builder().data_dir(dir.path()).build().await.unwrap());
    store.register_model("Person", person_schema()).await.unwrap();

    let err = store.connect().await.unwrap_err();
    assert!(matches!(err, DocumentStoreError::CorruptData { .. }));
}

#[tokio::test]
async fn stores_can_borrow_their_backend() {
    let dir = tempdir().unwrap();
    let backend = JsonFileStore::builder()
        .data_dir(dir.path())
        .build()
        .await
        .unwrap();

    let store = Store::new(&backend);
    store.register_model("Person", person_schema()).await.unwrap();
    store.connect_with(None, None).await.unwrap();

    store
        .model("Person")
        .await
        .unwrap()
        .new_instance(json!({ "fname": "John" }))
        .unwrap()
        .save()
        .await
        .unwrap();

    assert_eq!(backend.load("Person").unwrap().len(), 1);
}

#[tokio::test]
async fn model_names_sharing_a_file_or_leaving_the_directory_are_rejected() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;

    for name in ["person", "PERSON", "../person", "nested/person"] {
        let err = store.register_model(name, Schema::new()).await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::InvalidArgument(_)), "{name}");
    }

    assert_eq!(store.collection_names().await, vec!["Person".to_string()]);
    assert!(!dir.path().parent().unwrap().join("person.data.json").exists());
}

#[tokio::test]
async fn unknown_models_are_reported() {
    let dir = tempdir().unwrap();
    let store = open(dir.path()).await;

    let err = store.model("Ghost").await.unwrap_err();
    assert!(matches!(err, DocumentStoreError::ModelNotFound(name) if name == "Ghost"));
}
