use docaccess::{
    bson::{Document, doc},
    memory::InMemoryConnector,
    prelude::*,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Widget {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    size: i32,
}

impl Widget {
    fn new(name: &str, size: i32) -> Self {
        Self { id: None, name: name.to_string(), size }
    }
}

async fn open() -> Storage {
    Storage::open(InMemoryConnector::default(), &[&config::database("app")])
        .await
        .unwrap()
}

#[tokio::test]
async fn test_insert_then_get_one_round_trips() {
    let storage = open().await;
    let widget = Widget::new("foo", 3);

    let id = storage.insert("app", "widgets", &widget).await.unwrap();
    let stored: Widget = storage.get_one("app", "widgets", &id).await.unwrap();

    assert_eq!(stored, Widget { id: Some(id), ..widget });
}

#[tokio::test]
async fn test_insert_keeps_supplied_id() {
    let storage = open().await;

    let id = storage
        .insert("app", "widgets", &doc! { "id": "abc123", "name": "foo" })
        .await
        .unwrap();
    let stored: Document = storage.get_one("app", "widgets", "abc123").await.unwrap();

    assert_eq!(id, "abc123");
    assert_eq!(stored.get_str("name").unwrap(), "foo");
}

#[tokio::test]
async fn test_duplicate_id_is_database_error() {
    let storage = open().await;
    let row = doc! { "id": "abc123", "name": "foo" };

    storage.insert("app", "widgets", &row).await.unwrap();

    assert_eq!(storage.insert("app", "widgets", &row).await, Err(StorageError::Database));
}

#[tokio::test]
async fn test_get_all_returns_every_row() {
    let storage = open().await;

    for (name, size) in [("a", 1), ("b", 2), ("c", 3)] {
        storage.insert("app", "widgets", &Widget::new(name, size)).await.unwrap();
    }
    storage.insert("other", "widgets", &Widget::new("d", 4)).await.unwrap();

    let widgets: Vec<Widget> = storage.get_all("app", "widgets").await.unwrap();
    let names: Vec<&str> = widgets.iter().map(|w| w.name.as_str()).collect();

    assert_eq!(names, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_get_all_on_missing_table_is_empty() {
    let storage = open().await;

    let widgets: Vec<Widget> = storage.get_all("app", "nothing").await.unwrap();

    assert!(widgets.is_empty());
}

#[tokio::test]
async fn test_get_by_name_missing_is_decode_error() {
    let storage = open().await;

    let result = storage.get_by_name::<Widget>("app", "widgets", "missing").await;

    assert!(matches!(result, Err(StorageError::Decode(_))));
}

#[tokio::test]
async fn test_get_by_name_finds_row() {
    let storage = open().await;
    storage.insert("app", "widgets", &Widget::new("foo", 1)).await.unwrap();
    storage.insert("app", "widgets", &Widget::new("bar", 2)).await.unwrap();

    let widget: Widget = storage.get_by_name("app", "widgets", "bar").await.unwrap();

    assert_eq!(widget.size, 2);
}

#[tokio::test]
async fn test_update_changes_only_rows_with_that_name() {
    let storage = open().await;
    storage.insert("app", "widgets", &Widget::new("foo", 1)).await.unwrap();
    storage.insert("app", "widgets", &Widget::new("foo", 2)).await.unwrap();
    storage.insert("app", "widgets", &Widget::new("bar", 3)).await.unwrap();

    // Two matches take the mismatch-warning path but still succeed
    storage
        .update("app", "widgets", "foo", &doc! { "size": 9 })
        .await
        .unwrap();

    let widgets: Vec<Widget> = storage.get_all("app", "widgets").await.unwrap();
    let sizes: Vec<(&str, i32)> = widgets.iter().map(|w| (w.name.as_str(), w.size)).collect();

    assert_eq!(sizes, [("foo", 9), ("foo", 9), ("bar", 3)]);
}

#[tokio::test]
async fn test_update_without_match_is_ok() {
    let storage = open().await;

    assert_eq!(
        storage.update("app", "widgets", "missing", &doc! { "size": 1 }).await,
        Ok(())
    );
}

#[tokio::test]
async fn test_update_merges_nested_documents() {
    let storage = open().await;
    let id = storage
        .insert("app", "widgets", &doc! { "name": "foo", "info": { "created": 10_i64 } })
        .await
        .unwrap();

    storage
        .update("app", "widgets", "foo", &doc! { "info": { "updated": 20_i64 } })
        .await
        .unwrap();

    let stored: Document = storage.get_one("app", "widgets", &id).await.unwrap();
    assert_eq!(
        stored.get_document("info").unwrap(),
        &doc! { "created": 10_i64, "updated": 20_i64 }
    );
}

#[tokio::test]
async fn test_delete_removes_exactly_one() {
    let storage = open().await;
    let id = storage.insert("app", "widgets", &Widget::new("foo", 1)).await.unwrap();
    storage.insert("app", "widgets", &Widget::new("foo", 2)).await.unwrap();

    storage.delete("app", "widgets", &id).await.unwrap();

    let remaining: Vec<Widget> = storage.get_all("app", "widgets").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(matches!(
        storage.get_one::<Widget>("app", "widgets", &id).await,
        Err(StorageError::Decode(_))
    ));
}

#[tokio::test]
async fn test_delete_missing_is_entity_not_found() {
    let storage = open().await;

    assert_eq!(
        storage.delete("app", "widgets", "abc123").await,
        Err(StorageError::EntityNotFound)
    );
}

#[tokio::test]
async fn test_delete_by_name_missing_is_entity_not_found() {
    let storage = open().await;
    storage.insert("app", "widgets", &Widget::new("bar", 1)).await.unwrap();

    assert_eq!(
        storage.delete_by_name("app", "widgets", "foo").await,
        Err(StorageError::EntityNotFound)
    );
}

#[tokio::test]
async fn test_delete_by_name_removes_all_matches() {
    let storage = open().await;
    storage.insert("app", "widgets", &Widget::new("foo", 1)).await.unwrap();
    storage.insert("app", "widgets", &Widget::new("foo", 2)).await.unwrap();
    storage.insert("app", "widgets", &Widget::new("bar", 3)).await.unwrap();

    storage.delete_by_name("app", "widgets", "foo").await.unwrap();

    let remaining: Vec<Widget> = storage.get_all("app", "widgets").await.unwrap();
    let names: Vec<&str> = remaining.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["bar"]);
}

#[tokio::test]
async fn test_table_handle_forwards_to_storage() {
    let storage = open().await;
    let widgets = storage.table("app", "widgets");

    let id = widgets.insert(&Widget::new("foo", 1)).await.unwrap();
    widgets.update("foo", &doc! { "size": 2 }).await.unwrap();

    let widget: Widget = widgets.get(&id).await.unwrap();
    assert_eq!(widget.size, 2);
    assert_eq!(widgets.is_unique("name", "foo").await, Ok(false));

    widgets.delete_by_name("foo").await.unwrap();
    assert_eq!(widgets.is_unique("name", "foo").await, Ok(true));
}
