//! Integration tests for pushboard-store

use std::sync::Arc;

use pushboard_store::*;
use serde_json::json;
use tempfile::tempdir;

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let input = TemplateInput::named("Welcome")
        .payload(json!({"title": "Hi", "body": {"lines": [1, 2, 3]}}))
        .thumbnail("data:image/png;base64,iVBORw0KGgo=");

    let created = storage.create_template(input).await.unwrap();
    assert_eq!(created.id, "Welcome");
    assert_eq!(created.name, "Welcome");
    assert_eq!(created.message, "Template saved");

    let template = storage.get_template(&created.id).await.unwrap();
    assert_eq!(template.id, "Welcome");
    assert_eq!(template.name, "Welcome");
    assert_eq!(template.payload, json!({"title": "Hi", "body": {"lines": [1, 2, 3]}}));
    assert_eq!(template.thumbnail.as_deref(), Some("data:image/png;base64,iVBORw0KGgo="));
    assert_eq!(template.created, created.created);
    assert_eq!(template.created, template.updated);
}

#[tokio::test]
async fn test_create_without_name_uses_id() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let created = storage
        .create_template(TemplateInput::default().payload(json!({"title": "Anon"})))
        .await
        .unwrap();

    assert_eq!(created.id.len(), 8);
    assert_eq!(created.name, created.id);

    let explicit = storage
        .create_template(TemplateInput::default().with_id("custom"))
        .await
        .unwrap();
    assert_eq!(explicit.id, "custom");
    assert_eq!(explicit.name, "custom");
}

#[tokio::test]
async fn test_unusable_name_falls_back_to_id() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let created = storage
        .create_template(TemplateInput::named("!!!").with_id("../../escape"))
        .await
        .unwrap();

    assert_eq!(created.id, "escape");
    assert_eq!(created.name, "!!!");
    assert!(temp_dir.path().join("escape.json").exists());
}

#[tokio::test]
async fn test_empty_input_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let result = storage.create_template(TemplateInput::default()).await;
    assert!(matches!(result, Err(StoreError::InvalidInput(_))));

    storage
        .create_template(TemplateInput::named("Existing"))
        .await
        .unwrap();
    let result = storage
        .update_template("Existing", TemplateInput::default())
        .await;
    assert!(matches!(result, Err(StoreError::InvalidInput(_))));
}

#[tokio::test]
async fn test_name_collisions_get_counter_suffix() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let first = storage.create_template(TemplateInput::named("Foo")).await.unwrap();
    let second = storage.create_template(TemplateInput::named("Foo")).await.unwrap();
    let third = storage.create_template(TemplateInput::named("Foo")).await.unwrap();

    assert_eq!(first.id, "Foo");
    assert_eq!(second.id, "Foo-1");
    assert_eq!(third.id, "Foo-2");

    // A freed id is reused by the next create
    storage.delete_template("Foo").await.unwrap();
    let fourth = storage.create_template(TemplateInput::named("Foo")).await.unwrap();
    assert_eq!(fourth.id, "Foo");
}

#[tokio::test]
async fn test_concurrent_creates_never_share_an_id() {
    let temp_dir = tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(temp_dir.path()).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..16 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            storage
                .create_template(TemplateInput::named("Burst").payload(json!({"n": i})))
                .await
                .unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().id);
    }
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 16);
    assert_eq!(storage.list_templates().await.unwrap().len(), 16);
}

#[tokio::test]
async fn test_traversal_ids_stay_inside_store() {
    let outer = tempdir().unwrap();
    let root = outer.path().join("templates");
    let storage = FileStorage::new(&root).await.unwrap();

    // A record sitting next to the store must stay unreachable
    std::fs::write(
        outer.path().join("secret.json"),
        r#"{"name": "secret", "data": {}}"#,
    )
    .unwrap();

    let result = storage.get_template("../secret").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    let result = storage.delete_template("../secret").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert!(outer.path().join("secret.json").exists());

    let result = storage
        .update_template("../../etc/passwd", TemplateInput::named("pwned"))
        .await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    // Same basename inside the store resolves there
    storage
        .create_template(TemplateInput::named("passwd"))
        .await
        .unwrap();
    let template = storage.get_template("../../etc/passwd").await.unwrap();
    assert_eq!(template.id, "passwd");
    assert!(root.join("passwd.json").exists());
}

#[tokio::test]
async fn test_extension_is_normalized() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    storage.create_template(TemplateInput::named("promo")).await.unwrap();

    let plain = storage.get_template("promo").await.unwrap();
    let suffixed = storage.get_template("promo.json").await.unwrap();

    assert_eq!(plain, suffixed);
    assert_eq!(suffixed.id, "promo");
}

#[tokio::test]
async fn test_update_preserves_immutable_fields() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let created = storage
        .create_template(
            TemplateInput::named("Sale")
                .payload(json!({"title": "-50%"}))
                .thumbnail("thumb-v1"),
        )
        .await
        .unwrap();
    let before = storage.get_template(&created.id).await.unwrap();

    let updated = storage
        .update_template(&created.id, TemplateInput::named("Big Sale"))
        .await
        .unwrap();

    assert_eq!(updated.id, "Sale");
    assert_eq!(updated.name, "Big Sale");
    assert_eq!(updated.message, "Template updated");

    let after = storage.get_template(&created.id).await.unwrap();
    assert_eq!(after.name, "Big Sale");
    assert_eq!(after.created, before.created);
    assert_eq!(after.payload, json!({"title": "-50%"}));
    assert_eq!(after.thumbnail.as_deref(), Some("thumb-v1"));
    assert!(after.updated >= before.updated);
    assert_eq!(after.updated, updated.updated);
    assert!(after.created <= after.updated);
}

#[tokio::test]
async fn test_update_replaces_supplied_fields_and_keeps_extra_keys() {
    let temp_dir = tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("legacy.json"),
        r#"{"name": "Legacy", "data": {"a": 1}, "thumb": "", "created": "2024-01-01T00:00:00", "updated": "2024-01-01T00:00:00", "channel": "ios"}"#,
    )
    .unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    storage
        .update_template(
            "legacy",
            TemplateInput::default()
                .payload(json!({"b": 2}))
                .thumbnail("new-thumb"),
        )
        .await
        .unwrap();

    let template = storage.get_template("legacy").await.unwrap();
    assert_eq!(template.name, "Legacy");
    assert_eq!(template.payload, json!({"b": 2}));
    assert_eq!(template.thumbnail.as_deref(), Some("new-thumb"));
    assert_eq!(template.created, "2024-01-01T00:00:00");
    assert!(template.updated.as_str() > "2024-01-01T00:00:00");
    assert_eq!(template.extra.get("channel"), Some(&json!("ios")));
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let created = storage.create_template(TemplateInput::named("Gone")).await.unwrap();
    storage.delete_template(&created.id).await.unwrap();

    let result = storage.get_template(&created.id).await;
    match result {
        Err(StoreError::NotFound(id)) => assert_eq!(id, "Gone"),
        other => panic!("Expected NotFound error, got {:?}", other),
    }

    let result = storage.delete_template(&created.id).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_get_corrupt_record() {
    let temp_dir = tempdir().unwrap();
    std::fs::write(temp_dir.path().join("broken.json"), "not json at all").unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let result = storage.get_template("broken").await;
    match result {
        Err(StoreError::CorruptData { id, .. }) => assert_eq!(id, "broken"),
        other => panic!("Expected CorruptData error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_skips_malformed_files() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    storage.create_template(TemplateInput::named("One")).await.unwrap();
    storage.create_template(TemplateInput::named("Two")).await.unwrap();
    std::fs::write(temp_dir.path().join("broken.json"), "{").unwrap();
    std::fs::write(temp_dir.path().join("array.json"), "[1, 2]").unwrap();
    std::fs::write(temp_dir.path().join("notes.txt"), "not a template").unwrap();

    let summaries = storage.list_templates().await.unwrap();
    let mut ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
    ids.sort();

    assert_eq!(ids, vec!["One", "Two"]);
}

#[tokio::test]
async fn test_dot_prefixed_ids_are_listed() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let hidden = storage
        .create_template(TemplateInput::named("!!!").with_id(".secret"))
        .await
        .unwrap();
    let dots = storage
        .create_template(TemplateInput::default().with_id("..."))
        .await
        .unwrap();
    assert_eq!(hidden.id, ".secret");
    assert_eq!(dots.id, "...");

    let summaries = storage.list_templates().await.unwrap();
    let mut ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["...", ".secret"]);

    assert_eq!(storage.get_template(".secret").await.unwrap().name, "!!!");
    assert_eq!(storage.get_template("...").await.unwrap().name, "...");
}

#[tokio::test]
async fn test_list_orders_by_updated_descending() {
    let temp_dir = tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("older.json"),
        r#"{"name": "Older", "data": {}, "created": "2023-12-01T00:00:00", "updated": "2024-01-01T00:00:00"}"#,
    )
    .unwrap();
    std::fs::write(
        temp_dir.path().join("newer.json"),
        r#"{"name": "Newer", "data": {}, "thumb": "t.png", "created": "2023-12-01T00:00:00", "updated": "2024-06-01T00:00:00"}"#,
    )
    .unwrap();
    std::fs::write(
        temp_dir.path().join("created-only.json"),
        r#"{"data": {}, "created": "2024-03-01T00:00:00"}"#,
    )
    .unwrap();
    let storage = FileStorage::new(temp_dir.path()).await.unwrap();

    let summaries = storage.list_templates().await.unwrap();
    let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();

    assert_eq!(ids, vec!["newer", "created-only", "older"]);
    assert_eq!(summaries[0].name, "Newer");
    assert_eq!(summaries[0].thumbnail, "t.png");
    assert_eq!(summaries[1].name, "created-only");
    assert_eq!(summaries[2].thumbnail, "");
}

#[tokio::test]
async fn test_isolated_store_instances() {
    let first_dir = tempdir().unwrap();
    let second_dir = tempdir().unwrap();
    let first = FileStorage::new(first_dir.path()).await.unwrap();
    let second = FileStorage::new(second_dir.path()).await.unwrap();

    first.create_template(TemplateInput::named("Only here")).await.unwrap();

    assert_eq!(first.list_templates().await.unwrap().len(), 1);
    assert!(second.list_templates().await.unwrap().is_empty());
    assert!(matches!(
        second.get_template("Only here").await,
        Err(StoreError::NotFound(_))
    ));
}
