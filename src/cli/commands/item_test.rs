use crate::cli::commands::PageParams;
use crate::cli::commands::item::*;
use crate::cli::error::CliError;
use crate::db::{
    CustomerRepository, Database, DbError, DeletePolicy, ItemRepository, NewCustomer,
    ReviewRepository, SqliteDatabase,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_item() {
    let db = setup_db().await;

    let output = create_item(&db, "Widget", 9.99).await.unwrap();
    assert!(output.contains("Created item 1"));
    assert!(output.contains("9.99"));

    let item = db.items().get(1).await.unwrap();
    assert_eq!(item.name, "Widget");
    assert_eq!(item.price, 9.99);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_item_rejects_nan_price() {
    let db = setup_db().await;

    let result = create_item(&db, "Widget", f64::NAN).await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::Validation { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_items_price_range() {
    let db = setup_db().await;
    create_item(&db, "Widget", 9.99).await.unwrap();
    create_item(&db, "Gadget", 20.0).await.unwrap();
    create_item(&db, "Gizmo", 35.5).await.unwrap();

    let price = PriceRange {
        min: Some(10.0),
        max: Some(30.0),
    };
    let json = list_items(&db, None, price, PageParams::default(), "json")
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Gadget");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_items_sorted_by_price_desc() {
    let db = setup_db().await;
    create_item(&db, "Widget", 9.99).await.unwrap();
    create_item(&db, "Gizmo", 35.5).await.unwrap();
    create_item(&db, "Gadget", 20.0).await.unwrap();

    let page = PageParams {
        sort: Some("price"),
        order: Some("desc"),
        ..Default::default()
    };
    let json = list_items(&db, None, PriceRange::default(), page, "json")
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Gizmo", "Gadget", "Widget"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_items_empty_table() {
    let db = setup_db().await;

    let output = list_items(
        &db,
        None,
        PriceRange::default(),
        PageParams::default(),
        "table",
    )
    .await
    .unwrap();
    assert_eq!(output, "No items found.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_item_json_expands_review_customers() {
    let db = setup_db().await;
    create_item(&db, "Widget", 9.99).await.unwrap();
    let ada = db
        .customers()
        .create(&NewCustomer {
            name: "Ada".to_string(),
        })
        .await
        .unwrap();
    db.customers()
        .add_item_review(ada.id, 1, Some("Great"))
        .await
        .unwrap();

    let json = get_item(&db, 1, &[], "json").await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let review = parsed["reviews"][0].as_object().unwrap();
    assert!(!review.contains_key("item"));
    assert_eq!(review["customer"]["name"], "Ada");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_item_price_only() {
    let db = setup_db().await;
    create_item(&db, "Widget", 9.99).await.unwrap();

    update_item(&db, 1, None, Some(12.5)).await.unwrap();

    let item = db.items().get(1).await.unwrap();
    assert_eq!(item.name, "Widget");
    assert_eq!(item.price, 12.5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_item_requires_a_field() {
    let db = setup_db().await;
    create_item(&db, "Widget", 9.99).await.unwrap();

    let result = update_item(&db, 1, None, None).await;
    assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_item_missing() {
    let db = setup_db().await;

    let result = delete_item(&db, 7).await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::NotFound { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_item_cascades_when_configured() {
    let db = setup_db()
        .await
        .with_delete_policy(DeletePolicy::Cascade);
    create_item(&db, "Widget", 9.99).await.unwrap();
    let ada = db
        .customers()
        .create(&NewCustomer {
            name: "Ada".to_string(),
        })
        .await
        .unwrap();
    db.customers()
        .add_item_review(ada.id, 1, None)
        .await
        .unwrap();

    delete_item(&db, 1).await.unwrap();

    assert!(db.reviews().list(None).await.unwrap().items.is_empty());
    assert!(db.customers().items(ada.id).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_item_rejects_infinite_price() {
    let db = setup_db().await;
    create_item(&db, "Widget", 9.99).await.unwrap();

    let result = update_item(&db, 1, None, Some(f64::INFINITY)).await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::Validation { .. }))
    ));
}
