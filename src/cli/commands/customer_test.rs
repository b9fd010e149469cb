use crate::cli::commands::PageParams;
use crate::cli::commands::customer::*;
use crate::cli::error::CliError;
use crate::db::{
    CustomerRepository, Database, DbError, ItemRepository, NewCustomer, NewItem, SqliteDatabase,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

async fn seed_item(db: &SqliteDatabase, name: &str, price: f64) -> i64 {
    db.items()
        .create(&NewItem {
            name: name.to_string(),
            price,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_customer() {
    let db = setup_db().await;

    let output = create_customer(&db, "Ada").await.unwrap();
    assert!(output.contains("Created customer"));
    assert!(output.contains("Ada"));

    let list = db.customers().list(None).await.unwrap();
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].name, "Ada");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_customers_table_and_json() {
    let db = setup_db().await;
    create_customer(&db, "Ada").await.unwrap();
    create_customer(&db, "Grace").await.unwrap();

    let table = list_customers(&db, None, PageParams::default(), "table")
        .await
        .unwrap();
    assert!(table.contains("Ada"));
    assert!(table.contains("Grace"));

    let json = list_customers(&db, Some("gra"), PageParams::default(), "json")
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let customers = parsed.as_array().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["name"], "Grace");
    assert!(customers[0]["reviews"].is_array());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_customers_empty() {
    let db = setup_db().await;

    let output = list_customers(&db, None, PageParams::default(), "table")
        .await
        .unwrap();
    assert_eq!(output, "No customers found.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_customers_rejects_bad_order() {
    let db = setup_db().await;

    let page = PageParams {
        order: Some("sideways"),
        ..Default::default()
    };
    let result = list_customers(&db, None, page, "table").await;
    assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_customer_json_with_exclude() {
    let db = setup_db().await;
    let ada = db
        .customers()
        .create(&NewCustomer {
            name: "Ada".to_string(),
        })
        .await
        .unwrap();
    let widget = seed_item(&db, "Widget", 9.99).await;
    db.customers()
        .add_item_review(ada.id, widget, Some("Great"))
        .await
        .unwrap();

    let json = get_customer(&db, ada.id, &["reviews.item".to_string()], "json")
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["name"], "Ada");
    let review = parsed["reviews"][0].as_object().unwrap();
    assert_eq!(review["comment"], "Great");
    assert!(!review.contains_key("item"));
    assert!(!review.contains_key("customer"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_customer_table_lists_items() {
    let db = setup_db().await;
    create_customer(&db, "Ada").await.unwrap();
    let widget = seed_item(&db, "Widget", 9.99).await;
    add_item(&db, 1, widget, None).await.unwrap();

    let output = get_customer(&db, 1, &[], "table").await.unwrap();
    assert!(output.contains("Ada"));
    assert!(output.contains("Reviewed items: 1"));
    assert!(output.contains("Widget"));
    assert!(output.contains("9.99"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_customer_not_found() {
    let db = setup_db().await;

    let result = get_customer(&db, 42, &[], "table").await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::NotFound { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_customer_rejects_unknown_format() {
    let db = setup_db().await;
    create_customer(&db, "Ada").await.unwrap();

    let result = get_customer(&db, 1, &[], "yaml").await;
    assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_customer() {
    let db = setup_db().await;
    create_customer(&db, "Ada").await.unwrap();

    let output = update_customer(&db, 1, "Ada Lovelace").await.unwrap();
    assert!(output.contains("Updated customer 1"));

    let customer = db.customers().get(1).await.unwrap();
    assert_eq!(customer.name, "Ada Lovelace");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_item_and_list_customer_items() {
    let db = setup_db().await;
    create_customer(&db, "Ada").await.unwrap();
    let widget = seed_item(&db, "Widget", 9.99).await;
    let gadget = seed_item(&db, "Gadget", 20.0).await;

    add_item(&db, 1, widget, Some("Great")).await.unwrap();
    add_item(&db, 1, gadget, None).await.unwrap();

    let json = customer_items(&db, 1, "json").await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Widget", "Gadget"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_item_unknown_item_is_rejected() {
    let db = setup_db().await;
    create_customer(&db, "Ada").await.unwrap();

    let result = add_item(&db, 1, 99, None).await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::Constraint { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_customer_with_reviews_is_restricted() {
    let db = setup_db().await;
    create_customer(&db, "Ada").await.unwrap();
    let widget = seed_item(&db, "Widget", 9.99).await;
    add_item(&db, 1, widget, None).await.unwrap();

    let result = delete_customer(&db, 1).await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::ReferentialIntegrity { .. }))
    ));
    assert!(db.customers().get(1).await.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_customer() {
    let db = setup_db().await;
    create_customer(&db, "Ada").await.unwrap();

    let output = delete_customer(&db, 1).await.unwrap();
    assert!(output.contains("Deleted customer 1"));
    assert!(db.customers().get(1).await.is_err());
}
