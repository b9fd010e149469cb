use crate::cli::commands::PageParams;
use crate::cli::commands::review::*;
use crate::cli::error::CliError;
use crate::db::{
    CustomerRepository, Database, DbError, ItemRepository, NewCustomer, NewItem,
    ReviewRepository, SqliteDatabase,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

/// Seeds customers 1 (Ada) and 2 (Grace) plus item 1 (Widget).
async fn seed(db: &SqliteDatabase) {
    for name in ["Ada", "Grace"] {
        db.customers()
            .create(&NewCustomer {
                name: name.to_string(),
            })
            .await
            .unwrap();
    }
    db.items()
        .create(&NewItem {
            name: "Widget".to_string(),
            price: 9.99,
        })
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_review() {
    let db = setup_db().await;
    seed(&db).await;

    let output = create_review(&db, 1, 1, Some("Great")).await.unwrap();
    assert!(output.contains("Created review 1"));

    let review = db.reviews().get(1).await.unwrap();
    assert_eq!(review.comment.as_deref(), Some("Great"));
    assert_eq!(review.customer_id, 1);
    assert_eq!(review.item_id, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_review_unknown_customer() {
    let db = setup_db().await;
    seed(&db).await;

    let result = create_review(&db, 99, 1, None).await;
    assert!(matches!(
        result,
        Err(CliError::Database(DbError::Constraint { .. }))
    ));
    assert!(db.reviews().list(None).await.unwrap().items.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_review_json_expands_both_sides() {
    let db = setup_db().await;
    seed(&db).await;
    create_review(&db, 1, 1, Some("Great")).await.unwrap();

    let json = get_review(&db, 1, &[], "json").await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let customer = parsed["customer"].as_object().unwrap();
    let item = parsed["item"].as_object().unwrap();
    assert_eq!(customer["name"], "Ada");
    assert_eq!(item["name"], "Widget");
    assert!(!customer.contains_key("reviews"));
    assert!(!item.contains_key("reviews"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_review_json_exclude_customer() {
    let db = setup_db().await;
    seed(&db).await;
    create_review(&db, 1, 1, None).await.unwrap();

    let json = get_review(&db, 1, &["-customer".to_string()], "json")
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let review = parsed.as_object().unwrap();
    assert!(!review.contains_key("customer"));
    assert!(review.contains_key("item"));
    assert_eq!(review["comment"], serde_json::Value::Null);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_reviews_by_customer() {
    let db = setup_db().await;
    seed(&db).await;
    create_review(&db, 1, 1, Some("Great")).await.unwrap();
    create_review(&db, 2, 1, Some("Fine")).await.unwrap();

    let table = list_reviews(&db, Some(2), None, PageParams::default(), "table")
        .await
        .unwrap();
    assert!(table.contains("Fine"));
    assert!(!table.contains("Great"));

    let json = list_reviews(&db, None, Some(1), PageParams::default(), "json")
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_review_comment_and_clear() {
    let db = setup_db().await;
    seed(&db).await;
    create_review(&db, 1, 1, Some("Great")).await.unwrap();

    update_review(&db, 1, Some("Changed my mind"), false)
        .await
        .unwrap();
    let review = db.reviews().get(1).await.unwrap();
    assert_eq!(review.comment.as_deref(), Some("Changed my mind"));

    update_review(&db, 1, None, true).await.unwrap();
    let review = db.reviews().get(1).await.unwrap();
    assert_eq!(review.comment, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_review_conflicting_flags() {
    let db = setup_db().await;
    seed(&db).await;
    create_review(&db, 1, 1, None).await.unwrap();

    let result = update_review(&db, 1, Some("x"), true).await;
    assert!(matches!(result, Err(CliError::InvalidArgument { .. })));

    let result = update_review(&db, 1, None, false).await;
    assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_review_shrinks_customer_items() {
    let db = setup_db().await;
    seed(&db).await;
    create_review(&db, 1, 1, None).await.unwrap();
    assert_eq!(db.customers().items(1).await.unwrap().len(), 1);

    let output = delete_review(&db, 1).await.unwrap();
    assert!(output.contains("Deleted review 1"));
    assert!(db.customers().items(1).await.unwrap().is_empty());
}
