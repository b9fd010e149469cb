//! Tests for domain models.

use crate::db::models::*;

#[test]
fn delete_policy_deserializes_from_config_format() {
    let restrict: DeletePolicy = serde_json::from_str("\"restrict\"").unwrap();
    assert_eq!(restrict, DeletePolicy::Restrict);

    let cascade: DeletePolicy = serde_json::from_str("\"cascade\"").unwrap();
    assert_eq!(cascade, DeletePolicy::Cascade);
}

#[test]
fn delete_policy_defaults_to_restrict() {
    assert_eq!(DeletePolicy::default(), DeletePolicy::Restrict);
}

#[test]
fn delete_policy_display_matches_from_str() {
    for policy in [DeletePolicy::Restrict, DeletePolicy::Cascade] {
        let parsed: DeletePolicy = policy.to_string().parse().unwrap();
        assert_eq!(parsed, policy);
    }
    assert!("set-null".parse::<DeletePolicy>().is_err());
}

#[test]
fn delete_policy_parse_ignores_case_and_whitespace() {
    assert_eq!("Cascade".parse::<DeletePolicy>().unwrap(), DeletePolicy::Cascade);
    assert_eq!(" RESTRICT ".parse::<DeletePolicy>().unwrap(), DeletePolicy::Restrict);
}

#[test]
fn sort_order_parses_lowercase() {
    assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
    assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
    assert!("sideways".parse::<SortOrder>().is_err());
}

#[test]
fn new_review_comment_is_optional_in_json() {
    let review: NewReview = serde_json::from_str(r#"{"customer_id": 1, "item_id": 2}"#).unwrap();
    assert_eq!(review.comment, None);
    assert_eq!(review.customer_id, 1);
    assert_eq!(review.item_id, 2);
}

#[test]
fn review_serializes_foreign_keys() {
    let review = Review {
        id: 1,
        comment: Some("Great".to_string()),
        customer_id: 3,
        item_id: 4,
    };
    let value = serde_json::to_value(&review).unwrap();
    assert_eq!(value["customer_id"], 3);
    assert_eq!(value["item_id"], 4);
    assert_eq!(value["comment"], "Great");
}
