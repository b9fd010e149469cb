use tabled::{Table, Tabled};

use crate::cli::commands::PageParams;
use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{apply_table_style, check_format, format_comment, parse_excludes};
use crate::db::{Database, Id, NewReview, Review, ReviewQuery, ReviewRepository};
use crate::serialize::{ExclusionRules, Serializer};

#[derive(Tabled)]
struct ReviewDisplay {
    #[tabled(rename = "ID")]
    id: Id,
    #[tabled(rename = "Customer")]
    customer_id: Id,
    #[tabled(rename = "Item")]
    item_id: Id,
    #[tabled(rename = "Comment")]
    comment: String,
}

impl From<&Review> for ReviewDisplay {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            customer_id: review.customer_id,
            item_id: review.item_id,
            comment: format_comment(review.comment.as_deref()),
        }
    }
}

/// Create a review linking a customer and an item
pub async fn create_review<D: Database>(
    db: &D,
    customer_id: Id,
    item_id: Id,
    comment: Option<&str>,
) -> CliResult<String> {
    let review = db
        .reviews()
        .create(&NewReview {
            comment: comment.map(str::to_string),
            customer_id,
            item_id,
        })
        .await?;
    Ok(format!("Created review {}", review.id))
}

/// Show one review with its customer and item
pub async fn get_review<D: Database>(
    db: &D,
    id: Id,
    excludes: &[String],
    format: &str,
) -> CliResult<String> {
    check_format(format)?;
    let rules = parse_excludes(excludes)?;

    match format {
        "json" => {
            let value = Serializer::new(db).review_with(id, &rules).await?;
            Ok(serde_json::to_string_pretty(&value)?)
        }
        _ => {
            let review = db.reviews().get(id).await?;
            Ok(format_table(std::slice::from_ref(&review)))
        }
    }
}

/// List reviews, optionally for one customer or item
pub async fn list_reviews<D: Database>(
    db: &D,
    customer_id: Option<Id>,
    item_id: Option<Id>,
    page: PageParams<'_>,
    format: &str,
) -> CliResult<String> {
    check_format(format)?;
    let query = ReviewQuery {
        page: page.to_page_sort()?,
        customer_id,
        item_id,
    };

    match format {
        "json" => {
            let values = Serializer::new(db)
                .reviews(Some(&query), &ExclusionRules::new())
                .await?;
            Ok(serde_json::to_string_pretty(&values)?)
        }
        _ => {
            let result = db.reviews().list(Some(&query)).await?;
            Ok(format_table(&result.items))
        }
    }
}

/// Replace or clear a review's comment
pub async fn update_review<D: Database>(
    db: &D,
    id: Id,
    comment: Option<&str>,
    clear: bool,
) -> CliResult<String> {
    let new_comment = match (comment, clear) {
        (Some(_), true) => {
            return Err(CliError::InvalidArgument {
                message: "--comment and --clear-comment are mutually exclusive".to_string(),
            });
        }
        (Some(c), false) => Some(c.to_string()),
        (None, true) => None,
        (None, false) => {
            return Err(CliError::InvalidArgument {
                message: "nothing to update, pass --comment or --clear-comment".to_string(),
            });
        }
    };

    let mut review = db.reviews().get(id).await?;
    review.comment = new_comment;
    db.reviews().update(&review).await?;
    Ok(format!("Updated review {}", id))
}

/// Delete a review
pub async fn delete_review<D: Database>(db: &D, id: Id) -> CliResult<String> {
    db.reviews().delete(id).await?;
    Ok(format!("Deleted review {}", id))
}

fn format_table(reviews: &[Review]) -> String {
    if reviews.is_empty() {
        return "No reviews found.".to_string();
    }

    let rows: Vec<ReviewDisplay> = reviews.iter().map(|r| r.into()).collect();
    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    table.to_string()
}
