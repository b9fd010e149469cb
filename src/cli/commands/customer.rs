use tabled::{Table, Tabled};

use crate::cli::commands::PageParams;
use crate::cli::commands::item::format_table as format_items_table;
use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, check_format, parse_excludes, truncate_with_ellipsis};
use crate::db::{Customer, CustomerQuery, CustomerRepository, Database, Id, NewCustomer};
use crate::serialize::{ExclusionRules, Serializer};

#[derive(Tabled)]
struct CustomerDisplay {
    #[tabled(rename = "ID")]
    id: Id,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Customer> for CustomerDisplay {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: truncate_with_ellipsis(&customer.name, 40),
        }
    }
}

/// Create a customer
pub async fn create_customer<D: Database>(db: &D, name: &str) -> CliResult<String> {
    let customer = db
        .customers()
        .create(&NewCustomer {
            name: name.to_string(),
        })
        .await?;
    Ok(format!("Created customer {} ({})", customer.id, customer.name))
}

/// Show one customer with its reviews
pub async fn get_customer<D: Database>(
    db: &D,
    id: Id,
    excludes: &[String],
    format: &str,
) -> CliResult<String> {
    check_format(format)?;
    let rules = parse_excludes(excludes)?;

    match format {
        "json" => {
            let value = Serializer::new(db).customer_with(id, &rules).await?;
            Ok(serde_json::to_string_pretty(&value)?)
        }
        _ => {
            let customer = db.customers().get(id).await?;
            let items = db.customers().items(id).await?;
            let mut output = format_table(std::slice::from_ref(&customer));
            output.push_str(&format!("\n\nReviewed items: {}", items.len()));
            if !items.is_empty() {
                output.push('\n');
                output.push_str(&format_items_table(&items));
            }
            Ok(output)
        }
    }
}

/// List customers with optional filtering
pub async fn list_customers<D: Database>(
    db: &D,
    name: Option<&str>,
    page: PageParams<'_>,
    format: &str,
) -> CliResult<String> {
    check_format(format)?;
    let query = CustomerQuery {
        page: page.to_page_sort()?,
        name: name.map(str::to_string),
    };

    match format {
        "json" => {
            let values = Serializer::new(db)
                .customers(Some(&query), &ExclusionRules::new())
                .await?;
            Ok(serde_json::to_string_pretty(&values)?)
        }
        _ => {
            let result = db.customers().list(Some(&query)).await?;
            Ok(format_table(&result.items))
        }
    }
}

/// Rename a customer
pub async fn update_customer<D: Database>(db: &D, id: Id, name: &str) -> CliResult<String> {
    let mut customer = db.customers().get(id).await?;
    customer.name = name.to_string();
    db.customers().update(&customer).await?;
    Ok(format!("Updated customer {}", id))
}

/// Delete a customer
pub async fn delete_customer<D: Database>(db: &D, id: Id) -> CliResult<String> {
    db.customers().delete(id).await?;
    Ok(format!("Deleted customer {}", id))
}

/// Items the customer has reviewed, in review order
pub async fn customer_items<D: Database>(db: &D, id: Id, format: &str) -> CliResult<String> {
    check_format(format)?;
    let items = db.customers().items(id).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&items)?),
        _ => Ok(format_items_table(&items)),
    }
}

/// Append an item to the customer's items by creating the linking review
pub async fn add_item<D: Database>(
    db: &D,
    customer_id: Id,
    item_id: Id,
    comment: Option<&str>,
) -> CliResult<String> {
    let review = db
        .customers()
        .add_item_review(customer_id, item_id, comment)
        .await?;
    Ok(format!(
        "Created review {} linking customer {} to item {}",
        review.id, customer_id, item_id
    ))
}

fn format_table(customers: &[Customer]) -> String {
    if customers.is_empty() {
        return "No customers found.".to_string();
    }

    let rows: Vec<CustomerDisplay> = customers.iter().map(|c| c.into()).collect();
    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    table.to_string()
}
