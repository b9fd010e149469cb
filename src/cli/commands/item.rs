use tabled::{Table, Tabled};

use crate::cli::commands::PageParams;
use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{
    apply_table_style, check_format, format_price, parse_excludes, truncate_with_ellipsis,
};
use crate::db::{Database, Id, Item, ItemQuery, ItemRepository, NewItem};
use crate::serialize::{ExclusionRules, Serializer};

#[derive(Tabled)]
struct ItemDisplay {
    #[tabled(rename = "ID")]
    id: Id,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
}

impl From<&Item> for ItemDisplay {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: truncate_with_ellipsis(&item.name, 40),
            price: format_price(item.price),
        }
    }
}

/// Price filters for `item list`
#[derive(Debug, Default)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Create an item
pub async fn create_item<D: Database>(db: &D, name: &str, price: f64) -> CliResult<String> {
    let item = db
        .items()
        .create(&NewItem {
            name: name.to_string(),
            price,
        })
        .await?;
    Ok(format!(
        "Created item {} ({}, {})",
        item.id,
        item.name,
        format_price(item.price)
    ))
}

/// Show one item with its reviews
pub async fn get_item<D: Database>(
    db: &D,
    id: Id,
    excludes: &[String],
    format: &str,
) -> CliResult<String> {
    check_format(format)?;
    let rules = parse_excludes(excludes)?;

    match format {
        "json" => {
            let value = Serializer::new(db).item_with(id, &rules).await?;
            Ok(serde_json::to_string_pretty(&value)?)
        }
        _ => {
            let item = db.items().get(id).await?;
            let reviews = db.items().reviews(id).await?;
            let mut output = format_table(std::slice::from_ref(&item));
            output.push_str(&format!("\n\nReviews: {}", reviews.len()));
            Ok(output)
        }
    }
}

/// List items with optional filtering
pub async fn list_items<D: Database>(
    db: &D,
    name: Option<&str>,
    price: PriceRange,
    page: PageParams<'_>,
    format: &str,
) -> CliResult<String> {
    check_format(format)?;
    let query = ItemQuery {
        page: page.to_page_sort()?,
        name: name.map(str::to_string),
        min_price: price.min,
        max_price: price.max,
    };

    match format {
        "json" => {
            let values = Serializer::new(db)
                .items(Some(&query), &ExclusionRules::new())
                .await?;
            Ok(serde_json::to_string_pretty(&values)?)
        }
        _ => {
            let result = db.items().list(Some(&query)).await?;
            Ok(format_table(&result.items))
        }
    }
}

/// Change an item's name and/or price
pub async fn update_item<D: Database>(
    db: &D,
    id: Id,
    name: Option<&str>,
    price: Option<f64>,
) -> CliResult<String> {
    if name.is_none() && price.is_none() {
        return Err(CliError::InvalidArgument {
            message: "nothing to update, pass --name and/or --price".to_string(),
        });
    }

    let mut item = db.items().get(id).await?;
    if let Some(name) = name {
        item.name = name.to_string();
    }
    if let Some(price) = price {
        item.price = price;
    }
    db.items().update(&item).await?;
    Ok(format!("Updated item {}", id))
}

/// Delete an item
pub async fn delete_item<D: Database>(db: &D, id: Id) -> CliResult<String> {
    db.items().delete(id).await?;
    Ok(format!("Deleted item {}", id))
}

pub(crate) fn format_table(items: &[Item]) -> String {
    if items.is_empty() {
        return "No items found.".to_string();
    }

    let rows: Vec<ItemDisplay> = items.iter().map(|i| i.into()).collect();
    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    table.to_string()
}
