//! SQLite ItemRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::helpers::{
    BindValue, bind_scalar_values, bind_values, build_limit_offset_clause, build_order_clause,
    build_where_clause, db_error, delete_with_policy, exists, fetch_in_chunks, like_pattern,
    map_write_error,
};
use super::review::review_from_row;
use crate::db::schema::EntityKind;
use crate::db::{
    DbError, DbResult, DeletePolicy, Id, Item, ItemQuery, ItemRepository, ListResult, NewItem,
    Review,
};

/// SQLx-backed item repository.
pub struct SqliteItemRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
    pub(crate) delete_policy: DeletePolicy,
}

/// SQLite stores infinities but they serialize as JSON `null`, and NaN reads back as NULL.
fn check_price(price: f64) -> DbResult<()> {
    if price.is_finite() {
        Ok(())
    } else {
        Err(DbError::Validation {
            message: format!("price must be a finite number, got {}", price),
        })
    }
}

pub(crate) fn item_from_row(row: &SqliteRow) -> Item {
    Item {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
    }
}

impl<'a> ItemRepository for SqliteItemRepository<'a> {
    async fn create(&self, item: &NewItem) -> DbResult<Item> {
        check_price(item.price)?;

        let result = sqlx::query("INSERT INTO items (name, price) VALUES (?, ?)")
            .bind(&item.name)
            .bind(item.price)
            .execute(self.pool)
            .await
            .map_err(map_write_error)?;

        let id = result.last_insert_rowid();
        debug!(id, price = item.price, "created item");

        Ok(Item {
            id,
            name: item.name.clone(),
            price: item.price,
        })
    }

    async fn get(&self, id: Id) -> DbResult<Item> {
        let row = sqlx::query("SELECT id, name, price FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref()
            .map(item_from_row)
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    async fn get_many(&self, ids: &[Id]) -> DbResult<Vec<Item>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        // Chunks cover ascending id ranges, so rows arrive in id order.
        let rows =
            fetch_in_chunks(self.pool, "SELECT id, name, price FROM items", "id", ids).await?;
        Ok(rows.iter().map(item_from_row).collect())
    }

    async fn list(&self, query: Option<&ItemQuery>) -> DbResult<ListResult<Item>> {
        let default_query = ItemQuery::default();
        let query = query.unwrap_or(&default_query);
        let allowed_fields = ["id", "name", "price"];

        let order_clause = build_order_clause(&query.page, &allowed_fields, "id");
        let limit_clause = build_limit_offset_clause(&query.page);

        let mut conditions: Vec<&str> = vec![];
        let mut bind_list: Vec<BindValue> = vec![];

        if let Some(name) = query.name.as_deref()
            && !name.is_empty()
        {
            conditions.push("name LIKE ? ESCAPE '\\'");
            bind_list.push(BindValue::Text(like_pattern(name)));
        }

        if let Some(min) = query.min_price {
            conditions.push("price >= ?");
            bind_list.push(BindValue::Real(min));
        }

        if let Some(max) = query.max_price {
            conditions.push("price <= ?");
            bind_list.push(BindValue::Real(max));
        }

        let where_clause = build_where_clause(&conditions);
        let sql = format!(
            "SELECT id, name, price FROM items {} {}{}",
            where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM items {}", where_clause);

        let rows = bind_values(sqlx::query(&sql), &bind_list)
            .fetch_all(self.pool)
            .await
            .map_err(db_error)?;

        let total: i64 = bind_scalar_values(sqlx::query_scalar(&count_sql), &bind_list)
            .fetch_one(self.pool)
            .await
            .map_err(db_error)?;

        Ok(ListResult {
            items: rows.iter().map(item_from_row).collect(),
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    async fn update(&self, item: &Item) -> DbResult<()> {
        check_price(item.price)?;

        let result = sqlx::query("UPDATE items SET name = ?, price = ? WHERE id = ?")
            .bind(&item.name)
            .bind(item.price)
            .bind(item.id)
            .execute(self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", item.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Id) -> DbResult<()> {
        delete_with_policy(self.pool, EntityKind::Item, id, self.delete_policy).await
    }

    async fn reviews(&self, item_id: Id) -> DbResult<Vec<Review>> {
        if !exists(self.pool, EntityKind::Item, item_id).await? {
            return Err(DbError::not_found("Item", item_id));
        }

        let rows = sqlx::query(
            "SELECT id, comment, customer_id, item_id FROM reviews WHERE item_id = ? ORDER BY id",
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(review_from_row).collect())
    }
}
