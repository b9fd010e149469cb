//! SQLite CustomerRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::helpers::{
    BindValue, bind_scalar_values, bind_values, build_limit_offset_clause, build_order_clause,
    build_where_clause, db_error, delete_with_policy, exists, fetch_in_chunks, like_pattern,
    map_write_error,
};
use super::item::item_from_row;
use super::review::review_from_row;
use crate::db::schema::EntityKind;
use crate::db::{
    Customer, CustomerQuery, CustomerRepository, DbError, DbResult, DeletePolicy, Id, Item,
    ListResult, NewCustomer, Review,
};

/// SQLx-backed customer repository.
pub struct SqliteCustomerRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
    pub(crate) delete_policy: DeletePolicy,
}

pub(crate) fn customer_from_row(row: &SqliteRow) -> Customer {
    Customer {
        id: row.get("id"),
        name: row.get("name"),
    }
}

impl<'a> CustomerRepository for SqliteCustomerRepository<'a> {
    async fn create(&self, customer: &NewCustomer) -> DbResult<Customer> {
        let result = sqlx::query("INSERT INTO customers (name) VALUES (?)")
            .bind(&customer.name)
            .execute(self.pool)
            .await
            .map_err(map_write_error)?;

        let id = result.last_insert_rowid();
        debug!(id, "created customer");

        Ok(Customer {
            id,
            name: customer.name.clone(),
        })
    }

    async fn get(&self, id: Id) -> DbResult<Customer> {
        let row = sqlx::query("SELECT id, name FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref()
            .map(customer_from_row)
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    async fn get_many(&self, ids: &[Id]) -> DbResult<Vec<Customer>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        // Chunks cover ascending id ranges, so rows arrive in id order.
        let rows = fetch_in_chunks(self.pool, "SELECT id, name FROM customers", "id", ids).await?;
        Ok(rows.iter().map(customer_from_row).collect())
    }

    async fn list(&self, query: Option<&CustomerQuery>) -> DbResult<ListResult<Customer>> {
        let default_query = CustomerQuery::default();
        let query = query.unwrap_or(&default_query);
        let allowed_fields = ["id", "name"];

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

        let where_clause = build_where_clause(&conditions);
        let sql = format!(
            "SELECT id, name FROM customers {} {}{}",
            where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM customers {}", where_clause);

        let rows = bind_values(sqlx::query(&sql), &bind_list)
            .fetch_all(self.pool)
            .await
            .map_err(db_error)?;

        let total: i64 = bind_scalar_values(sqlx::query_scalar(&count_sql), &bind_list)
            .fetch_one(self.pool)
            .await
            .map_err(db_error)?;

        Ok(ListResult {
            items: rows.iter().map(customer_from_row).collect(),
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    async fn update(&self, customer: &Customer) -> DbResult<()> {
        let result = sqlx::query("UPDATE customers SET name = ? WHERE id = ?")
            .bind(&customer.name)
            .bind(customer.id)
            .execute(self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Id) -> DbResult<()> {
        delete_with_policy(self.pool, EntityKind::Customer, id, self.delete_policy).await
    }

    async fn reviews(&self, customer_id: Id) -> DbResult<Vec<Review>> {
        if !exists(self.pool, EntityKind::Customer, customer_id).await? {
            return Err(DbError::not_found("Customer", customer_id));
        }

        let rows = sqlx::query(
            "SELECT id, comment, customer_id, item_id FROM reviews WHERE customer_id = ? ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    async fn items(&self, customer_id: Id) -> DbResult<Vec<Item>> {
        if !exists(self.pool, EntityKind::Customer, customer_id).await? {
            return Err(DbError::not_found("Customer", customer_id));
        }

        // One row per review, so an item reviewed twice appears twice.
        let rows = sqlx::query(
            "SELECT i.id, i.name, i.price FROM reviews r \
             JOIN items i ON i.id = r.item_id \
             WHERE r.customer_id = ? ORDER BY r.id",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(item_from_row).collect())
    }

    async fn add_item_review(
        &self,
        customer_id: Id,
        item_id: Id,
        comment: Option<&str>,
    ) -> DbResult<Review> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        if !exists(&mut *tx, EntityKind::Customer, customer_id).await? {
            return Err(DbError::not_found("Customer", customer_id));
        }

        if !exists(&mut *tx, EntityKind::Item, item_id).await? {
            return Err(DbError::Constraint {
                message: format!("Item with id '{}' does not exist", item_id),
            });
        }

        let result =
            sqlx::query("INSERT INTO reviews (comment, customer_id, item_id) VALUES (?, ?, ?)")
                .bind(comment)
                .bind(customer_id)
                .bind(item_id)
                .execute(&mut *tx)
                .await
                .map_err(map_write_error)?;

        tx.commit().await.map_err(db_error)?;

        let id = result.last_insert_rowid();
        debug!(id, customer_id, item_id, "linked item to customer through review");

        Ok(Review {
            id,
            comment: comment.map(str::to_string),
            customer_id,
            item_id,
        })
    }
}
