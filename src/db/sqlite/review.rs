//! SQLite ReviewRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::customer::customer_from_row;
use super::helpers::{
    BindValue, bind_scalar_values, bind_values, build_limit_offset_clause, build_order_clause,
    build_where_clause, db_error, exists, fetch_in_chunks, map_write_error,
};
use super::item::item_from_row;
use crate::db::schema::EntityKind;
use crate::db::{
    Customer, DbError, DbResult, Id, Item, ListResult, NewReview, Review, ReviewQuery,
    ReviewRepository,
};

/// SQLx-backed review repository.
pub struct SqliteReviewRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

pub(crate) fn review_from_row(row: &SqliteRow) -> Review {
    Review {
        id: row.get("id"),
        comment: row.get("comment"),
        customer_id: row.get("customer_id"),
        item_id: row.get("item_id"),
    }
}

impl<'a> SqliteReviewRepository<'a> {
    async fn list_by_column(&self, column: &str, ids: &[Id]) -> DbResult<Vec<Review>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = fetch_in_chunks(
            self.pool,
            "SELECT id, comment, customer_id, item_id FROM reviews",
            column,
            ids,
        )
        .await?;

        let mut reviews: Vec<Review> = rows.iter().map(review_from_row).collect();
        reviews.sort_by_key(|r| r.id);
        Ok(reviews)
    }
}

impl<'a> ReviewRepository for SqliteReviewRepository<'a> {
    async fn create(&self, review: &NewReview) -> DbResult<Review> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        if !exists(&mut *tx, EntityKind::Customer, review.customer_id).await? {
            return Err(DbError::Constraint {
                message: format!("Customer with id '{}' does not exist", review.customer_id),
            });
        }

        if !exists(&mut *tx, EntityKind::Item, review.item_id).await? {
            return Err(DbError::Constraint {
                message: format!("Item with id '{}' does not exist", review.item_id),
            });
        }

        let result =
            sqlx::query("INSERT INTO reviews (comment, customer_id, item_id) VALUES (?, ?, ?)")
                .bind(&review.comment)
                .bind(review.customer_id)
                .bind(review.item_id)
                .execute(&mut *tx)
                .await
                .map_err(map_write_error)?;

        tx.commit().await.map_err(db_error)?;

        let id = result.last_insert_rowid();
        debug!(
            id,
            customer_id = review.customer_id,
            item_id = review.item_id,
            "created review"
        );

        Ok(Review {
            id,
            comment: review.comment.clone(),
            customer_id: review.customer_id,
            item_id: review.item_id,
        })
    }

    async fn get(&self, id: Id) -> DbResult<Review> {
        let row =
            sqlx::query("SELECT id, comment, customer_id, item_id FROM reviews WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool)
                .await
                .map_err(db_error)?;

        row.as_ref()
            .map(review_from_row)
            .ok_or_else(|| DbError::not_found("Review", id))
    }

    async fn get_many(&self, ids: &[Id]) -> DbResult<Vec<Review>> {
        self.list_by_column("id", ids).await
    }

    async fn list(&self, query: Option<&ReviewQuery>) -> DbResult<ListResult<Review>> {
        let default_query = ReviewQuery::default();
        let query = query.unwrap_or(&default_query);
        let allowed_fields = ["id", "comment", "customer_id", "item_id"];

        let order_clause = build_order_clause(&query.page, &allowed_fields, "id");
        let limit_clause = build_limit_offset_clause(&query.page);

        let mut conditions: Vec<&str> = vec![];
        let mut bind_list: Vec<BindValue> = vec![];

        if let Some(customer_id) = query.customer_id {
            conditions.push("customer_id = ?");
            bind_list.push(BindValue::Int(customer_id));
        }

        if let Some(item_id) = query.item_id {
            conditions.push("item_id = ?");
            bind_list.push(BindValue::Int(item_id));
        }

        let where_clause = build_where_clause(&conditions);
        let sql = format!(
            "SELECT id, comment, customer_id, item_id FROM reviews {} {}{}",
            where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM reviews {}", where_clause);

        let rows = bind_values(sqlx::query(&sql), &bind_list)
            .fetch_all(self.pool)
            .await
            .map_err(db_error)?;

        let total: i64 = bind_scalar_values(sqlx::query_scalar(&count_sql), &bind_list)
            .fetch_one(self.pool)
            .await
            .map_err(db_error)?;

        Ok(ListResult {
            items: rows.iter().map(review_from_row).collect(),
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    async fn list_by_customers(&self, customer_ids: &[Id]) -> DbResult<Vec<Review>> {
        self.list_by_column("customer_id", customer_ids).await
    }

    async fn list_by_items(&self, item_ids: &[Id]) -> DbResult<Vec<Review>> {
        self.list_by_column("item_id", item_ids).await
    }

    async fn customer(&self, review_id: Id) -> DbResult<Customer> {
        let row = sqlx::query(
            "SELECT c.id, c.name FROM reviews r JOIN customers c ON c.id = r.customer_id \
             WHERE r.id = ?",
        )
        .bind(review_id)
        .fetch_optional(self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref()
            .map(customer_from_row)
            .ok_or_else(|| DbError::not_found("Review", review_id))
    }

    async fn item(&self, review_id: Id) -> DbResult<Item> {
        let row = sqlx::query(
            "SELECT i.id, i.name, i.price FROM reviews r JOIN items i ON i.id = r.item_id \
             WHERE r.id = ?",
        )
        .bind(review_id)
        .fetch_optional(self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref()
            .map(item_from_row)
            .ok_or_else(|| DbError::not_found("Review", review_id))
    }

    async fn update(&self, review: &Review) -> DbResult<()> {
        let result = sqlx::query("UPDATE reviews SET comment = ? WHERE id = ?")
            .bind(&review.comment)
            .bind(review.id)
            .execute(self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Review", review.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Id) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Review", id));
        }

        info!(id, "deleted review");
        Ok(())
    }
}
