//! Shared helper functions for SQLite repositories.

use sqlx::error::ErrorKind;
use sqlx::query::{Query, QueryScalar};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Executor, SqlitePool};
use tracing::{info, warn};

use crate::db::schema::{EntityKind, dependents_of};
use crate::db::{DbError, DbResult, DeletePolicy, Id, PageSort, SortOrder};

/// A dynamically collected bind parameter for filter clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Real(f64),
    Int(i64),
}

/// Bind `values` to `query` in order.
pub fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: &'q [BindValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            BindValue::Text(s) => query.bind(s.as_str()),
            BindValue::Real(f) => query.bind(*f),
            BindValue::Int(i) => query.bind(*i),
        };
    }
    query
}

/// Bind `values` to a scalar query in order.
pub fn bind_scalar_values<'q, O>(
    mut query: QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
    values: &'q [BindValue],
) -> QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            BindValue::Text(s) => query.bind(s.as_str()),
            BindValue::Real(f) => query.bind(*f),
            BindValue::Int(i) => query.bind(*i),
        };
    }
    query
}

/// Build a WHERE clause from collected conditions (empty when none).
pub fn build_where_clause(conditions: &[&str]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

/// Whether a row of `kind` with `id` exists.
pub async fn exists<'e, E>(executor: E, kind: EntityKind, id: Id) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", kind.table());
    sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(executor)
        .await
        .map_err(db_error)
}

/// Delete a customer or item, applying `policy` to the reviews that point at it.
///
/// The existence check, the dependent check or cascade, and the delete
/// itself run in one transaction.
pub async fn delete_with_policy(
    pool: &SqlitePool,
    kind: EntityKind,
    id: Id,
    policy: DeletePolicy,
) -> DbResult<()> {
    let mut tx = pool.begin().await.map_err(db_error)?;

    if !exists(&mut *tx, kind, id).await? {
        return Err(DbError::not_found(kind.label(), id));
    }

    for fk in dependents_of(kind) {
        match policy {
            DeletePolicy::Restrict => {
                let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?", fk.table, fk.column);
                let dependents: i64 = sqlx::query_scalar(&sql)
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(db_error)?;

                if dependents > 0 {
                    warn!(entity = kind.label(), id, dependents, "delete blocked by dependent rows");
                    return Err(DbError::ReferentialIntegrity {
                        entity_type: kind.label().to_string(),
                        id: id.to_string(),
                        message: format!("{} dependent row(s) in {}", dependents, fk.table),
                    });
                }
            }
            DeletePolicy::Cascade => {
                let sql = format!("DELETE FROM {} WHERE {} = ?", fk.table, fk.column);
                let removed = sqlx::query(&sql)
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error)?
                    .rows_affected();
                if removed > 0 {
                    info!(entity = kind.label(), id, removed, table = fk.table, "cascaded delete");
                }
            }
        }
    }

    let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
    sqlx::query(&sql)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_delete_error(e, kind.label(), id))?;

    tx.commit().await.map_err(db_error)?;

    info!(entity = kind.label(), id, "deleted");
    Ok(())
}

/// Validate and map a sort field to the actual column name.
/// Returns None for invalid fields (falls back to default).
pub fn validate_sort_field(field: &str, allowed: &[&str]) -> Option<&'static str> {
    if !allowed.contains(&field) {
        return None;
    }
    match field {
        "id" => Some("id"),
        "name" => Some("name"),
        "price" => Some("price"),
        "comment" => Some("comment"),
        "customer_id" => Some("customer_id"),
        "item_id" => Some("item_id"),
        _ => None,
    }
}

/// Build ORDER BY clause from PageSort parameters.
pub fn build_order_clause(page: &PageSort, allowed_fields: &[&str], default_field: &str) -> String {
    let sort_field = page
        .sort_by
        .as_deref()
        .and_then(|f| validate_sort_field(f, allowed_fields))
        .unwrap_or(default_field);

    let order = match page.sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    // Tie-break on id so pages are stable when the sort column repeats.
    if sort_field == "id" {
        format!("ORDER BY id {}", order)
    } else {
        format!("ORDER BY {} {}, id ASC", sort_field, order)
    }
}

/// Build LIMIT/OFFSET clause from PageSort parameters.
/// Note: SQL requires LIMIT when using OFFSET. If offset is provided without limit,
/// we use LIMIT -1 (SQLite's "no limit" value).
pub fn build_limit_offset_clause(page: &PageSort) -> String {
    let mut clause = String::new();

    let offset = page.offset.filter(|o| *o > 0);

    if let Some(limit) = page.limit {
        clause.push_str(&format!(" LIMIT {}", limit));
    } else if offset.is_some() {
        clause.push_str(" LIMIT -1");
    }

    if let Some(offset) = offset {
        clause.push_str(&format!(" OFFSET {}", offset));
    }

    clause
}

/// Most ids bound into a single `IN (...)` list; SQLite caps bound variables per statement.
pub const IN_CHUNK_SIZE: usize = 500;

/// Run `{select} WHERE {column} IN (...)` over `ids`, at most [`IN_CHUNK_SIZE`] per query.
///
/// Duplicate ids are queried once. Rows come back grouped by chunk, so callers
/// that need a global order sort afterwards.
pub async fn fetch_in_chunks(
    pool: &SqlitePool,
    select: &str,
    column: &str,
    ids: &[Id],
) -> DbResult<Vec<SqliteRow>> {
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let mut rows = Vec::with_capacity(unique.len());
    for chunk in unique.chunks(IN_CHUNK_SIZE) {
        let sql = format!("{} WHERE {} IN ({})", select, column, placeholders(chunk.len()));
        let mut query = sqlx::query(&sql);
        for id in chunk {
            query = query.bind(*id);
        }
        rows.extend(query.fetch_all(pool).await.map_err(db_error)?);
    }
    Ok(rows)
}

/// `?, ?, ?` with `count` placeholders, for `IN (...)` lists.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Escape `%`, `_` and `\` so user input matches literally inside LIKE.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Classify an sqlx error raised by an insert or update.
pub fn map_write_error(e: sqlx::Error) -> DbError {
    match e.as_database_error().map(|db| db.kind()) {
        Some(ErrorKind::ForeignKeyViolation)
        | Some(ErrorKind::NotNullViolation)
        | Some(ErrorKind::CheckViolation)
        | Some(ErrorKind::UniqueViolation) => DbError::Constraint {
            message: e.to_string(),
        },
        _ => DbError::Database {
            message: e.to_string(),
        },
    }
}

/// Classify an sqlx error raised by a delete of `entity_type` `id`.
pub fn map_delete_error(e: sqlx::Error, entity_type: &str, id: i64) -> DbError {
    match e.as_database_error().map(|db| db.kind()) {
        Some(ErrorKind::ForeignKeyViolation) => DbError::ReferentialIntegrity {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
            message: e.to_string(),
        },
        _ => DbError::Database {
            message: e.to_string(),
        },
    }
}

/// Plain store failure with no constraint meaning.
pub fn db_error(e: sqlx::Error) -> DbError {
    DbError::Database {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_defaults_when_field_not_allowed() {
        let page = PageSort {
            sort_by: Some("price; DROP TABLE items".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_order_clause(&page, &["id", "name"], "id"),
            "ORDER BY id ASC"
        );
    }

    #[test]
    fn test_order_clause_adds_id_tie_break() {
        let page = PageSort {
            sort_by: Some("name".to_string()),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        assert_eq!(
            build_order_clause(&page, &["id", "name"], "id"),
            "ORDER BY name DESC, id ASC"
        );
    }

    #[test]
    fn test_limit_offset_clause() {
        let page = PageSort {
            limit: Some(10),
            offset: Some(20),
            ..Default::default()
        };
        assert_eq!(build_limit_offset_clause(&page), " LIMIT 10 OFFSET 20");

        let offset_only = PageSort {
            offset: Some(5),
            ..Default::default()
        };
        assert_eq!(build_limit_offset_clause(&offset_only), " LIMIT -1 OFFSET 5");

        assert_eq!(build_limit_offset_clause(&PageSort::default()), "");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ada"), "%ada%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_build_where_clause() {
        assert_eq!(build_where_clause(&[]), "");
        assert_eq!(
            build_where_clause(&["a = ?", "b = ?"]),
            "WHERE a = ? AND b = ?"
        );
    }
}
