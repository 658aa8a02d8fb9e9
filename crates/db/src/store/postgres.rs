//! PostgreSQL [`EntityStore`] built on sqlx.
//!
//! Structured filters are translated into a parameterized `WHERE` clause.
//! A [`Filter::Custom`] closure cannot be expressed in SQL: it is replaced by
//! `TRUE` in the query and the full filter is re-applied to the fetched rows.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use villa_core::types::DbId;

use super::{Entity, EntityStore, FieldValue, Filter, StoreError, StoreTransaction};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Row mapping for entities persisted in PostgreSQL.
pub trait PgEntity: Entity + for<'r> FromRow<'r, PgRow> + Unpin {
    /// Select list, in the order `FromRow` expects.
    const COLUMNS: &'static str;

    /// Push `(col, ...) VALUES (bind, ...)`. Generated identities are omitted.
    fn push_insert(&self, qb: &mut QueryBuilder<'static, Postgres>);

    /// Push `col = bind, ...` for every mutable column (identity excluded).
    fn push_assignments(&self, qb: &mut QueryBuilder<'static, Postgres>);
}

/// Append the SQL form of `filter` to `qb`.
pub fn push_filter<T>(qb: &mut QueryBuilder<'static, Postgres>, filter: &Filter<T>) {
    match filter {
        Filter::All | Filter::Custom(_) => {
            qb.push("TRUE");
        }
        Filter::Eq(column, FieldValue::Int(value)) => {
            qb.push(column).push(" = ").push_bind(*value);
        }
        Filter::Eq(column, FieldValue::Text(value)) => {
            qb.push(column).push(" = ").push_bind(value.clone());
        }
        Filter::EqIgnoreCase(column, value) => {
            qb.push("LOWER(")
                .push(column)
                .push(") = LOWER(")
                .push_bind(value.clone())
                .push(")");
        }
        Filter::And(parts) if parts.is_empty() => {
            qb.push("TRUE");
        }
        Filter::And(parts) => {
            qb.push("(");
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    qb.push(" AND ");
                }
                push_filter(qb, part);
            }
            qb.push(")");
        }
    }
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return StoreError::UniqueViolation(constraint);
        }
    }
    StoreError::Database(err)
}

/// PostgreSQL-backed store for one entity type. Cloning shares the pool.
pub struct PgStore<T> {
    pool: PgPool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for PgStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: PgEntity> PgStore<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T: PgEntity> EntityStore<T> for PgStore<T> {
    async fn query(&self, filter: &Filter<T>) -> Result<Vec<T>, StoreError> {
        let mut qb: QueryBuilder<'static, Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM {} WHERE ", T::COLUMNS, T::TABLE));
        push_filter(&mut qb, filter);

        let mut rows = qb.build_query_as::<T>().fetch_all(&self.pool).await?;
        if filter.has_custom() {
            rows.retain(|row| filter.matches(row));
        }
        Ok(rows)
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction<T>>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction::<T> {
            tx,
            _entity: PhantomData,
        }))
    }
}

struct PgTransaction<T> {
    tx: sqlx::Transaction<'static, Postgres>,
    _entity: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: PgEntity> StoreTransaction<T> for PgTransaction<T> {
    async fn insert(&mut self, entity: &T) -> Result<DbId, StoreError> {
        if !T::GENERATED_ID && entity.id() == 0 {
            return Err(StoreError::MissingIdentity { entity: T::NAME });
        }

        let mut qb: QueryBuilder<'static, Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} ", T::TABLE));
        entity.push_insert(&mut qb);
        qb.push(format!(" RETURNING {}", T::ID_COLUMN));

        qb.build_query_scalar::<DbId>()
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_write_error)
    }

    async fn update(&mut self, entity: &T) -> Result<(), StoreError> {
        let mut qb: QueryBuilder<'static, Postgres> =
            QueryBuilder::new(format!("UPDATE {} SET ", T::TABLE));
        entity.push_assignments(&mut qb);
        qb.push(format!(" WHERE {} = ", T::ID_COLUMN))
            .push_bind(entity.id());

        let result = qb
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(map_write_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound {
                entity: T::NAME,
                id: entity.id(),
            });
        }
        Ok(())
    }

    async fn delete(&mut self, entity: &T) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", T::TABLE, T::ID_COLUMN);
        let result = sqlx::query(&sql)
            .bind(entity.id())
            .execute(&mut *self.tx)
            .await
            .map_err(map_write_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound {
                entity: T::NAME,
                id: entity.id(),
            });
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx.commit().await.map_err(map_write_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_clause(filter: &Filter<()>) -> String {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("");
        push_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_all_and_custom_become_true() {
        assert_eq!(where_clause(&Filter::All), "TRUE");
        assert_eq!(
            where_clause(&Filter::Custom(std::sync::Arc::new(|_: &()| false))),
            "TRUE"
        );
        assert_eq!(where_clause(&Filter::And(Vec::new())), "TRUE");
    }

    #[test]
    fn test_eq_binds_parameter() {
        let sql = where_clause(&Filter::Eq("id", FieldValue::Int(7)));
        assert_eq!(sql, "id = $1");
    }

    #[test]
    fn test_conjunction_with_case_insensitive_match() {
        let filter = Filter::And(vec![
            Filter::EqIgnoreCase("username", "Alice".into()),
            Filter::Eq("password", FieldValue::Text("pw1".into())),
        ]);
        assert_eq!(
            where_clause(&filter),
            "(LOWER(username) = LOWER($1) AND password = $2)"
        );
    }
}
