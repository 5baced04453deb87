use serde::{de::DeserializeOwned, Serialize};
use sqlx::{self, postgres::PgRow, FromRow, PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::query::{bind_value, column_values, validate_identifier, Column};

/// A single-table record managed through `Repository`.
///
/// Every table carries `id BIGSERIAL`, `created_at` and `updated_at`; `COLUMNS`
/// lists only the fields a client may write.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static {
    /// Request body accepted for create and update
    type Input: Serialize + DeserializeOwned + Send + Sync + 'static;

    const TABLE: &'static str;
    const COLUMNS: &'static [Column];
    /// Human name used in not-found messages
    const NAME: &'static str;
    /// Default listing order
    const ORDER_BY: &'static str = "id";
}

pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY {}",
            validate_identifier(T::TABLE)?,
            T::ORDER_BY
        );
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn find(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", validate_identifier(T::TABLE)?);
        Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    pub async fn find_404(&self, id: i64) -> Result<T, DatabaseError> {
        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {}", T::NAME, id)))
    }

    pub async fn insert(&self, input: &T::Input) -> Result<T, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_on(&mut *conn, input).await
    }

    pub async fn update(&self, id: i64, input: &T::Input) -> Result<T, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::update_on(&mut *conn, id, input).await
    }

    pub async fn delete(&self, id: i64) -> Result<T, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::delete_on(&mut *conn, id).await
    }

    /// Insert on an explicit connection, e.g. inside a transaction
    pub async fn insert_on(conn: &mut PgConnection, input: &T::Input) -> Result<T, DatabaseError> {
        let values = column_values(input, T::COLUMNS)?;
        let names: Vec<&str> = T::COLUMNS
            .iter()
            .map(|c| validate_identifier(c.name))
            .collect::<Result<_, _>>()?;
        let placeholders: Vec<String> = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| c.placeholder(i + 1))
            .collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            validate_identifier(T::TABLE)?,
            names.join(", "),
            placeholders.join(", ")
        );

        let mut q = sqlx::query_as::<_, T>(&sql);
        for v in values.iter() {
            q = bind_value(q, v)?;
        }
        Ok(q.fetch_one(&mut *conn).await?)
    }

    pub async fn update_on(
        conn: &mut PgConnection,
        id: i64,
        input: &T::Input,
    ) -> Result<T, DatabaseError> {
        let values = column_values(input, T::COLUMNS)?;
        let assignments: Vec<String> = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| Ok(format!("{} = {}", validate_identifier(c.name)?, c.placeholder(i + 1))))
            .collect::<Result<_, DatabaseError>>()?;

        let sql = format!(
            "UPDATE {} SET {}, updated_at = NOW() WHERE id = ${} RETURNING *",
            validate_identifier(T::TABLE)?,
            assignments.join(", "),
            T::COLUMNS.len() + 1
        );

        let mut q = sqlx::query_as::<_, T>(&sql);
        for v in values.iter() {
            q = bind_value(q, v)?;
        }
        q.bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {}", T::NAME, id)))
    }

    pub async fn delete_on(conn: &mut PgConnection, id: i64) -> Result<T, DatabaseError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING *",
            validate_identifier(T::TABLE)?
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {}", T::NAME, id)))
    }
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}
