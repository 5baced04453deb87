use serde_json::{Map, Value};
use sqlx::{self, postgres::PgArguments, FromRow};

use crate::database::manager::DatabaseError;

/// A writable column and the Postgres type its bound parameter is cast to
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
}

impl Column {
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self { name, sql_type }
    }

    /// `$n::type`, so text-bound JSON strings land in date/timestamp columns
    pub fn placeholder(&self, n: usize) -> String {
        format!("${}::{}", n, self.sql_type)
    }
}

/// Validate a table or column identifier before it is spliced into SQL
pub fn validate_identifier(name: &str) -> Result<&str, DatabaseError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name.chars().next().is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(DatabaseError::QueryError(format!("invalid identifier: {}", name)))
    }
}

/// Serialize an input payload and pull out the values for `columns`, in order.
/// Missing keys bind as NULL.
pub fn column_values<I: serde::Serialize>(
    input: &I,
    columns: &[Column],
) -> Result<Vec<Value>, DatabaseError> {
    let map = match serde_json::to_value(input) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(DatabaseError::QueryError(format!(
                "expected an object payload, got {}",
                other
            )))
        }
        Err(e) => return Err(DatabaseError::QueryError(e.to_string())),
    };
    Ok(pick(&map, columns))
}

fn pick(map: &Map<String, Value>, columns: &[Column]) -> Vec<Value> {
    columns
        .iter()
        .map(|c| map.get(c.name).cloned().unwrap_or(Value::Null))
        .collect()
}

pub fn bind_value<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> Result<sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>, DatabaseError>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    let q = match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                // Postgres has no unsigned 64-bit type
                let i = i64::try_from(u)
                    .map_err(|_| DatabaseError::QueryError(format!("integer {} is out of range for bigint", u)))?;
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()), // JSONB
    };
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Input {
        name: String,
        is_major: bool,
        icon: Option<String>,
    }

    const COLUMNS: &[Column] = &[
        Column::new("name", "text"),
        Column::new("icon", "text"),
        Column::new("is_major", "boolean"),
        Column::new("sort_order", "integer"),
    ];

    #[test]
    fn picks_values_in_column_order_with_nulls_for_missing() {
        let input = Input { name: "Rust".into(), is_major: true, icon: None };
        let values = column_values(&input, COLUMNS).unwrap();
        assert_eq!(
            values,
            vec![Value::from("Rust"), Value::Null, Value::from(true), Value::Null]
        );
    }

    #[derive(sqlx::FromRow)]
    struct Row {
        #[allow(dead_code)]
        id: i64,
    }

    #[test]
    fn binds_integers_up_to_bigint_max() {
        let fits = Value::from(i64::MAX as u64);
        assert!(bind_value(sqlx::query_as::<_, Row>("SELECT $1::bigint AS id"), &fits).is_ok());

        let too_big = Value::from(u64::MAX);
        let err = bind_value(sqlx::query_as::<_, Row>("SELECT $1::bigint AS id"), &too_big)
            .err()
            .unwrap();
        assert!(matches!(err, DatabaseError::QueryError(ref msg) if msg.contains("out of range")));
    }

    #[test]
    fn placeholder_casts_to_column_type() {
        assert_eq!(Column::new("start_date", "date").placeholder(3), "$3::date");
    }

    #[test]
    fn identifiers_are_validated() {
        assert!(validate_identifier("project_technologies").is_ok());
        assert!(validate_identifier("Projects").is_err());
        assert!(validate_identifier("projects; DROP TABLE users").is_err());
        assert!(validate_identifier("").is_err());
    }
}
