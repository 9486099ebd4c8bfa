//! Value store - one typed row per (entity, attribute)
//!
//! Writes are upserts: on conflict with the (entity_id, attribute_id)
//! uniqueness constraint all five typed columns are overwritten, the four
//! inapplicable ones to NULL. Callers only write supplied values, so absent
//! input never clears an existing value.

use crate::attribute::AttributeDefinition;
use crate::value::AttributeValue;
use crate::{DataType, Error, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// Persists typed attribute values against a borrowed connection
pub struct ValueStore<'a> {
    conn: &'a Connection,
}

/// The five typed columns of a value row, at most one populated
type TypedColumns = (
    Option<String>,
    Option<f64>,
    Option<String>,
    Option<bool>,
    Option<NaiveDate>,
);

impl<'a> ValueStore<'a> {
    /// Create a value store over an open connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert or overwrite the value for (entity, attribute).
    ///
    /// The populated column is chosen by the definition's data type; a value
    /// that cannot be coerced into that column is a `TypeMismatch`.
    pub fn put(
        &self,
        entity_id: i64,
        attribute: &AttributeDefinition,
        value: &AttributeValue,
    ) -> Result<()> {
        let (string, number, text, boolean, date) = typed_columns(attribute, value)?;

        self.conn.execute(
            r#"
            INSERT INTO entity_values
                (entity_id, attribute_id, value_string, value_number, value_text, value_boolean, value_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(entity_id, attribute_id) DO UPDATE SET
                value_string = excluded.value_string,
                value_number = excluded.value_number,
                value_text = excluded.value_text,
                value_boolean = excluded.value_boolean,
                value_date = excluded.value_date
            "#,
            params![entity_id, attribute.id, string, number, text, boolean, date],
        )?;
        Ok(())
    }

    /// Count stored value rows
    pub fn count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM entity_values", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Route a value into the single column declared by the attribute's type
fn typed_columns(
    attribute: &AttributeDefinition,
    value: &AttributeValue,
) -> Result<TypedColumns> {
    let mismatch = || Error::TypeMismatch {
        attribute: attribute.name.clone(),
        expected: attribute.data_type,
    };

    Ok(match attribute.data_type {
        DataType::String => {
            let s = value.as_string_value().ok_or_else(mismatch)?;
            (Some(s), None, None, None, None)
        }
        DataType::Number => {
            let n = value.as_number_value().ok_or_else(mismatch)?;
            (None, Some(n), None, None, None)
        }
        DataType::Text => {
            let t = value.as_text_value().ok_or_else(mismatch)?;
            (None, None, Some(t), None, None)
        }
        DataType::Boolean => {
            let b = value.as_bool_value().ok_or_else(mismatch)?;
            (None, None, None, Some(b), None)
        }
        DataType::Date => {
            let d = value.as_date_value().ok_or_else(mismatch)?;
            (None, None, None, None, Some(d))
        }
    })
}

/// Bind a comparison value for the column declared by `data_type`.
///
/// Used by single-predicate attribute queries; the returned value matches
/// what `put` would have stored.
pub(crate) fn bind_comparison(
    attribute: &AttributeDefinition,
    value: &AttributeValue,
) -> Result<rusqlite::types::Value> {
    use rusqlite::types::Value as SqlValue;

    let mismatch = || Error::TypeMismatch {
        attribute: attribute.name.clone(),
        expected: attribute.data_type,
    };

    Ok(match attribute.data_type {
        DataType::String => SqlValue::Text(value.as_string_value().ok_or_else(mismatch)?),
        DataType::Number => SqlValue::Real(value.as_number_value().ok_or_else(mismatch)?),
        DataType::Text => SqlValue::Text(value.as_text_value().ok_or_else(mismatch)?),
        DataType::Boolean => SqlValue::Integer(value.as_bool_value().ok_or_else(mismatch)? as i64),
        DataType::Date => SqlValue::Text(
            value
                .as_date_value()
                .ok_or_else(mismatch)?
                .format("%Y-%m-%d")
                .to_string(),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::registry::AttributeRegistry;
    use crate::storage::schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, []).unwrap();
        }
        conn.execute(
            "INSERT INTO entities (name, is_active, created_at, updated_at) VALUES ('A101', 1, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
            [],
        )
        .unwrap();
        conn
    }

    fn read_row(conn: &Connection) -> (Option<String>, Option<f64>, Option<String>) {
        conn.query_row(
            "SELECT value_string, value_number, value_text FROM entity_values LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap()
    }

    #[test]
    fn test_put_populates_declared_column_only() {
        let conn = test_conn();
        let registry = AttributeRegistry::new(&conn);
        let store = ValueStore::new(&conn);

        let capacity = registry.resolve("capacity", DataType::Number).unwrap();
        store
            .put(1, &capacity, &AttributeValue::Number(40.0))
            .unwrap();

        let (s, n, t) = read_row(&conn);
        assert_eq!(s, None);
        assert_eq!(n, Some(40.0));
        assert_eq!(t, None);
    }

    #[test]
    fn test_second_put_replaces_row() {
        let conn = test_conn();
        let registry = AttributeRegistry::new(&conn);
        let store = ValueStore::new(&conn);

        let building = registry.resolve("building", DataType::String).unwrap();
        store.put(1, &building, &"Old Hall".into()).unwrap();
        store.put(1, &building, &"Science Hall".into()).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let (s, _, _) = read_row(&conn);
        assert_eq!(s.as_deref(), Some("Science Hall"));
    }

    #[test]
    fn test_type_mismatch() {
        let conn = test_conn();
        let registry = AttributeRegistry::new(&conn);
        let store = ValueStore::new(&conn);

        let capacity = registry.resolve("capacity", DataType::Number).unwrap();
        let result = store.put(1, &capacity, &"forty".into());
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_json_value_lands_in_text_column() {
        let conn = test_conn();
        let registry = AttributeRegistry::new(&conn);
        let store = ValueStore::new(&conn);

        let equipment = registry.resolve("equipment", DataType::Text).unwrap();
        let list = AttributeValue::Json(serde_json::json!(["projector"]));
        store.put(1, &equipment, &list).unwrap();

        let (_, _, t) = read_row(&conn);
        assert_eq!(t.as_deref(), Some(r#"["projector"]"#));
    }
}
