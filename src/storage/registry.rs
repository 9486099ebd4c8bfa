//! Attribute registry - lazy name-to-id resolution
//!
//! Resolves an attribute name to its definition, creating the definition on
//! first reference. Get-or-create, not an upsert: two writers resolving the
//! same unseen name can both miss the lookup, and the UNIQUE constraint on
//! the name rejects the losing insert, which is recovered by re-running the
//! lookup.

use crate::attribute::AttributeDefinition;
use crate::{DataType, Error, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

/// Resolves attribute names against a borrowed connection
pub struct AttributeRegistry<'a> {
    conn: &'a Connection,
}

impl<'a> AttributeRegistry<'a> {
    /// Create a registry over an open connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Look up a definition by name
    pub fn find(&self, name: &str) -> Result<Option<AttributeDefinition>> {
        self.conn
            .query_row(
                "SELECT id, name, data_type FROM attributes WHERE name = ?1",
                [name],
                row_to_definition,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Resolve a name to its definition, creating it on first use.
    ///
    /// An existing definition wins: the passed `data_type` only applies when
    /// the name has never been seen. If the insert loses a race against a
    /// concurrent creator (unique-constraint violation), the lookup is run
    /// once more instead of propagating the conflict.
    pub fn resolve(&self, name: &str, data_type: DataType) -> Result<AttributeDefinition> {
        if let Some(definition) = self.find(name)? {
            return Ok(definition);
        }

        let inserted = self.conn.execute(
            "INSERT INTO attributes (name, data_type) VALUES (?1, ?2)",
            params![name, data_type.as_str()],
        );

        match inserted {
            Ok(_) => Ok(AttributeDefinition {
                id: self.conn.last_insert_rowid(),
                name: name.to_string(),
                data_type,
            }),
            Err(err) if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                tracing::debug!("lost attribute race for '{}', re-running lookup", name);
                self.find(name)?.ok_or(Error::Storage(err))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Count registered definitions
    pub fn count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM attributes", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Helper to convert a row to an AttributeDefinition
pub(crate) fn row_to_definition(row: &rusqlite::Row) -> rusqlite::Result<AttributeDefinition> {
    let data_type_str: String = row.get(2)?;

    let data_type: DataType = data_type_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(AttributeDefinition {
        id: row.get(0)?,
        name: row.get(1)?,
        data_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, []).unwrap();
        }
        conn
    }

    #[test]
    fn test_resolve_creates_definition() {
        let conn = test_conn();
        let registry = AttributeRegistry::new(&conn);

        let def = registry.resolve("building", DataType::String).unwrap();
        assert_eq!(def.name, "building");
        assert_eq!(def.data_type, DataType::String);
        assert!(def.id > 0);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let conn = test_conn();
        let registry = AttributeRegistry::new(&conn);

        let first = registry.resolve("capacity", DataType::Number).unwrap();
        let second = registry.resolve("capacity", DataType::Number).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(registry.count().unwrap(), 1);
    }

    #[test]
    fn test_stored_data_type_wins() {
        let conn = test_conn();
        let registry = AttributeRegistry::new(&conn);

        registry.resolve("floor", DataType::Number).unwrap();
        let resolved = registry.resolve("floor", DataType::String).unwrap();
        assert_eq!(resolved.data_type, DataType::Number);
    }

    #[test]
    fn test_find_missing_is_none() {
        let conn = test_conn();
        let registry = AttributeRegistry::new(&conn);
        assert!(registry.find("nope").unwrap().is_none());
    }
}
