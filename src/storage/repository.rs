//! Room repository - the storage facade
//!
//! Owns the SQLite connection and composes the attribute registry, value
//! store, query composer and aggregate mapper into create/read/update/
//! delete/list/search operations. Multi-statement writes run inside a
//! single transaction; a failure before commit rolls the whole write back.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::mapper::{self, EntityRow, ValueRow};
use super::registry::AttributeRegistry;
use super::values::{self, ValueStore};
use super::schema;
use crate::attribute::{self, AttributeDefinition};
use crate::query::{self, composer::ENTITY_COLUMNS};
use crate::room::{NewRoom, Room, RoomAttributes, RoomFilters, RoomPage, RoomPatch};
use crate::value::AttributeValue;
use crate::{DataType, Error, Result};

/// Result cap for the single-predicate search variant
const SEARCH_LIMIT: usize = 50;

/// SQLite-backed repository for room resources
pub struct RoomRepository {
    conn: Connection,
}

impl RoomRepository {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Initialize pragmas and the database schema
    fn initialize(&self) -> Result<()> {
        // Cascade from entities to entity_values needs enforcement on
        self.conn.pragma_update(None, "foreign_keys", true)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Write Operations ==========

    /// Create a room and its supplied attributes, then read it back.
    pub fn create(&mut self, room: &NewRoom) -> Result<Room> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO entities (name, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![room.name, room.is_active, now],
        )?;
        let id = tx.last_insert_rowid();

        write_attributes(&tx, id, &room.attributes)?;
        tx.commit()?;

        tracing::debug!("created room {} '{}'", id, room.name);
        self.get(id)?.ok_or(Error::NotFound(id))
    }

    /// Apply a partial update.
    ///
    /// Only supplied entity columns change and only supplied attributes are
    /// written; everything else keeps its previous value. Returns `None`
    /// when the id does not exist.
    pub fn update(&mut self, id: i64, patch: &RoomPatch) -> Result<Option<Room>> {
        let exists: Option<i64> = self
            .conn
            .query_row("SELECT id FROM entities WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Ok(None);
        }

        let now = Utc::now();
        let tx = self.conn.transaction()?;

        if let Some(name) = &patch.name {
            tx.execute(
                "UPDATE entities SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![name, now, id],
            )?;
        }
        if let Some(active) = patch.is_active {
            tx.execute(
                "UPDATE entities SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
                params![active, now, id],
            )?;
        }
        if patch.name.is_none() && patch.is_active.is_none() {
            tx.execute(
                "UPDATE entities SET updated_at = ?1 WHERE id = ?2",
                params![now, id],
            )?;
        }

        write_attributes(&tx, id, &patch.attributes)?;
        tx.commit()?;

        tracing::debug!("updated room {}", id);
        self.get(id)
    }

    /// Delete a room; value rows cascade. True iff a row was deleted.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM entities WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    // ========== Read Operations ==========

    /// Fetch one room by id; `None` when the entity row is absent.
    pub fn get(&self, id: i64) -> Result<Option<Room>> {
        let entity = self
            .conn
            .query_row(
                &format!("SELECT {ENTITY_COLUMNS} FROM entities e WHERE e.id = ?1"),
                [id],
                row_to_entity,
            )
            .optional()?;

        let Some(entity) = entity else {
            return Ok(None);
        };

        let mut values = self.fetch_values(&[entity.id])?;
        let rows = values.remove(&entity.id).unwrap_or_default();
        Ok(Some(mapper::map_room(entity, rows)))
    }

    /// Filtered, paginated listing.
    ///
    /// Runs the composed count query first; a zero total short-circuits
    /// before any further query is issued. Otherwise the page's value rows
    /// are batch-fetched with a single IN query keyed by the entity id set.
    pub fn list(&self, filters: &RoomFilters, page: usize, limit: usize) -> Result<RoomPage> {
        let limit = limit.max(1);
        let page = page.max(1);
        let query = query::compose(filters, page, limit);

        let total: i64 = self.conn.query_row(
            &query.count_sql,
            params_from_iter(query.params.iter()),
            |row| row.get(0),
        )?;
        let total = total as usize;

        if total == 0 {
            return Ok(RoomPage {
                items: Vec::new(),
                total: 0,
                page,
                pages: 0,
            });
        }

        let mut stmt = self.conn.prepare(&query.list_sql)?;
        let entities: Vec<EntityRow> = stmt
            .query_map(params_from_iter(query.list_params().iter()), row_to_entity)?
            .filter_map(|r| r.ok())
            .collect();

        let items = self.hydrate(entities)?;
        Ok(RoomPage {
            items,
            total,
            page,
            pages: total.div_ceil(limit),
        })
    }

    /// Free-text search across the room name and searchable attributes.
    pub fn search(&self, term: &str) -> Result<Vec<Room>> {
        let page = self.list(&RoomFilters::search_term(term), 1, SEARCH_LIMIT)?;
        Ok(page.items)
    }

    /// Fetch every room whose named attribute equals the given value.
    ///
    /// An unregistered attribute name matches nothing. The comparison runs
    /// against the column declared by the stored definition's data type.
    pub fn find_by_attribute(&self, name: &str, value: &AttributeValue) -> Result<Vec<Room>> {
        let registry = AttributeRegistry::new(&self.conn);
        let Some(definition) = registry.find(name)? else {
            return Ok(Vec::new());
        };
        let comparison = values::bind_comparison(&definition, value)?;

        let sql = format!(
            "SELECT DISTINCT {ENTITY_COLUMNS} FROM entities e \
             JOIN entity_values v ON v.entity_id = e.id AND v.attribute_id = ?1 \
             WHERE v.{} = ?2 ORDER BY e.created_at DESC, e.id DESC",
            definition.data_type.column()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entities: Vec<EntityRow> = stmt
            .query_map(params![definition.id, comparison], row_to_entity)?
            .filter_map(|r| r.ok())
            .collect();

        self.hydrate(entities)
    }

    /// Row counts across the three tables
    pub fn stats(&self) -> Result<StoreStats> {
        let rooms: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))?;
        let attributes = AttributeRegistry::new(&self.conn).count()?;
        let values = ValueStore::new(&self.conn).count()?;
        Ok(StoreStats {
            rooms: rooms as usize,
            attributes,
            values,
        })
    }

    // ========== Helpers ==========

    /// Batch-fetch value rows for an id set and map each entity in order
    fn hydrate(&self, entities: Vec<EntityRow>) -> Result<Vec<Room>> {
        let ids: Vec<i64> = entities.iter().map(|e| e.id).collect();
        let mut values = self.fetch_values(&ids)?;
        Ok(entities
            .into_iter()
            .map(|entity| {
                let rows = values.remove(&entity.id).unwrap_or_default();
                mapper::map_room(entity, rows)
            })
            .collect())
    }

    /// One IN query for the value rows of every listed entity
    fn fetch_values(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<ValueRow>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT v.entity_id, a.name, a.data_type, \
                    v.value_string, v.value_number, v.value_text, v.value_boolean, v.value_date \
             FROM entity_values v \
             JOIN attributes a ON a.id = v.attribute_id \
             WHERE v.entity_id IN ({placeholders})"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(ids.iter()), row_to_value)?
            .filter_map(|r| r.ok());

        let mut grouped: HashMap<i64, Vec<ValueRow>> = HashMap::new();
        for (entity_id, row) in rows.flatten() {
            grouped.entry(entity_id).or_default().push(row);
        }
        Ok(grouped)
    }
}

/// Resolve and write every supplied attribute inside the caller's transaction
fn write_attributes(conn: &Connection, entity_id: i64, attrs: &RoomAttributes) -> Result<()> {
    let registry = AttributeRegistry::new(conn);
    let store = ValueStore::new(conn);

    let put = |name: &str, data_type: DataType, value: AttributeValue| -> Result<()> {
        let definition = registry.resolve(name, data_type)?;
        store.put(entity_id, &definition, &value)
    };

    if let Some(building) = &attrs.building {
        put(attribute::BUILDING, DataType::String, building.clone().into())?;
    }
    if let Some(floor) = attrs.floor {
        put(attribute::FLOOR, DataType::Number, floor.into())?;
    }
    if let Some(room_number) = &attrs.room_number {
        put(
            attribute::ROOM_NUMBER,
            DataType::String,
            room_number.clone().into(),
        )?;
    }
    if let Some(room_type) = &attrs.room_type {
        put(attribute::ROOM_TYPE, DataType::String, room_type.clone().into())?;
    }
    if let Some(capacity) = attrs.capacity {
        put(attribute::CAPACITY, DataType::Number, capacity.into())?;
    }
    if let Some(equipment) = &attrs.equipment {
        let list = serde_json::Value::from(equipment.clone());
        put(attribute::EQUIPMENT, DataType::Text, AttributeValue::Json(list))?;
    }
    for (name, value) in &attrs.extra {
        put(name, value.data_type_hint(), value.clone())?;
    }

    Ok(())
}

/// Helper to convert a row to an EntityRow
fn row_to_entity(row: &rusqlite::Row) -> rusqlite::Result<EntityRow> {
    Ok(EntityRow {
        id: row.get(0)?,
        name: row.get(1)?,
        is_active: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Helper to convert a joined value row.
///
/// Reads only the column declared by the attribute's data type; a row whose
/// declared column is NULL carries no value and maps to `None`.
fn row_to_value(row: &rusqlite::Row) -> rusqlite::Result<Option<(i64, ValueRow)>> {
    let entity_id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let data_type_str: String = row.get(2)?;

    let data_type: DataType = data_type_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let value = match data_type {
        DataType::String => row.get::<_, Option<String>>(3)?.map(AttributeValue::Str),
        DataType::Number => row.get::<_, Option<f64>>(4)?.map(AttributeValue::Number),
        DataType::Text => row.get::<_, Option<String>>(5)?.map(AttributeValue::Text),
        DataType::Boolean => row.get::<_, Option<bool>>(6)?.map(AttributeValue::Bool),
        DataType::Date => row.get::<_, Option<chrono::NaiveDate>>(7)?.map(AttributeValue::Date),
    };

    Ok(value.map(|value| {
        (
            entity_id,
            ValueRow {
                name,
                data_type,
                value,
            },
        )
    }))
}

/// Row counts for the admin CLI
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub rooms: usize,
    pub attributes: usize,
    pub values: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store statistics:")?;
        writeln!(f, "  Rooms: {}", self.rooms)?;
        writeln!(f, "  Attributes: {}", self.attributes)?;
        writeln!(f, "  Values: {}", self.values)
    }
}
