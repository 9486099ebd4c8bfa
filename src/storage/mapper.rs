//! Aggregate mapper - folds flat value rows into a nested Room
//!
//! Structural attribute names populate `location.*`, classification names
//! populate `room_type`, JSON-list attributes are decoded from their text
//! encoding, and every other name lands verbatim in the attribute map.

use crate::attribute::{self, DataType};
use crate::room::{Location, Room};
use crate::value::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One row of the entities table
#[derive(Debug, Clone)]
pub struct EntityRow {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One value row, already narrowed to the column its definition declares
#[derive(Debug, Clone)]
pub struct ValueRow {
    pub name: String,
    pub data_type: DataType,
    pub value: AttributeValue,
}

/// Fold an entity row and its value rows into a Room aggregate.
///
/// If the same logical attribute appears twice in the row set, the last
/// row wins; the (entity, attribute) uniqueness constraint keeps that from
/// happening in practice.
pub fn map_room(entity: EntityRow, rows: Vec<ValueRow>) -> Room {
    let mut room = Room {
        id: entity.id,
        name: entity.name,
        is_active: entity.is_active,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
        location: Location::default(),
        room_type: None,
        attributes: BTreeMap::new(),
    };

    for row in rows {
        let value = decode_json_list(&row.name, row.value);
        match row.name.as_str() {
            attribute::BUILDING => room.location.building = value.into_string(),
            attribute::FLOOR => room.location.floor = value.as_number_value(),
            attribute::ROOM_NUMBER => room.location.room_number = value.into_string(),
            attribute::ROOM_TYPE | "type" => room.room_type = value.into_string(),
            _ => {
                room.attributes.insert(row.name, value);
            }
        }
    }

    room
}

/// Decode well-known JSON-list attributes from their text encoding.
///
/// A parse failure keeps the raw string - lossy but non-fatal.
fn decode_json_list(name: &str, value: AttributeValue) -> AttributeValue {
    if !attribute::JSON_LISTS.contains(&name) {
        return value;
    }
    match value.as_str().map(serde_json::from_str) {
        Some(Ok(parsed)) => AttributeValue::Json(parsed),
        _ => value,
    }
}
