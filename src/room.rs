//! Room aggregate and its input/query types
//!
//! A `Room` is the caller-facing, nested view folded out of one entity row
//! and its flat value rows: structured `location`/`room_type` fields for the
//! well-known attributes, plus an explicit typed map for everything else.

use crate::value::AttributeValue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Structural attributes grouped into a nested sub-object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    pub building: Option<String>,
    pub floor: Option<f64>,
    pub room_number: Option<String>,
}

/// A room resource reconstructed from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Structural attributes (building, floor, room number)
    pub location: Location,
    /// Classification (Lab, Lecture Hall, Office, ...)
    pub room_type: Option<String>,
    /// Every attribute not routed into a structured field, verbatim by name
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// Attribute payload shared by create and update operations.
///
/// Only supplied fields are written; an absent field never clears an
/// existing value.
#[derive(Debug, Clone, Default)]
pub struct RoomAttributes {
    pub building: Option<String>,
    pub floor: Option<f64>,
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub capacity: Option<f64>,
    /// Stored as a JSON-encoded text attribute
    pub equipment: Option<Vec<String>>,
    /// Anything beyond the well-known attributes, keyed by name
    pub extra: BTreeMap<String, AttributeValue>,
}

/// Input for creating a room.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub name: String,
    pub is_active: bool,
    pub attributes: RoomAttributes,
}

impl NewRoom {
    /// New active room with no attributes set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: true,
            attributes: RoomAttributes::default(),
        }
    }
}

/// Partial update for a room. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RoomPatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub attributes: RoomAttributes,
}

/// Recognized list filters.
///
/// `is_active: None` is the "all" state of the tri-state activity filter.
#[derive(Debug, Clone, Default)]
pub struct RoomFilters {
    /// Free-text term matched against the room name and searchable attributes
    pub search: Option<String>,
    /// Exact room classification
    pub room_type: Option<String>,
    /// Exact building name
    pub building: Option<String>,
    /// Minimum seat capacity
    pub min_capacity: Option<f64>,
    pub is_active: Option<bool>,
}

impl RoomFilters {
    /// Filter set carrying only a free-text search term
    pub fn search_term(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize)]
pub struct RoomPage {
    pub items: Vec<Room>,
    /// Matching entities across all pages
    pub total: usize,
    /// 1-indexed page number
    pub page: usize,
    /// ceil(total / limit)
    pub pages: usize,
}
