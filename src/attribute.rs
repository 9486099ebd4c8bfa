//! Attribute definitions - the registered name/type pairs value rows reference
//!
//! Every stored value belongs to an attribute definition. Definitions are
//! created lazily on first use and never deleted; the definition's data type
//! decides which typed column of a value row is meaningful.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Name of the attribute holding a room's building.
pub const BUILDING: &str = "building";
/// Name of the attribute holding a room's floor.
pub const FLOOR: &str = "floor";
/// Name of the attribute holding a room's door number.
pub const ROOM_NUMBER: &str = "room_number";
/// Name of the attribute classifying a room (Lab, Lecture Hall, Office, ...).
pub const ROOM_TYPE: &str = "room_type";
/// Name of the attribute holding seat capacity.
pub const CAPACITY: &str = "capacity";
/// Name of the attribute holding the JSON-encoded equipment list.
pub const EQUIPMENT: &str = "equipment";
/// Name of the attribute holding the JSON-encoded amenities list.
pub const AMENITIES: &str = "amenities";

/// Attributes matched by free-text search, in addition to the entity name.
pub const SEARCHABLE: &[&str] = &[BUILDING, ROOM_NUMBER];

/// Attributes stored as JSON-encoded text and decoded to lists on read.
pub const JSON_LISTS: &[&str] = &[EQUIPMENT, AMENITIES];

/// Typed storage classes for attribute values.
///
/// Each variant maps to exactly one column of the value table; readers
/// select the column by the owning definition's type rather than probing
/// columns for a non-null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Short strings - names, codes, classifications
    String,
    /// Numeric values - capacity, floor
    Number,
    /// Long or structured text, including JSON-encoded lists
    Text,
    /// True/false flags
    Boolean,
    /// Calendar dates
    Date,
}

impl DataType {
    /// Get the string representation of the data type
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Text => "text",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
        }
    }

    /// The value-table column this type is stored in
    pub fn column(&self) -> &'static str {
        match self {
            DataType::String => "value_string",
            DataType::Number => "value_number",
            DataType::Text => "value_text",
            DataType::Boolean => "value_boolean",
            DataType::Date => "value_date",
        }
    }

    /// Get all data types
    pub fn all() -> &'static [DataType] {
        &[
            DataType::String,
            DataType::Number,
            DataType::Text,
            DataType::Boolean,
            DataType::Date,
        ]
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "string" | "str" => Ok(DataType::String),
            "number" | "num" | "numeric" => Ok(DataType::Number),
            "text" => Ok(DataType::Text),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "date" => Ok(DataType::Date),
            _ => Err(Error::InvalidDataType(s.to_string())),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered attribute definition.
///
/// The surrogate id is what value rows reference; the name is unique across
/// the store. Once created, the stored data type wins over whatever type
/// later callers pass when resolving the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Surrogate id referenced by value rows
    pub id: i64,
    /// Unique attribute name
    pub name: String,
    /// Storage class deciding which value column holds this attribute
    pub data_type: DataType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_round_trip() {
        for dt in DataType::all() {
            let parsed: DataType = dt.as_str().parse().unwrap();
            assert_eq!(parsed, *dt);
        }
    }

    #[test]
    fn test_data_type_aliases() {
        assert_eq!("bool".parse::<DataType>().unwrap(), DataType::Boolean);
        assert_eq!("NUM".parse::<DataType>().unwrap(), DataType::Number);
        assert_eq!("str".parse::<DataType>().unwrap(), DataType::String);
    }

    #[test]
    fn test_unknown_data_type() {
        assert!("blob".parse::<DataType>().is_err());
    }

    #[test]
    fn test_column_names() {
        assert_eq!(DataType::Number.column(), "value_number");
        assert_eq!(DataType::Date.column(), "value_date");
    }
}
