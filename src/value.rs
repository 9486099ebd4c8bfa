//! Typed attribute values
//!
//! A tagged union over the five storage classes, plus a `Json` variant for
//! list attributes that are persisted as JSON-encoded text and decoded back
//! into structured values when an aggregate is read.

use crate::DataType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single typed attribute value.
///
/// Serializes untagged, so aggregates render as natural JSON
/// (`"Science Hall"`, `42`, `true`, `["projector", "whiteboard"]`).
/// When deserializing, free-form strings always land in `Str`; the `Text`
/// variant is only produced by the storage layer, driven by the owning
/// definition's data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Str(String),
    Number(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    Json(serde_json::Value),
}

impl AttributeValue {
    /// The data type a fresh definition gets when this value introduces an
    /// attribute name the store has never seen.
    pub fn data_type_hint(&self) -> DataType {
        match self {
            AttributeValue::Str(_) => DataType::String,
            AttributeValue::Number(_) => DataType::Number,
            AttributeValue::Bool(_) => DataType::Boolean,
            AttributeValue::Text(_) => DataType::Text,
            AttributeValue::Date(_) => DataType::Date,
            AttributeValue::Json(_) => DataType::Text,
        }
    }

    /// Coerce into a string for a `string`-typed column.
    pub fn as_string_value(&self) -> Option<String> {
        match self {
            AttributeValue::Str(s) | AttributeValue::Text(s) => Some(s.clone()),
            AttributeValue::Json(v) => Some(v.to_string()),
            _ => None,
        }
    }

    /// Coerce into a string for a `text`-typed column.
    ///
    /// Identical to [`as_string_value`](Self::as_string_value); text columns
    /// just hold longer payloads, including JSON-encoded lists.
    pub fn as_text_value(&self) -> Option<String> {
        self.as_string_value()
    }

    /// Coerce into a number for a `number`-typed column.
    pub fn as_number_value(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Coerce into a bool for a `boolean`-typed column.
    pub fn as_bool_value(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerce into a date for a `date`-typed column.
    ///
    /// ISO-8601 strings (`2026-09-01`) are accepted alongside `Date` values.
    pub fn as_date_value(&self) -> Option<NaiveDate> {
        match self {
            AttributeValue::Date(d) => Some(*d),
            AttributeValue::Str(s) | AttributeValue::Text(s) => {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
            }
            _ => None,
        }
    }

    /// Borrow the inner string of `Str`/`Text` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) | AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Consume into the inner string of `Str`/`Text` values.
    pub fn into_string(self) -> Option<String> {
        match self {
            AttributeValue::Str(s) | AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Str(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Str(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<NaiveDate> for AttributeValue {
    fn from(d: NaiveDate) -> Self {
        AttributeValue::Date(d)
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Str(s) | AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Date(d) => write!(f, "{}", d),
            AttributeValue::Json(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_hint() {
        assert_eq!(
            AttributeValue::from("Lab").data_type_hint(),
            DataType::String
        );
        assert_eq!(AttributeValue::from(30.0).data_type_hint(), DataType::Number);
        assert_eq!(
            AttributeValue::Json(serde_json::json!(["a"])).data_type_hint(),
            DataType::Text
        );
    }

    #[test]
    fn test_date_coercion_from_string() {
        let value = AttributeValue::from("2026-09-01");
        assert_eq!(
            value.as_date_value(),
            NaiveDate::from_ymd_opt(2026, 9, 1)
        );
        assert!(AttributeValue::from("not a date").as_date_value().is_none());
    }

    #[test]
    fn test_untagged_serialization() {
        let list = AttributeValue::Json(serde_json::json!(["projector", "whiteboard"]));
        assert_eq!(
            serde_json::to_string(&list).unwrap(),
            r#"["projector","whiteboard"]"#
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::from(12.0)).unwrap(),
            "12.0"
        );
    }

    #[test]
    fn test_untagged_deserialization_prefers_str() {
        let value: AttributeValue = serde_json::from_str(r#""north wing""#).unwrap();
        assert_eq!(value, AttributeValue::Str("north wing".to_string()));

        let value: AttributeValue = serde_json::from_str("[1, 2]").unwrap();
        assert!(matches!(value, AttributeValue::Json(_)));
    }
}
