//! Storage Layer - SQLite-backed EAV persistence
//!
//! System of record is SQLite with tables:
//! - entities(id, name, is_active, created_at, updated_at)
//! - attributes(id, name UNIQUE, data_type)
//! - entity_values(entity_id, attribute_id, value_string, value_number,
//!   value_text, value_boolean, value_date) UNIQUE(entity_id, attribute_id)
//!
//! Exactly one typed column of a value row is populated, selected by the
//! owning attribute definition's data type.

pub mod mapper;
pub mod registry;
pub mod repository;
pub mod schema;
pub mod values;

pub use mapper::{EntityRow, ValueRow};
pub use registry::AttributeRegistry;
pub use repository::{RoomRepository, StoreStats};
pub use values::ValueStore;
