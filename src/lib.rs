//! # Roomstore - Schema-flexible room resource store
//!
//! EAV (entity-attribute-value) persistence layer for campus room resources.
//!
//! Roomstore provides:
//! - A core entity table plus an open-ended set of typed attributes per room
//! - Lazy attribute-name resolution with create-on-first-use definitions
//! - Typed, nested `Room` aggregates folded back out of flat value rows
//! - Filtered, paginated queries composed by joining the value table once
//!   per filter predicate
//! - SQLite-backed storage behind a single repository facade

pub mod attribute;
pub mod config;
pub mod query;
pub mod room;
pub mod storage;
pub mod ui;
pub mod value;

// Re-exports for convenient access
pub use attribute::{AttributeDefinition, DataType};
pub use room::{Location, NewRoom, Room, RoomFilters, RoomPage, RoomPatch};
pub use storage::RoomRepository;
pub use value::AttributeValue;

/// Result type alias for roomstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for roomstore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Room not found: {0}")]
    NotFound(i64),

    #[error("Attribute '{attribute}' expects a {expected} value")]
    TypeMismatch {
        attribute: String,
        expected: DataType,
    },

    #[error("Unknown data type: {0}")]
    InvalidDataType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
