//! Database schema definitions

/// SQL to create the entities table
pub const CREATE_ENTITIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the attributes table
///
/// Concurrent get-or-create resolution relies on the UNIQUE name
/// constraint to reject the losing insert.
pub const CREATE_ATTRIBUTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS attributes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    data_type TEXT NOT NULL
)
"#;

/// SQL to create the entity_values table
///
/// One row per (entity, attribute); a second write replaces the row via
/// upsert rather than inserting a duplicate. Deleting an entity cascades
/// its value rows.
pub const CREATE_ENTITY_VALUES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entity_values (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_id INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    attribute_id INTEGER NOT NULL REFERENCES attributes(id),
    value_string TEXT,
    value_number REAL,
    value_text TEXT,
    value_boolean INTEGER,
    value_date TEXT,
    UNIQUE(entity_id, attribute_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_values_entity ON entity_values(entity_id)",
    "CREATE INDEX IF NOT EXISTS idx_values_attribute ON entity_values(attribute_id)",
    "CREATE INDEX IF NOT EXISTS idx_entities_created ON entities(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_entities_active ON entities(is_active)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_ENTITIES_TABLE,
        CREATE_ATTRIBUTES_TABLE,
        CREATE_ENTITY_VALUES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
