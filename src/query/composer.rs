//! Query composer - dynamic join-per-filter SQL construction
//!
//! Builds a count query and a list query from a filter set. Entity-level
//! predicates stay on the `e` alias; every attribute-level predicate gets
//! its own aliased join against the value table, with the attribute id
//! resolved by an inline subselect on the bound attribute name. The join
//! structure is identical between the two queries, otherwise the reported
//! total would disagree with the page contents.

use crate::attribute;
use crate::room::RoomFilters;
use rusqlite::types::Value as SqlValue;

/// Columns projected for every entity read
pub(crate) const ENTITY_COLUMNS: &str = "e.id, e.name, e.is_active, e.created_at, e.updated_at";

/// A composed pair of count and list queries sharing one parameter set
#[derive(Debug)]
pub struct ComposedQuery {
    pub count_sql: String,
    pub list_sql: String,
    /// Join parameters followed by predicate parameters, in SQL order
    pub params: Vec<SqlValue>,
    limit: usize,
    offset: usize,
}

impl ComposedQuery {
    /// Parameters for the list query: shared params plus LIMIT/OFFSET
    pub fn list_params(&self) -> Vec<SqlValue> {
        let mut params = self.params.clone();
        params.push(SqlValue::Integer(self.limit as i64));
        params.push(SqlValue::Integer(self.offset as i64));
        params
    }
}

/// Build the count and list queries for a filter set.
///
/// Pages are 1-indexed; out-of-range page/limit values are clamped rather
/// than rejected.
pub fn compose(filters: &RoomFilters, page: usize, limit: usize) -> ComposedQuery {
    let limit = limit.max(1);
    let offset = (page.max(1) - 1) * limit;

    let mut joins = String::new();
    let mut predicates = String::from("1=1");
    let mut join_params: Vec<SqlValue> = Vec::new();
    let mut where_params: Vec<SqlValue> = Vec::new();
    let mut alias_counter = 0usize;

    if let Some(active) = filters.is_active {
        predicates.push_str(" AND e.is_active = ?");
        where_params.push(SqlValue::Integer(active as i64));
    }

    if let Some(room_type) = &filters.room_type {
        let alias = attribute_join(
            &mut joins,
            &mut join_params,
            &mut alias_counter,
            "JOIN",
            attribute::ROOM_TYPE,
        );
        predicates.push_str(&format!(" AND {alias}.value_string = ?"));
        where_params.push(SqlValue::Text(room_type.clone()));
    }

    if let Some(building) = &filters.building {
        let alias = attribute_join(
            &mut joins,
            &mut join_params,
            &mut alias_counter,
            "JOIN",
            attribute::BUILDING,
        );
        predicates.push_str(&format!(" AND {alias}.value_string = ?"));
        where_params.push(SqlValue::Text(building.clone()));
    }

    if let Some(min_capacity) = filters.min_capacity {
        let alias = attribute_join(
            &mut joins,
            &mut join_params,
            &mut alias_counter,
            "JOIN",
            attribute::CAPACITY,
        );
        predicates.push_str(&format!(" AND {alias}.value_number >= ?"));
        where_params.push(SqlValue::Real(min_capacity));
    }

    if let Some(term) = &filters.search {
        let pattern = format!("%{}%", term);
        let mut clauses = vec!["e.name LIKE ?".to_string()];
        where_params.push(SqlValue::Text(pattern.clone()));

        // LEFT JOIN: a room without the attribute can still match on name
        for searchable in attribute::SEARCHABLE {
            let alias = attribute_join(
                &mut joins,
                &mut join_params,
                &mut alias_counter,
                "LEFT JOIN",
                searchable,
            );
            clauses.push(format!("{alias}.value_string LIKE ?"));
            where_params.push(SqlValue::Text(pattern.clone()));
        }

        predicates.push_str(&format!(" AND ({})", clauses.join(" OR ")));
    }

    let count_sql = format!(
        "SELECT COUNT(DISTINCT e.id) FROM entities e{joins} WHERE {predicates}"
    );
    let list_sql = format!(
        "SELECT DISTINCT {ENTITY_COLUMNS} FROM entities e{joins} WHERE {predicates} \
         ORDER BY e.created_at DESC, e.id DESC LIMIT ? OFFSET ?"
    );

    let mut params = join_params;
    params.extend(where_params);

    ComposedQuery {
        count_sql,
        list_sql,
        params,
        limit,
        offset,
    }
}

/// Append a dedicated aliased join for one attribute-level predicate.
///
/// The attribute name is bound, never spliced into the SQL text.
fn attribute_join(
    joins: &mut String,
    join_params: &mut Vec<SqlValue>,
    alias_counter: &mut usize,
    join_kind: &str,
    attribute_name: &str,
) -> String {
    *alias_counter += 1;
    let alias = format!("v{}", alias_counter);
    joins.push_str(&format!(
        " {join_kind} entity_values {alias} ON {alias}.entity_id = e.id \
         AND {alias}.attribute_id = (SELECT id FROM attributes WHERE name = ? LIMIT 1)"
    ));
    join_params.push(SqlValue::Text(attribute_name.to_string()));
    alias
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_keep_tautology() {
        let query = compose(&RoomFilters::default(), 1, 10);

        assert!(query.count_sql.ends_with("WHERE 1=1"));
        assert!(!query.list_sql.contains("JOIN"));
        assert!(query.params.is_empty());
        assert_eq!(
            query.list_params(),
            vec![SqlValue::Integer(10), SqlValue::Integer(0)]
        );
    }

    #[test]
    fn test_one_join_per_attribute_filter() {
        let filters = RoomFilters {
            room_type: Some("Lab".to_string()),
            building: Some("Science Hall".to_string()),
            min_capacity: Some(30.0),
            ..RoomFilters::default()
        };
        let query = compose(&filters, 1, 10);

        assert_eq!(query.list_sql.matches("JOIN entity_values").count(), 3);
        assert!(query.list_sql.contains("v1.value_string = ?"));
        assert!(query.list_sql.contains("v3.value_number >= ?"));
        // 3 join params (attribute names) + 3 predicate params
        assert_eq!(query.params.len(), 6);
        assert_eq!(query.params[0], SqlValue::Text("room_type".to_string()));
        assert_eq!(query.params[3], SqlValue::Text("Lab".to_string()));
    }

    #[test]
    fn test_count_and_list_share_join_structure() {
        let filters = RoomFilters {
            search: Some("physics".to_string()),
            is_active: Some(true),
            ..RoomFilters::default()
        };
        let query = compose(&filters, 1, 10);

        let count_joins: Vec<_> = query.count_sql.match_indices("JOIN entity_values").collect();
        let list_joins: Vec<_> = query.list_sql.match_indices("JOIN entity_values").collect();
        assert_eq!(count_joins.len(), list_joins.len());

        let where_of = |sql: &str| sql[sql.find("WHERE").unwrap()..].to_string();
        assert_eq!(
            where_of(&query.count_sql),
            where_of(&query.list_sql)
                .replace(" ORDER BY e.created_at DESC, e.id DESC LIMIT ? OFFSET ?", "")
        );
    }

    #[test]
    fn test_search_uses_left_joins_and_or_clauses() {
        let query = compose(&RoomFilters::search_term("b2"), 1, 10);

        assert_eq!(query.list_sql.matches("LEFT JOIN entity_values").count(), 2);
        assert!(query.list_sql.contains("e.name LIKE ?"));
        assert!(query.list_sql.contains(" OR v1.value_string LIKE ?"));
        // 2 join params + 3 LIKE patterns
        assert_eq!(query.params.len(), 5);
        assert_eq!(query.params[2], SqlValue::Text("%b2%".to_string()));
    }

    #[test]
    fn test_offset_from_one_indexed_page() {
        let query = compose(&RoomFilters::default(), 3, 25);
        assert_eq!(
            query.list_params(),
            vec![SqlValue::Integer(25), SqlValue::Integer(50)]
        );

        // page 0 clamps to the first page
        let query = compose(&RoomFilters::default(), 0, 25);
        assert_eq!(
            query.list_params(),
            vec![SqlValue::Integer(25), SqlValue::Integer(0)]
        );
    }

    #[test]
    fn test_active_filter_is_entity_level() {
        let query = compose(
            &RoomFilters {
                is_active: Some(false),
                ..RoomFilters::default()
            },
            1,
            10,
        );

        assert!(!query.list_sql.contains("JOIN"));
        assert!(query.list_sql.contains("e.is_active = ?"));
        assert_eq!(query.params, vec![SqlValue::Integer(0)]);
    }
}
