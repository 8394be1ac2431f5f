//! Condition building for SQL WHERE clauses
//!
//! Converts an equality `Filter` into a WHERE fragment with `?` placeholders
//! plus the values to bind, in placeholder order.

use crate::query::Filter;
use crate::types::SqlValue;

/// Build the WHERE clause for a filter.
///
/// Returns `None` for an empty filter, which matches every row. Values are
/// never embedded in the clause text.
///
/// # Example
/// ```
/// use table_dao::Filter;
/// use table_dao::sql::build_where_clause;
///
/// let filter = Filter::new().eq("package", "com.x").eq("name", "Main");
/// let (clause, params) = build_where_clause(&filter).unwrap();
/// assert_eq!(clause, "package=? and name=?");
/// assert_eq!(params.len(), 2);
/// ```
pub fn build_where_clause(filter: &Filter) -> Option<(String, Vec<SqlValue>)> {
    if filter.is_empty() {
        return None;
    }

    let mut clause = String::new();
    let mut params = Vec::with_capacity(filter.len());

    for (column, value) in filter.entries() {
        if !clause.is_empty() {
            clause.push_str(" and ");
        }
        clause.push_str(column);
        clause.push_str("=?");
        params.push(value.clone());
    }

    Some((clause, params))
}
