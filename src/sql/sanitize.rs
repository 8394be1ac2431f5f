//! SQL identifier validation
//!
//! Generated statements embed table and column names unquoted, so every
//! identifier is checked once, at registration time.

use std::sync::LazyLock;

use regex::Regex;

/// SQLite keywords that cannot be used as unquoted identifiers
///
/// Keywords the SQLite parser falls back to plain identifiers for (`key`,
/// `action`, `row`, `temp`, ...) are accepted. `CURRENT_*` stay here because
/// in an expression they evaluate to the clock, not to a column.
pub const SQLITE_RESERVED_WORDS: &[&str] = &[
    "ADD",
    "ALL",
    "ALTER",
    "AND",
    "AS",
    "AUTOINCREMENT",
    "BETWEEN",
    "CASE",
    "CHECK",
    "COLLATE",
    "COMMIT",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "DEFAULT",
    "DEFERRABLE",
    "DELETE",
    "DISTINCT",
    "DROP",
    "ELSE",
    "ESCAPE",
    "EXCEPT",
    "EXISTS",
    "FOREIGN",
    "FROM",
    "FULL",
    "GROUP",
    "HAVING",
    "IN",
    "INDEX",
    "INDEXED",
    "INNER",
    "INSERT",
    "INTERSECT",
    "INTO",
    "IS",
    "ISNULL",
    "JOIN",
    "LEFT",
    "LIMIT",
    "NATURAL",
    "NOT",
    "NOTNULL",
    "NULL",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "PRIMARY",
    "REFERENCES",
    "RETURNING",
    "RIGHT",
    "SELECT",
    "SET",
    "TABLE",
    "THEN",
    "TO",
    "TRANSACTION",
    "UNION",
    "UNIQUE",
    "UPDATE",
    "USING",
    "VALUES",
    "WHEN",
    "WHERE",
];

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

/// Validate a table or column name
///
/// Rules:
/// - Must start with a letter or underscore (`_id` is a common key name)
/// - Can only contain ASCII letters, numbers, and underscores
/// - Cannot be an SQLite keyword (case-insensitive)
///
/// # Example
/// ```
/// use table_dao::sql::validate_identifier;
///
/// assert!(validate_identifier("apps").is_ok());
/// assert!(validate_identifier("_id").is_ok());
/// assert!(validate_identifier("select").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if !IDENTIFIER_RE.is_match(name) {
        return Err(format!(
            "Identifier '{}' is invalid. Must start with a letter or underscore and contain only letters, numbers, and underscores.",
            name
        ));
    }

    if SQLITE_RESERVED_WORDS.contains(&name.to_uppercase().as_str()) {
        return Err(format!(
            "Identifier '{}' is an SQLite keyword and cannot be used.",
            name
        ));
    }

    Ok(())
}
