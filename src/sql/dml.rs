//! Select, insert and delete statement text
//!
//! Clause layout follows SQLite's query builder: optional clauses are omitted
//! entirely when absent, and fragments are inserted verbatim.

/// Clauses of a single-table SELECT
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectParts<'a> {
    pub where_clause: Option<&'a str>,
    pub group_by: Option<&'a str>,
    pub having: Option<&'a str>,
    pub order_by: Option<&'a str>,
}

/// `select <col>,<col>,... from <name>`
pub fn build_select_all<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    format!("select {} from {}", join_columns(columns), table)
}

/// Parameterized SELECT with optional WHERE / GROUP BY / HAVING / ORDER BY
pub fn build_select<S: AsRef<str>>(table: &str, columns: &[S], parts: SelectParts<'_>) -> String {
    let mut sql = format!("SELECT {} FROM {}", join_columns(columns), table);
    append_clause(&mut sql, " WHERE ", parts.where_clause);
    append_clause(&mut sql, " GROUP BY ", parts.group_by);
    append_clause(&mut sql, " HAVING ", parts.having);
    append_clause(&mut sql, " ORDER BY ", parts.order_by);
    sql
}

/// `INSERT INTO <name> (<col>,...) VALUES (?,...)`
pub fn build_insert<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    let placeholders = vec!["?"; columns.len()].join(",");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        join_columns(columns),
        placeholders
    )
}

/// `DELETE FROM <name> [WHERE ...]`
pub fn build_delete(table: &str, where_clause: Option<&str>) -> String {
    let mut sql = format!("DELETE FROM {}", table);
    append_clause(&mut sql, " WHERE ", where_clause);
    sql
}

fn join_columns<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}

fn append_clause(sql: &mut String, keyword: &str, fragment: Option<&str>) {
    if let Some(fragment) = fragment.filter(|f| !f.trim().is_empty()) {
        sql.push_str(keyword);
        sql.push_str(fragment);
    }
}
