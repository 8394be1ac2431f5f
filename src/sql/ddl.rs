//! DDL generation for mapped tables
//!
//! Statement text is part of the public contract; other components compare
//! it byte for byte.

use crate::column::Column;

/// DDL generator for one table
pub struct DdlGenerator<'a> {
    table: &'a str,
}

impl<'a> DdlGenerator<'a> {
    pub fn new(table: &'a str) -> Self {
        Self { table }
    }

    /// `create table <name> (<col> <type>,<col> <type>,...);`
    ///
    /// Columns appear in the order given. Callers reject an empty column
    /// list before getting here.
    pub fn generate_create_table<T>(&self, columns: &[Column<T>]) -> String {
        let column_defs: Vec<String> = columns
            .iter()
            .map(|c| format!("{} {}", c.name(), c.sql_type()))
            .collect();

        format!("create table {} ({});", self.table, column_defs.join(","))
    }

    /// `DROP TABLE IF EXISTS <name>`
    pub fn generate_drop_table(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlValue;

    struct Row;

    fn column(name: &str, sql_type: &str) -> Column<Row> {
        Column::new(name, sql_type, |_: &Row| SqlValue::Null, |_: &mut Row, _| Ok(()))
    }

    #[test]
    fn test_generate_create_table() {
        let columns = vec![
            column("id", "integer primary key"),
            column("package", "text"),
            column("name", "text"),
        ];

        let ddl = DdlGenerator::new("apps").generate_create_table(&columns);

        assert_eq!(
            ddl,
            "create table apps (id integer primary key,package text,name text);"
        );
    }

    #[test]
    fn test_generate_create_table_single_column() {
        let ddl = DdlGenerator::new("labels").generate_create_table(&[column("label", "text")]);
        assert_eq!(ddl, "create table labels (label text);");
    }

    #[test]
    fn test_generate_drop_table() {
        assert_eq!(
            DdlGenerator::new("apps").generate_drop_table(),
            "DROP TABLE IF EXISTS apps"
        );
    }
}
