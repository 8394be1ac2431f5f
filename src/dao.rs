//! TableDao - generic column-mapped access to a single table
//!
//! A `TableDao<T>` owns a table name and an ordered list of column
//! descriptors. It synthesizes statement text from those descriptors, runs
//! it against a bound SQLite pool, and turns result rows back into `T` using
//! the same descriptors.

use futures::TryStreamExt;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Row, Sqlite, TypeInfo, ValueRef};
use std::sync::Arc;

use crate::column::Column;
use crate::error::{DaoError, Result};
use crate::listener::{ChangeListener, ListenerRegistry};
use crate::query::{Filter, Query as ReadQuery};
use crate::sql::condition::build_where_clause;
use crate::sql::ddl::DdlGenerator;
use crate::sql::dml::{SelectParts, build_delete, build_insert, build_select, build_select_all};
use crate::sql::sanitize::validate_identifier;
use crate::types::SqlValue;

/// A type that can be materialized from table rows.
///
/// The mapping allocates every object through `create_new_object` and then
/// fills it column by column, so this is the only thing a new entity type has
/// to provide.
pub trait Entity: Sized + Send + Sync + 'static {
    fn create_new_object() -> Self;
}

/// Column-mapped access to one table
pub struct TableDao<T> {
    name: String,
    columns: Vec<Column<T>>,
    pool: Option<SqlitePool>,
    listeners: ListenerRegistry,
}

/// A SELECT ready to execute, with the descriptors for each result position
struct PreparedSelect<'a, T> {
    sql: String,
    params: Vec<SqlValue>,
    projection: Vec<&'a Column<T>>,
}

impl<T: Entity> TableDao<T> {
    /// Create an unbound mapping with no columns
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_identifier(&name)
            .map_err(|e| DaoError::configuration(format!("Invalid table name: {}", e)))?;

        Ok(Self {
            name,
            columns: Vec::new(),
            pool: None,
            listeners: ListenerRegistry::new(),
        })
    }

    /// Create a mapping and register `columns` in order
    pub fn with_columns(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = Column<T>>,
    ) -> Result<Self> {
        let mut dao = Self::new(name)?;
        for column in columns {
            dao.register_column(column)?;
        }
        Ok(dao)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered columns in registration order
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Append a column. Names must be valid identifiers and unique.
    pub fn register_column(&mut self, column: Column<T>) -> Result<()> {
        validate_identifier(column.name()).map_err(|e| {
            DaoError::configuration(format!("Invalid column on table '{}': {}", self.name, e))
        })?;

        if self.column(column.name()).is_some() {
            return Err(DaoError::configuration(format!(
                "Column '{}' is already registered on table '{}'",
                column.name(),
                self.name
            )));
        }

        self.columns.push(column);
        Ok(())
    }

    /// Associate the mapping with a live pool. Replaces any earlier binding.
    pub fn bind_connection(&mut self, pool: SqlitePool) {
        self.pool = Some(pool);
    }

    pub fn is_bound(&self) -> bool {
        self.pool.is_some()
    }

    /// The bound pool, or a configuration error if nothing is bound yet
    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool.as_ref().ok_or_else(|| {
            DaoError::configuration(format!(
                "Table '{}' is not bound to a connection; call bind_connection first",
                self.name
            ))
        })
    }

    // =========================================================================
    // Statement text
    // =========================================================================

    /// `create table <name> (<col> <type>,...);` in registration order
    pub fn create_table_statement(&self) -> Result<String> {
        self.ensure_columns()?;
        Ok(DdlGenerator::new(&self.name).generate_create_table(&self.columns))
    }

    /// `select <col>,... from <name>`
    pub fn select_all_statement(&self) -> Result<String> {
        self.ensure_columns()?;
        let names: Vec<&str> = self.columns.iter().map(|c| c.name()).collect();
        Ok(build_select_all(&self.name, &names))
    }

    /// `DROP TABLE IF EXISTS <name>`
    pub fn drop_table_statement(&self) -> String {
        DdlGenerator::new(&self.name).generate_drop_table()
    }

    // =========================================================================
    // DDL execution
    // =========================================================================

    pub async fn create_table(&self) -> Result<()> {
        let sql = self.create_table_statement()?;
        let pool = self.pool()?;

        tracing::debug!(table = %self.name, sql = %sql, "creating table");
        sqlx::query(&sql)
            .execute(pool)
            .await
            .map_err(DaoError::Persistence)?;
        Ok(())
    }

    /// Drop the table. Succeeds when the table does not exist.
    pub async fn drop_table(&self) -> Result<()> {
        let sql = self.drop_table_statement();
        let pool = self.pool()?;

        tracing::debug!(table = %self.name, sql = %sql, "dropping table");
        sqlx::query(&sql)
            .execute(pool)
            .await
            .map_err(DaoError::Persistence)?;
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn create_new_object(&self) -> T {
        T::create_new_object()
    }

    /// Run `query` and materialize every row. No match gives an empty `Vec`.
    pub async fn query_for_list(&self, query: &ReadQuery) -> Result<Vec<T>> {
        let pool = self.pool()?;
        let select = self.prepare_select(query)?;

        tracing::debug!(table = %self.name, sql = %select.sql, "query for list");
        let mut rows = bind_all(sqlx::query(&select.sql), select.params).fetch(pool);

        let mut objects = Vec::new();
        while let Some(row) = rows.try_next().await? {
            objects.push(self.materialize(&row, &select.projection)?);
        }
        Ok(objects)
    }

    /// Run `query` expecting at most one row.
    ///
    /// Returns `Ok(None)` when nothing matches and
    /// `DaoError::MultipleResults` when more than one row matches. Any
    /// `order_by` on the query is ignored.
    pub async fn query_for_object(&self, query: &ReadQuery) -> Result<Option<T>> {
        let pool = self.pool()?;
        let select = self.prepare_select(&query.without_order())?;

        tracing::debug!(table = %self.name, sql = %select.sql, "query for object");
        let mut rows = bind_all(sqlx::query(&select.sql), select.params).fetch(pool);

        let Some(first) = rows.try_next().await? else {
            return Ok(None);
        };
        if rows.try_next().await?.is_some() {
            return Err(DaoError::multiple_results(&self.name));
        }
        drop(rows);

        self.materialize(&first, &select.projection).map(Some)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Persist `obj` as a new row and return the store-assigned row id.
    ///
    /// Every registered column contributes a value. Listeners are notified
    /// after the row is written; if any of them fail the row stays and the
    /// error carries its id.
    pub async fn insert(&self, obj: &T) -> Result<i64> {
        let pool = self.pool()?;
        self.ensure_columns()?;

        let names: Vec<&str> = self.columns.iter().map(|c| c.name()).collect();
        let values: Vec<SqlValue> = self
            .columns
            .iter()
            .map(|c| c.populate_content(obj))
            .collect();
        let sql = build_insert(&self.name, &names);

        tracing::debug!(table = %self.name, sql = %sql, "inserting row");
        let result = bind_all(sqlx::query(&sql), values)
            .execute(pool)
            .await
            .map_err(DaoError::Persistence)?;

        let row_id = result.last_insert_rowid();
        self.notify(Some(row_id))?;
        Ok(row_id)
    }

    /// Delete every row matching `filter` (all rows for an empty filter)
    /// and return how many were removed.
    pub async fn delete(&self, filter: &Filter) -> Result<u64> {
        let pool = self.pool()?;
        self.check_filter(filter)?;

        let (where_clause, params) = build_where_clause(filter).unzip();
        let sql = build_delete(&self.name, where_clause.as_deref());

        tracing::debug!(table = %self.name, sql = %sql, "deleting rows");
        let result = bind_all(sqlx::query(&sql), params.unwrap_or_default())
            .execute(pool)
            .await
            .map_err(DaoError::Persistence)?;

        self.notify(None)?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Change listeners
    // =========================================================================

    pub fn subscribe(&mut self, listener: Arc<dyn ChangeListener>) {
        self.listeners.subscribe(listener);
    }

    /// Returns `false` if the listener was not subscribed
    pub fn unsubscribe(&mut self, listener: &Arc<dyn ChangeListener>) -> bool {
        self.listeners.unsubscribe(listener)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Tell every listener the table changed
    pub fn notify_data_set_changed(&self) -> Result<()> {
        self.notify(None)
    }

    fn notify(&self, row_id: Option<i64>) -> Result<()> {
        let failures = self.listeners.notify_changed(&self.name);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DaoError::ListenerNotification {
                table: self.name.clone(),
                row_id,
                failures,
            })
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn ensure_columns(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(DaoError::configuration(format!(
                "Table '{}' has no registered columns",
                self.name
            )));
        }
        Ok(())
    }

    fn registered(&self, name: &str) -> Result<&Column<T>> {
        self.column(name).ok_or_else(|| {
            DaoError::configuration(format!(
                "Column '{}' is not registered on table '{}'",
                name, self.name
            ))
        })
    }

    fn check_filter(&self, filter: &Filter) -> Result<()> {
        for name in filter.columns() {
            self.registered(name)?;
        }
        Ok(())
    }

    fn prepare_select(&self, query: &ReadQuery) -> Result<PreparedSelect<'_, T>> {
        self.ensure_columns()?;

        let projection: Vec<&Column<T>> = if query.projection().is_empty() {
            self.columns.iter().collect()
        } else {
            query
                .projection()
                .iter()
                .map(|name| self.registered(name))
                .collect::<Result<_>>()?
        };
        self.check_filter(query.filter_ref())?;

        if query.having_clause().is_some() && query.group_by_clause().is_none() {
            return Err(DaoError::configuration(
                "HAVING clauses are only permitted when using a GROUP BY clause",
            ));
        }

        let (where_clause, params) = build_where_clause(query.filter_ref()).unzip();
        let names: Vec<&str> = projection.iter().map(|c| c.name()).collect();
        let sql = build_select(
            &self.name,
            &names,
            SelectParts {
                where_clause: where_clause.as_deref(),
                group_by: query.group_by_clause(),
                having: query.having_clause(),
                order_by: query.order_by_clause(),
            },
        );

        Ok(PreparedSelect {
            sql,
            params: params.unwrap_or_default(),
            projection,
        })
    }

    fn materialize(&self, row: &SqliteRow, projection: &[&Column<T>]) -> Result<T> {
        let mut obj = self.create_new_object();
        for (index, column) in projection.iter().enumerate() {
            let value = decode_value(row, index)?;
            column.populate_object(&mut obj, value)?;
        }
        Ok(obj)
    }
}

impl<T> std::fmt::Debug for TableDao<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableDao")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("bound", &self.pool.is_some())
            .field("listeners", &self.listeners)
            .finish()
    }
}

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_all(query: SqliteQuery<'_>, values: Vec<SqlValue>) -> SqliteQuery<'_> {
    values.into_iter().fold(query, bind_value)
}

fn bind_value(query: SqliteQuery<'_>, value: SqlValue) -> SqliteQuery<'_> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Integer(v) => query.bind(v),
        SqlValue::Real(v) => query.bind(v),
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Blob(v) => query.bind(v),
    }
}

/// Read one result cell using its runtime storage class
fn decode_value(row: &SqliteRow, index: usize) -> Result<SqlValue> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let type_name = raw.type_info().name().to_string();

    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get::<i64, _>(index)?),
        "REAL" => SqlValue::Real(row.try_get::<f64, _>(index)?),
        "BLOB" => SqlValue::Blob(row.try_get::<Vec<u8>, _>(index)?),
        _ => SqlValue::Text(row.try_get::<String, _>(index)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Note {
        id: Option<i64>,
        title: String,
        score: f64,
        body: Option<Vec<u8>>,
    }

    impl Entity for Note {
        fn create_new_object() -> Self {
            Self::default()
        }
    }

    fn note_columns() -> Vec<Column<Note>> {
        vec![
            Column::field("id", "integer primary key", |n: &Note| n.id, |n: &mut Note, v| n.id = v),
            Column::field("title", "text", |n: &Note| n.title.clone(), |n: &mut Note, v| n.title = v),
            Column::field("score", "real", |n: &Note| n.score, |n: &mut Note, v| n.score = v),
            Column::field("body", "blob", |n: &Note| n.body.clone(), |n: &mut Note, v| n.body = v),
        ]
    }

    async fn bound_notes() -> TableDao<Note> {
        let mut dao = TableDao::with_columns("notes", note_columns()).unwrap();
        dao.bind_connection(StoreConfig::in_memory().connect().await.unwrap());
        dao.create_table().await.unwrap();
        dao
    }

    #[test]
    fn test_statements() {
        let dao = TableDao::with_columns("notes", note_columns()).unwrap();

        assert_eq!(
            dao.create_table_statement().unwrap(),
            "create table notes (id integer primary key,title text,score real,body blob);"
        );
        assert_eq!(
            dao.select_all_statement().unwrap(),
            "select id,title,score,body from notes"
        );
        assert_eq!(dao.drop_table_statement(), "DROP TABLE IF EXISTS notes");
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut dao = TableDao::with_columns("notes", note_columns()).unwrap();
        let err = dao.register_column(note_columns().remove(1)).unwrap_err();

        assert!(matches!(err, DaoError::Configuration(ref m) if m.contains("already registered")));
        assert_eq!(dao.columns().len(), 4);
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(TableDao::<Note>::new("drop").is_err());
        assert!(TableDao::<Note>::new("notes; --").is_err());

        let mut dao = TableDao::<Note>::new("notes").unwrap();
        let bad = Column::field("order", "text", |n: &Note| n.title.clone(), |n: &mut Note, v| n.title = v);
        assert!(dao.register_column(bad).is_err());
    }

    #[test]
    fn test_zero_columns_rejected() {
        let dao = TableDao::<Note>::new("notes").unwrap();
        assert!(matches!(
            dao.create_table_statement(),
            Err(DaoError::Configuration(_))
        ));
        assert!(matches!(
            dao.select_all_statement(),
            Err(DaoError::Configuration(_))
        ));
    }

    #[test]
    fn test_prepare_select_projection_and_filter() {
        let dao = TableDao::with_columns("notes", note_columns()).unwrap();
        let query = ReadQuery::new()
            .columns(["title", "id"])
            .where_eq("title", "a")
            .order_by("id");

        let select = dao.prepare_select(&query).unwrap();

        assert_eq!(select.sql, "SELECT title,id FROM notes WHERE title=? ORDER BY id");
        assert_eq!(select.params, vec![SqlValue::Text("a".to_string())]);
        let names: Vec<&str> = select.projection.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["title", "id"]);
    }

    #[test]
    fn test_prepare_select_rejects_unknown_columns() {
        let dao = TableDao::with_columns("notes", note_columns()).unwrap();

        let projection = ReadQuery::new().columns(["missing"]);
        assert!(matches!(
            dao.prepare_select(&projection),
            Err(DaoError::Configuration(ref m)) if m.contains("'missing'")
        ));

        let filter = ReadQuery::new().where_eq("missing", 1i64);
        assert!(dao.prepare_select(&filter).is_err());
    }

    #[test]
    fn test_having_requires_group_by() {
        let dao = TableDao::with_columns("notes", note_columns()).unwrap();
        let query = ReadQuery::new().having("count(*) > 1");
        assert!(matches!(
            dao.prepare_select(&query),
            Err(DaoError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_unbound_mapping_fails_fast() {
        let dao = TableDao::with_columns("notes", note_columns()).unwrap();

        assert!(!dao.is_bound());
        assert!(matches!(
            dao.query_for_list(&ReadQuery::new()).await,
            Err(DaoError::Configuration(_))
        ));
        assert!(matches!(
            dao.insert(&Note::default()).await,
            Err(DaoError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_round_trip_all_storage_classes() {
        let dao = bound_notes().await;
        let note = Note {
            id: None,
            title: "groceries".to_string(),
            score: 2.5,
            body: Some(vec![0, 159, 146, 150]),
        };

        let id = dao.insert(&note).await.unwrap();
        let stored = dao
            .query_for_object(&ReadQuery::new().where_eq("id", id))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stored, Note { id: Some(id), ..note });
    }

    #[tokio::test]
    async fn test_null_column_keeps_default() {
        let dao = bound_notes().await;
        dao.insert(&Note {
            title: "empty".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let stored = dao
            .query_for_object(&ReadQuery::new().where_eq("title", "empty"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.body, None);
    }

    #[tokio::test]
    async fn test_projection_only_populates_selected_columns() {
        let dao = bound_notes().await;
        dao.insert(&Note {
            title: "partial".to_string(),
            score: 9.0,
            ..Default::default()
        })
        .await
        .unwrap();

        let notes = dao
            .query_for_list(&ReadQuery::new().columns(["title"]))
            .await
            .unwrap();

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "partial");
        assert_eq!(notes[0].score, 0.0);
        assert_eq!(notes[0].id, None);
    }

    #[tokio::test]
    async fn test_malformed_fragment_is_store_error() {
        let dao = bound_notes().await;
        let err = dao
            .query_for_list(&ReadQuery::new().order_by("nonexistent_col +"))
            .await
            .unwrap_err();
        assert!(matches!(err, DaoError::Sql(_)));
    }

    #[tokio::test]
    async fn test_delete_with_filter() {
        let dao = bound_notes().await;
        for title in ["a", "b", "b"] {
            dao.insert(&Note {
                title: title.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let removed = dao.delete(&Filter::new().eq("title", "b")).await.unwrap();
        assert_eq!(removed, 2);

        let remaining = dao.query_for_list(&ReadQuery::new()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "a");

        assert_eq!(dao.delete(&Filter::new()).await.unwrap(), 1);
    }
}
