//! Query descriptions: equality filters and read requests
//!
//! Both are plain data. Column names are checked against the mapping when the
//! query is executed, before anything reaches the store.

use crate::types::SqlValue;

/// Equality filter: column name to bound value, joined with `and`.
///
/// Setting the same column twice replaces the earlier value; entries keep
/// the order in which columns were first added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    entries: Vec<(String, SqlValue)>,
}

impl Filter {
    /// An empty filter, matching every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column = value`
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn entries(&self) -> &[(String, SqlValue)] {
        &self.entries
    }
}

/// A read request against one mapping
///
/// # Example
/// ```
/// use table_dao::{Filter, Query};
///
/// let query = Query::new()
///     .columns(["package", "name"])
///     .filter(Filter::new().eq("package", "com.x"))
///     .order_by("name");
/// assert_eq!(query.projection(), ["package", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    columns: Vec<String>,
    filter: Filter,
    order_by: Option<String>,
    group_by: Option<String>,
    having: Option<String>,
}

impl Query {
    /// Select every registered column of every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a query with only a filter
    pub fn filtered(filter: Filter) -> Self {
        Self::new().filter(filter)
    }

    /// Project only these columns. Empty means all registered columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Add a single equality condition to the current filter
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.filter.set(column, value);
        self
    }

    /// `ORDER BY` fragment, passed to the store verbatim
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// `GROUP BY` fragment, passed to the store verbatim
    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    /// `HAVING` fragment, passed to the store verbatim; needs `group_by`
    pub fn having(mut self, having: impl Into<String>) -> Self {
        self.having = Some(having.into());
        self
    }

    pub fn projection(&self) -> &[String] {
        &self.columns
    }

    pub fn filter_ref(&self) -> &Filter {
        &self.filter
    }

    pub fn order_by_clause(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn group_by_clause(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    pub fn having_clause(&self) -> Option<&str> {
        self.having.as_deref()
    }

    /// Same query without ordering; single-object reads ignore `order_by`
    pub(crate) fn without_order(&self) -> Self {
        Self {
            order_by: None,
            ..self.clone()
        }
    }
}
