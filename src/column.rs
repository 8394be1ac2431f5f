//! Column descriptors
//!
//! A `Column<T>` describes one table column of entity `T`: its name, the DDL
//! type fragment, and the two conversions between a field of `T` and the
//! stored value.

use std::fmt;
use std::sync::Arc;

use crate::error::{DaoError, Result};
use crate::types::{ColumnValue, SqlValue};

type ToValueFn<T> = dyn Fn(&T) -> SqlValue + Send + Sync;
type FromValueFn<T> = dyn Fn(&mut T, SqlValue) -> std::result::Result<(), String> + Send + Sync;

/// Describes a single column and how it maps onto a field of `T`
pub struct Column<T> {
    name: String,
    sql_type: String,
    to_value: Arc<ToValueFn<T>>,
    from_value: Arc<FromValueFn<T>>,
}

impl<T: 'static> Column<T> {
    /// Create a column from raw conversion closures.
    ///
    /// `from_value` is never invoked with `SqlValue::Null`.
    pub fn new(
        name: impl Into<String>,
        sql_type: impl Into<String>,
        to_value: impl Fn(&T) -> SqlValue + Send + Sync + 'static,
        from_value: impl Fn(&mut T, SqlValue) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            to_value: Arc::new(to_value),
            from_value: Arc::new(from_value),
        }
    }

    /// Create a column bound to a typed field through a getter and a setter
    ///
    /// # Example
    /// ```
    /// use table_dao::Column;
    ///
    /// #[derive(Default)]
    /// struct Tag {
    ///     label: String,
    /// }
    ///
    /// let column = Column::field(
    ///     "label",
    ///     "text",
    ///     |t: &Tag| t.label.clone(),
    ///     |t: &mut Tag, v| t.label = v,
    /// );
    /// assert_eq!(column.name(), "label");
    /// ```
    pub fn field<V: ColumnValue + 'static>(
        name: impl Into<String>,
        sql_type: impl Into<String>,
        getter: impl Fn(&T) -> V + Send + Sync + 'static,
        setter: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            name,
            sql_type,
            move |obj| getter(obj).to_sql(),
            move |obj, value| {
                setter(obj, V::from_sql(value)?);
                Ok(())
            },
        )
    }
}

impl<T> Column<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// DDL type fragment, used verbatim in `create table`
    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    /// Read this column's value out of `obj`
    pub fn populate_content(&self, obj: &T) -> SqlValue {
        (self.to_value)(obj)
    }

    /// Write a stored value back into `obj`. NULL leaves the field as is.
    pub fn populate_object(&self, obj: &mut T, value: SqlValue) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        (self.from_value)(obj, value).map_err(|message| DaoError::conversion(&self.name, message))
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            sql_type: self.sql_type.clone(),
            to_value: Arc::clone(&self.to_value),
            from_value: Arc::clone(&self.from_value),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("sql_type", &self.sql_type)
            .finish_non_exhaustive()
    }
}
