//! Core value types exchanged with the store
//!
//! `SqlValue` mirrors SQLite's storage classes. `ColumnValue` converts Rust
//! field types to and from it and is the only place type-specific logic lives.

use chrono::{DateTime, Utc};

/// A single cell value as stored by SQLite
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Storage class name, used in conversion error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Integer(_) => "INTEGER",
            SqlValue::Real(_) => "REAL",
            SqlValue::Text(_) => "TEXT",
            SqlValue::Blob(_) => "BLOB",
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(value as i64)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(value as i64)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

/// A Rust type that can be stored in a single column.
///
/// `from_sql` is never called with `SqlValue::Null`; NULL leaves the target
/// field untouched.
pub trait ColumnValue: Sized {
    fn to_sql(&self) -> SqlValue;

    fn from_sql(value: SqlValue) -> Result<Self, String>;
}

fn mismatch(expected: &str, value: &SqlValue) -> String {
    format!("expected {}, found {}", expected, value.type_name())
}

impl ColumnValue for i64 {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Integer(*self)
    }

    fn from_sql(value: SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Integer(v) => Ok(v),
            SqlValue::Text(ref s) => s.trim().parse().map_err(|_| mismatch("integer", &value)),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl ColumnValue for i32 {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Integer(*self as i64)
    }

    fn from_sql(value: SqlValue) -> Result<Self, String> {
        let wide = i64::from_sql(value)?;
        i32::try_from(wide).map_err(|_| format!("integer {} out of range for i32", wide))
    }
}

impl ColumnValue for bool {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Integer(*self as i64)
    }

    fn from_sql(value: SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Integer(v) => Ok(v != 0),
            SqlValue::Text(ref s) => match s.to_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(mismatch("boolean", &value)),
            },
            other => Err(mismatch("boolean", &other)),
        }
    }
}

/// SQLite has no NaN: a NaN is written as NULL, and reading that NULL back
/// leaves the field at whatever the factory gave it.
impl ColumnValue for f64 {
    fn to_sql(&self) -> SqlValue {
        if self.is_nan() {
            SqlValue::Null
        } else {
            SqlValue::Real(*self)
        }
    }

    fn from_sql(value: SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Real(v) => Ok(v),
            SqlValue::Integer(v) => Ok(v as f64),
            other => Err(mismatch("real", &other)),
        }
    }
}

impl ColumnValue for String {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn from_sql(value: SqlValue) -> Result<Self, String> {
        // SQLite columns are dynamically typed; numbers read back as text
        match value {
            SqlValue::Text(s) => Ok(s),
            SqlValue::Integer(v) => Ok(v.to_string()),
            SqlValue::Real(v) => Ok(v.to_string()),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl ColumnValue for Vec<u8> {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Blob(self.clone())
    }

    fn from_sql(value: SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Blob(b) => Ok(b),
            SqlValue::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch("blob", &other)),
        }
    }
}

impl ColumnValue for DateTime<Utc> {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.to_rfc3339())
    }

    fn from_sql(value: SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| format!("invalid timestamp '{}': {}", s, e)),
            SqlValue::Integer(secs) => DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| format!("timestamp {} out of range", secs)),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

impl ColumnValue for serde_json::Value {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }

    fn from_sql(value: SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Text(s) => serde_json::from_str(&s).map_err(|e| e.to_string()),
            SqlValue::Integer(v) => Ok(serde_json::Value::from(v)),
            SqlValue::Real(v) => Ok(serde_json::Value::from(v)),
            other => Err(mismatch("json", &other)),
        }
    }
}

impl<V: ColumnValue> ColumnValue for Option<V> {
    fn to_sql(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql(),
            None => SqlValue::Null,
        }
    }

    fn from_sql(value: SqlValue) -> Result<Self, String> {
        V::from_sql(value).map(Some)
    }
}
