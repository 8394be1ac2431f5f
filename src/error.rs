//! Error types for table mapping operations

use thiserror::Error;

use crate::listener::ListenerFailure;

/// Errors that can occur while configuring or using a table mapping
#[derive(Debug, Error)]
pub enum DaoError {
    /// Programming defect: bad column registration, unbound connection,
    /// unknown column in a filter or projection.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Query on table '{table}' returned more than one object")]
    MultipleResults { table: String },

    /// The store rejected a write or DDL statement.
    #[error("Persistence error: {0}")]
    Persistence(#[source] sqlx::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Column '{column}' conversion error: {message}")]
    Conversion { column: String, message: String },

    /// One or more listeners failed after a successful write. The write is
    /// not rolled back.
    #[error("{} listener(s) failed after change on table '{table}'", .failures.len())]
    ListenerNotification {
        table: String,
        row_id: Option<i64>,
        failures: Vec<ListenerFailure>,
    },
}

impl DaoError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn conversion(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn multiple_results(table: impl Into<String>) -> Self {
        Self::MultipleResults {
            table: table.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DaoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = DaoError::configuration("column 'id' already registered");
        assert_eq!(
            err.to_string(),
            "Configuration error: column 'id' already registered"
        );
    }

    #[test]
    fn test_multiple_results_message() {
        let err = DaoError::multiple_results("apps");
        assert_eq!(
            err.to_string(),
            "Query on table 'apps' returned more than one object"
        );
    }

    #[test]
    fn test_listener_notification_message_counts_failures() {
        let err = DaoError::ListenerNotification {
            table: "apps".to_string(),
            row_id: Some(3),
            failures: vec![
                ListenerFailure::new(0, "boom"),
                ListenerFailure::new(2, "bang"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 listener(s) failed after change on table 'apps'"
        );
    }
}
