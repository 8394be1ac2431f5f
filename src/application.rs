//! Installed-application records and their `apps` table mapping
//!
//! An application is identified by its package and activity name; the
//! platform-facing parts (icons, launching) live outside this crate.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::dao::{Entity, TableDao};
use crate::error::Result;
use crate::query::Query;

/// Separator between package and activity name in a complete name
pub const SEPARATOR: char = '#';

pub const TABLE: &str = "apps";
pub const COL_ID: &str = "id";
pub const COL_PACKAGE: &str = "package";
pub const COL_NAME: &str = "name";
pub const COL_LABEL: &str = "label";
pub const COL_STARRED: &str = "starred";

/// One launchable activity of an installed package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Row id, assigned by the store on insert
    pub id: Option<i64>,
    pub package: String,
    /// Activity class name
    pub name: String,
    pub label: Option<String>,
    pub starred: bool,
}

impl Application {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_starred(mut self, starred: bool) -> Self {
        self.starred = starred;
        self
    }

    /// `package#name`
    pub fn complete_name(&self) -> String {
        format!("{}{}{}", self.package, SEPARATOR, self.name)
    }

    /// Split a complete name back into `(package, name)`
    pub fn split_complete_name(complete_name: &str) -> Option<(&str, &str)> {
        complete_name.split_once(SEPARATOR)
    }

    /// Case-insensitive ordering by label, then package, then name.
    /// A missing label sorts as empty.
    pub fn compare_by_label(&self, other: &Self) -> Ordering {
        fn key(s: &str) -> String {
            s.to_lowercase()
        }

        key(self.label.as_deref().unwrap_or(""))
            .cmp(&key(other.label.as_deref().unwrap_or("")))
            .then_with(|| key(&self.package).cmp(&key(&other.package)))
            .then_with(|| key(&self.name).cmp(&key(&other.name)))
    }
}

impl Entity for Application {
    fn create_new_object() -> Self {
        Self::default()
    }
}

/// Build the unbound `apps` mapping
pub fn application_table() -> Result<TableDao<Application>> {
    TableDao::with_columns(
        TABLE,
        [
            Column::field(
                COL_ID,
                "integer primary key",
                |a: &Application| a.id,
                |a: &mut Application, v| a.id = v,
            ),
            Column::field(
                COL_PACKAGE,
                "text",
                |a: &Application| a.package.clone(),
                |a: &mut Application, v| a.package = v,
            ),
            Column::field(
                COL_NAME,
                "text",
                |a: &Application| a.name.clone(),
                |a: &mut Application, v| a.name = v,
            ),
            Column::field(
                COL_LABEL,
                "text",
                |a: &Application| a.label.clone(),
                |a: &mut Application, v| a.label = v,
            ),
            Column::field(
                COL_STARRED,
                "integer",
                |a: &Application| a.starred,
                |a: &mut Application, v| a.starred = v,
            ),
        ],
    )
}

/// Look up one application by package and activity name
pub async fn find_application(
    dao: &TableDao<Application>,
    package: &str,
    name: &str,
) -> Result<Option<Application>> {
    dao.query_for_object(
        &Query::new()
            .where_eq(COL_PACKAGE, package)
            .where_eq(COL_NAME, name),
    )
    .await
}

/// All applications, sorted with `compare_by_label`
pub async fn list_applications(dao: &TableDao<Application>) -> Result<Vec<Application>> {
    let mut apps = dao.query_for_list(&Query::new()).await?;
    apps.sort_by(Application::compare_by_label);
    Ok(apps)
}
