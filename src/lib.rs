//! # table-dao
//!
//! Declarative column-mapped access to SQLite tables.
//!
//! A [`TableDao`] maps a typed entity onto one table without code generation.
//! Each [`Column`] carries its name, its DDL type fragment and the two
//! conversions between an entity field and the stored value; the mapping
//! builds statement text from those columns, binds filter values as
//! parameters, and turns result rows back into entities.
//!
//! ## Features
//!
//! - **Column descriptors**: typed getter/setter pairs or raw conversion closures
//! - **Statement synthesis**: `create table`, `select`, `DROP TABLE IF EXISTS`, inserts and deletes
//! - **Equality filters**: always bound as parameters, never inlined
//! - **Single-object reads**: explicit not-found and multiple-results outcomes
//! - **Change listeners**: synchronous fan-out with per-listener failure isolation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use table_dao::{Query, StoreConfig};
//! use table_dao::application::{Application, application_table};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = StoreConfig::builder("sqlite://apps.db").build().connect().await?;
//!
//!     let mut apps = application_table()?;
//!     apps.bind_connection(pool);
//!     apps.drop_table().await?;
//!     apps.create_table().await?;
//!
//!     let id = apps.insert(&Application::new("com.x", "Main")).await?;
//!
//!     let found = apps
//!         .query_for_object(&Query::new().where_eq("package", "com.x").where_eq("name", "Main"))
//!         .await?;
//!     assert_eq!(found.and_then(|a| a.id), Some(id));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! The mapping holds no locks. Reads take `&self` and may run concurrently
//! over the pool; serializing writers is left to the caller, as SQLite allows
//! only one writer at a time.

pub mod application;
pub mod column;
pub mod config;
pub mod dao;
pub mod error;
pub mod listener;
pub mod query;
pub mod sql;
pub mod types;

// Re-export main types for convenience
pub use column::Column;
pub use config::{StoreConfig, StoreConfigBuilder};
pub use dao::{Entity, TableDao};
pub use error::{DaoError, Result};
pub use listener::{ChangeListener, ListenerFailure, ListenerRegistry, ListenerResult};
pub use query::{Filter, Query};
pub use types::{ColumnValue, SqlValue};

pub use sqlx::SqlitePool;
