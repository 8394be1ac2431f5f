//! SQL utilities for table mappings
//!
//! Provides statement generation, identifier validation, and filter building.

pub mod condition;
pub mod ddl;
pub mod dml;
pub mod sanitize;

pub use condition::build_where_clause;
pub use ddl::DdlGenerator;
pub use dml::{SelectParts, build_delete, build_insert, build_select, build_select_all};
pub use sanitize::{SQLITE_RESERVED_WORDS, validate_identifier};
