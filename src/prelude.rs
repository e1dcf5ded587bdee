//! Convenient imports for common functionality.
//!
//! `use sql_wrapper::prelude::*;` brings in the builder, the pool manager, the schema
//! descriptors and the `params!` macro.

pub use crate::config::{AsyncFailurePolicy, Backend, ConnectOptions, DatabaseConfig, PoolSettings};
pub use crate::error::{DatabaseError, DriverError};
pub use crate::executor::AsyncResult;
pub use crate::params;
pub use crate::pool::{Database, DbConnection, PoolStatus};
pub use crate::results::{FromValue, ResultCursor};
pub use crate::schema::{Column, ColumnName, ColumnType, Table, TableSchema};
pub use crate::statement::Statement;
pub use crate::types::Value;
