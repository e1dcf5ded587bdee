//! Fluent SQL statement building with blocking and asynchronous execution over pooled
//! Postgres and `SQLite` connections.
//!
//! ```rust,no_run
//! use sql_wrapper::prelude::*;
//!
//! # fn main() -> Result<(), DatabaseError> {
//! let users = TableSchema::new("users")
//!     .column(Column::builder("id", ColumnType::Integer).not_null().build())
//!     .column(Column::builder("name", ColumnType::Text).build())
//!     .option("PRIMARY KEY (id)");
//!
//! let mut db = Database::new();
//! db.connect(Database::configure().backend(Backend::Sqlite).name("app.db"))?;
//! db.create_table(&users)?;
//!
//! Statement::new()
//!     .insert_into(&users)
//!     .of(" (id, name)")
//!     .values(2)
//!     .replacements(params![1, "ada"])
//!     .execute_update(&db)?;
//!
//! let name = Statement::new()
//!     .select_from(&users, &["name"])
//!     .where_clause()
//!     .equals("id")
//!     .replacements(params![1])
//!     .execute_query(&db, |cursor| {
//!         cursor.next()?;
//!         cursor.get_string("name")
//!     })?;
//! assert_eq!(name, "ada");
//! # Ok(()) }
//! ```

#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
compile_error!("enable at least one backend feature: `postgres` or `sqlite`");

pub mod config;
pub mod error;
pub mod executor;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod schema;
pub mod statement;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "test-utils-postgres")]
pub mod test_utils;

mod worker;

pub use config::{AsyncFailurePolicy, Backend, ConnectOptions, DatabaseConfig, PoolSettings};
pub use error::{DatabaseError, DriverError};
pub use executor::AsyncResult;
pub use pool::{ConnectionPool, Database, DbConnection, PoolStatus};
pub use results::{FromValue, ResultCursor};
pub use statement::Statement;
pub use types::Value;
