// SQLite backend
//
// - config: bb8 connection manager opening `file:` URIs
// - params: binding `Value`s as rusqlite parameters
// - query: reading `Value`s back out of rows
// - executor: prepare / bind / execute / finalize

pub(crate) mod config;
pub(crate) mod executor;
pub(crate) mod params;
pub(crate) mod query;

pub use config::SqliteManager;
