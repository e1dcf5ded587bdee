// PostgreSQL backend
//
// - config: driver configuration and the bb8 connection manager
// - params: binding `Value`s through tokio-postgres `ToSql`
// - query: reading `Value`s back out of rows
// - executor: translate / prepare / execute, driven from blocking code

pub(crate) mod config;
pub(crate) mod executor;
pub(crate) mod params;
pub(crate) mod query;

pub use config::PgManager;
