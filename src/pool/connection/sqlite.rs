use super::{DbConnection, Pooled};

impl DbConnection {
    /// The raw `rusqlite` connection, when this is a `SQLite` connection.
    ///
    /// Useful for what the statement builder doesn't cover, such as pragmas or batches.
    ///
    /// ```rust,no_run
    /// # use sql_wrapper::prelude::*;
    /// # fn demo(db: &Database) -> Result<(), DatabaseError> {
    /// let mut conn = db.get_connection()?;
    /// if let Some(raw) = conn.as_sqlite_mut() {
    ///     raw.pragma_update(None, "foreign_keys", "ON").ok();
    /// }
    /// # Ok(()) }
    /// ```
    #[allow(unreachable_patterns)]
    pub fn as_sqlite_mut(&mut self) -> Option<&mut rusqlite::Connection> {
        match self.inner.as_mut()? {
            Pooled::Sqlite(conn) => Some(&mut **conn),
            _ => None,
        }
    }
}
