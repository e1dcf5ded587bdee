use super::{DbConnection, Pooled};

impl DbConnection {
    /// The raw `tokio-postgres` client, when this is a Postgres connection.
    #[allow(unreachable_patterns)]
    #[must_use]
    pub fn as_postgres(&self) -> Option<&tokio_postgres::Client> {
        match self.inner.as_ref()? {
            Pooled::Postgres(client) => Some(&**client),
            _ => None,
        }
    }
}
