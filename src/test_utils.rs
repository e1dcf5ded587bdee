//! Throwaway PostgreSQL server for integration tests and local experiments.

use postgresql_embedded::PostgreSQL;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::config::{Backend, DatabaseConfig};
use crate::error::DatabaseError;

/// A running embedded PostgreSQL instance with one freshly created database.
///
/// The server is driven by its own runtime so it can be started from blocking tests.
pub struct EmbeddedPostgres {
    postgresql: PostgreSQL,
    runtime: Runtime,
    database: String,
}

impl EmbeddedPostgres {
    /// Install (bundled binaries), start the server and create `database`.
    ///
    /// # Errors
    /// Returns an error if the runtime can't start, or the server can't be set up, started
    /// or given the database.
    pub fn start(database: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let runtime = Runtime::new()?;
        let postgresql = runtime.block_on(async {
            let mut postgresql = PostgreSQL::default();
            postgresql.setup().await?;
            postgresql.start().await?;
            postgresql.create_database(database).await?;
            Ok::<_, postgresql_embedded::Error>(postgresql)
        })?;
        info!(port = postgresql.settings().port, database, "embedded postgres started");
        Ok(Self {
            postgresql,
            runtime,
            database: database.to_string(),
        })
    }

    /// Connection settings for the created database.
    ///
    /// # Errors
    /// [`DatabaseError::Validation`] if the server reports a port of zero.
    pub fn config(&self) -> Result<DatabaseConfig, DatabaseError> {
        let settings = self.postgresql.settings();
        DatabaseConfig::new()
            .backend(Backend::Postgres)
            .host(settings.host.clone())
            .name(self.database.clone())
            .username(settings.username.clone())
            .password(settings.password.clone())
            .port(i64::from(settings.port))
    }

    /// Stop the server and wait for it to exit.
    pub fn stop(self) {
        let Self {
            postgresql,
            runtime,
            ..
        } = self;
        if let Err(err) = runtime.block_on(postgresql.stop()) {
            warn!(error = %err, "embedded postgres did not stop cleanly");
        }
    }
}
