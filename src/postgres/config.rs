use std::future::Future;
use std::str::FromStr;

use bb8::ManageConnection;
use tokio_postgres::{Client, NoTls};
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::error::{DatabaseError, DriverError};

/// bb8 manager for Postgres clients.
#[derive(Debug, Clone)]
pub struct PgManager {
    pub(crate) config: tokio_postgres::Config,
}

impl PgManager {
    #[must_use]
    pub fn new(config: tokio_postgres::Config) -> Self {
        Self { config }
    }

    /// Driver configuration for `config`: the connection URI plus the credentials and the
    /// pool settings the driver understands.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] if the assembled URI (host, name or options) is
    /// rejected by the driver.
    pub(crate) fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let uri = config.connection_uri();
        let mut pg = tokio_postgres::Config::from_str(&uri).map_err(|e| {
            DatabaseError::Validation(format!("invalid postgres connection uri `{uri}`: {e}"))
        })?;
        if let Some(user) = config.username.as_deref() {
            pg.user(user);
        }
        if let Some(password) = config.password.as_deref() {
            pg.password(password);
        }
        let settings = config.settings();
        pg.connect_timeout(settings.connection_timeout);
        if let Some(idle) = settings.keep_alive {
            pg.keepalives(true);
            pg.keepalives_idle(idle);
        }
        if let Some(name) = settings.pool_name.as_deref() {
            pg.application_name(name);
        }
        Ok(Self::new(pg))
    }
}

impl ManageConnection for PgManager {
    type Connection = Client;
    type Error = DriverError;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let cfg = self.config.clone();
        async move {
            let (client, connection) = cfg.connect(NoTls).await?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    warn!(error = %e, "postgres connection closed with an error");
                }
            });
            Ok(client)
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async move {
            conn.simple_query("SELECT 1").await?;
            Ok(())
        }
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{Backend, ConnectOptions};

    fn config() -> DatabaseConfig {
        DatabaseConfig::new()
            .backend(Backend::Postgres)
            .host("db.example")
            .port(6432)
            .unwrap()
            .name("ledger")
            .username("svc")
            .password("pw")
    }

    #[test]
    fn credentials_and_settings_reach_the_driver() {
        let manager = PgManager::from_config(
            &config()
                .pool_name("reporting")
                .keep_alive(Duration::from_secs(30))
                .unwrap(),
        )
        .unwrap();
        let pg = &manager.config;
        assert_eq!(pg.get_user(), Some("svc"));
        assert_eq!(pg.get_password(), Some(&b"pw"[..]));
        assert_eq!(pg.get_dbname(), Some("ledger"));
        assert_eq!(pg.get_ports(), &[6432]);
        assert_eq!(pg.get_application_name(), Some("reporting"));
        assert_eq!(pg.get_keepalives_idle(), Duration::from_secs(30));
    }

    #[test]
    fn uri_options_are_parsed_by_the_driver() {
        let manager = PgManager::from_config(
            &config().with_options(ConnectOptions::new().append("application_name", "cli")),
        )
        .unwrap();
        assert_eq!(manager.config.get_application_name(), Some("cli"));
    }

    #[test]
    fn unknown_uri_options_are_validation_errors() {
        let err = PgManager::from_config(
            &config().with_options(ConnectOptions::new().append("no_such_option", "1")),
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }
}
