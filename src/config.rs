use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use clap::builder::PossibleValue;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use crate::error::DatabaseError;

/// Database engine a [`DatabaseConfig`] connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `PostgreSQL` server reached over TCP
    #[cfg(feature = "postgres")]
    Postgres,
    /// `SQLite` database file (or URI) opened in-process
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl Default for Backend {
    #[cfg(feature = "postgres")]
    fn default() -> Self {
        Backend::Postgres
    }

    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    fn default() -> Self {
        Backend::Sqlite
    }
}

#[cfg(all(feature = "postgres", feature = "sqlite"))]
const BACKENDS: &[Backend] = &[Backend::Postgres, Backend::Sqlite];
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
const BACKENDS: &[Backend] = &[Backend::Postgres];
#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
const BACKENDS: &[Backend] = &[Backend::Sqlite];

// Written by hand: the variant list depends on the enabled features.
impl ValueEnum for Backend {
    fn value_variants<'a>() -> &'a [Self] {
        BACKENDS
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            #[cfg(feature = "postgres")]
            Backend::Postgres => PossibleValue::new("postgres").alias("postgresql"),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite => PossibleValue::new("sqlite"),
        })
    }
}

/// What an asynchronous execution resolves to when the statement fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncFailurePolicy {
    /// Resolve to the error.
    #[default]
    Propagate,
    /// Log the error and resolve to the result type's default (`0` rows, `()`, empty
    /// collections). This masks failures from the caller.
    LogAndDefault,
}

/// Key/value pairs appended to the connection URI as a query string.
///
/// ```rust
/// use sql_wrapper::ConnectOptions;
///
/// let options = ConnectOptions::new().append("ssl", "true").append("tz", "UTC");
/// assert_eq!(options.build(), "?ssl=true&tz=UTC");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    trail: String,
}

impl ConnectOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `name=value` pair to the trail.
    #[must_use]
    pub fn append(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.trail.push(if self.trail.is_empty() { '?' } else { '&' });
        self.trail.push_str(name.as_ref());
        self.trail.push('=');
        self.trail.push_str(value.as_ref());
        self
    }

    /// The accumulated query string, empty when no pair was appended.
    #[must_use]
    pub fn build(&self) -> &str {
        &self.trail
    }
}

/// Pool tuning applied when the pool is created.
///
/// Deserializes from configuration with timeouts expressed in milliseconds:
/// ```rust
/// use sql_wrapper::PoolSettings;
///
/// let settings: PoolSettings =
///     serde_json::from_str(r#"{ "max_pool_size": 4, "connection_timeout": 2500 }"#).unwrap();
/// assert_eq!(settings.max_pool_size, 4);
/// assert_eq!(settings.connection_timeout.as_millis(), 2500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub pool_name: Option<String>,
    pub max_pool_size: u32,
    pub min_idle: Option<u32>,
    #[serde(with = "millis")]
    pub connection_timeout: Duration,
    #[serde(with = "optional_millis")]
    pub idle_timeout: Option<Duration>,
    #[serde(with = "optional_millis")]
    pub keep_alive: Option<Duration>,
    #[serde(with = "optional_millis")]
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            pool_name: None,
            max_pool_size: 10,
            min_idle: None,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            keep_alive: None,
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

impl PoolSettings {
    /// Check the combinations the pool would otherwise reject by panicking.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] for a zero pool size, `min_idle` above the pool size,
    /// or a zero timeout.
    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.max_pool_size == 0 {
            return Err(DatabaseError::Validation(
                "max pool size must be at least 1".to_string(),
            ));
        }
        if let Some(min_idle) = self.min_idle {
            idle_within_size(min_idle, self.max_pool_size)?;
        }
        non_zero("connection timeout", Some(self.connection_timeout))?;
        non_zero("idle timeout", self.idle_timeout)?;
        non_zero("keep alive", self.keep_alive)?;
        non_zero("max lifetime", self.max_lifetime)?;
        Ok(())
    }
}

fn idle_within_size(min_idle: u32, max_pool_size: u32) -> Result<(), DatabaseError> {
    if min_idle > max_pool_size {
        return Err(DatabaseError::Validation(format!(
            "min idle ({min_idle}) can't exceed max pool size ({max_pool_size})"
        )));
    }
    Ok(())
}

fn non_zero(what: &str, value: Option<Duration>) -> Result<(), DatabaseError> {
    match value {
        Some(d) if d.is_zero() => Err(DatabaseError::Validation(format!(
            "{what} must be greater than zero"
        ))),
        _ => Ok(()),
    }
}

/// Fluent configuration consumed by [`Database::connect`](crate::Database::connect).
///
/// ```rust
/// use sql_wrapper::{ConnectOptions, DatabaseConfig};
///
/// # fn main() -> Result<(), sql_wrapper::DatabaseError> {
/// let config = DatabaseConfig::new()
///     .host("db.internal")
///     .port(5432)?
///     .name("inventory")
///     .username("app")
///     .password("secret")
///     .with_options(ConnectOptions::new().append("sslmode", "disable"))
///     .max_pool_size(8)?;
/// assert!(config.credentials_complete());
/// # Ok(()) }
/// ```
#[derive(Clone, Default)]
pub struct DatabaseConfig {
    pub(crate) backend: Backend,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) name: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) options: Option<ConnectOptions>,
    pub(crate) settings: PoolSettings,
    pub(crate) worker: Option<Handle>,
    pub(crate) async_failure_policy: AsyncFailurePolicy,
    pub(crate) verify_on_connect: bool,
    credentials_set: bool,
}

// Manual Debug implementation so the password never reaches logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("options", &self.options)
            .field("settings", &self.settings)
            .field("custom_worker", &self.worker.is_some())
            .field("async_failure_policy", &self.async_failure_policy)
            .field("verify_on_connect", &self.verify_on_connect)
            .finish()
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self.check_credentials();
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self.check_credentials();
        self
    }

    /// Sets the port of the database connection.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] unless `port` is within `1..=65535`.
    pub fn port(mut self, port: i64) -> Result<Self, DatabaseError> {
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| {
                DatabaseError::Validation(format!("port must be between 1 and 65535, got {port}"))
            })?;
        self.port = Some(port);
        self.check_credentials();
        Ok(self)
    }

    /// Sets the port from its textual form.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] if the text is not an integer or is out of range.
    pub fn port_str(self, port: &str) -> Result<Self, DatabaseError> {
        let parsed = port.trim().parse::<i64>().map_err(|e| {
            DatabaseError::Validation(format!("port `{port}` is not a number: {e}"))
        })?;
        self.port(parsed)
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.check_credentials();
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.check_credentials();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self.check_credentials();
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ConnectOptions) -> Self {
        self.options = Some(options);
        self.check_credentials();
        self
    }

    #[must_use]
    pub fn pool_name(mut self, pool_name: impl Into<String>) -> Self {
        self.settings.pool_name = Some(pool_name.into());
        self.check_credentials();
        self
    }

    /// Maximum number of connections the pool may open.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] if `size` is zero or below an already configured
    /// `min_idle`.
    pub fn max_pool_size(mut self, size: u32) -> Result<Self, DatabaseError> {
        if size == 0 {
            return Err(DatabaseError::Validation(
                "max pool size must be at least 1".to_string(),
            ));
        }
        if let Some(min_idle) = self.settings.min_idle {
            idle_within_size(min_idle, size)?;
        }
        self.settings.max_pool_size = size;
        self.check_credentials();
        Ok(self)
    }

    /// Connections the pool tries to keep idle.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] if `min_idle` exceeds the configured pool size.
    pub fn min_idle(mut self, min_idle: u32) -> Result<Self, DatabaseError> {
        idle_within_size(min_idle, self.settings.max_pool_size)?;
        self.settings.min_idle = Some(min_idle);
        self.check_credentials();
        Ok(self)
    }

    /// How long a caller waits for a pooled connection.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] for a zero duration.
    pub fn connection_timeout(mut self, timeout: Duration) -> Result<Self, DatabaseError> {
        non_zero("connection timeout", Some(timeout))?;
        self.settings.connection_timeout = timeout;
        self.check_credentials();
        Ok(self)
    }

    /// How long a connection may sit idle in the pool.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] for a zero duration.
    pub fn idle_timeout(mut self, timeout: Duration) -> Result<Self, DatabaseError> {
        non_zero("idle timeout", Some(timeout))?;
        self.settings.idle_timeout = Some(timeout);
        self.check_credentials();
        Ok(self)
    }

    /// TCP keep-alive idle time for server connections.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] for a zero duration.
    pub fn keep_alive(mut self, interval: Duration) -> Result<Self, DatabaseError> {
        non_zero("keep alive", Some(interval))?;
        self.settings.keep_alive = Some(interval);
        self.check_credentials();
        Ok(self)
    }

    /// Maximum lifetime of a pooled connection.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] for a zero duration.
    pub fn max_lifetime(mut self, lifetime: Duration) -> Result<Self, DatabaseError> {
        non_zero("max lifetime", Some(lifetime))?;
        self.settings.max_lifetime = Some(lifetime);
        self.check_credentials();
        Ok(self)
    }

    /// Replace all pool tuning at once.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Validation`] if the settings fail [`PoolSettings::validate`].
    pub fn pool_settings(mut self, settings: PoolSettings) -> Result<Self, DatabaseError> {
        settings.validate()?;
        self.settings = settings;
        self.check_credentials();
        Ok(self)
    }

    /// Run asynchronous executions (and drive the drivers) on an existing runtime instead of
    /// a pool created at connect time. The runtime has to be multi-threaded;
    /// [`connect`](crate::Database::connect) rejects a current-thread handle.
    #[must_use]
    pub fn worker_pool(mut self, handle: Handle) -> Self {
        self.worker = Some(handle);
        self.check_credentials();
        self
    }

    #[must_use]
    pub fn async_failure_policy(mut self, policy: AsyncFailurePolicy) -> Self {
        self.async_failure_policy = policy;
        self.check_credentials();
        self
    }

    /// Borrow one connection during `connect` so an unreachable database fails there.
    #[must_use]
    pub fn verify_on_connect(mut self, verify: bool) -> Self {
        self.verify_on_connect = verify;
        self.check_credentials();
        self
    }

    #[must_use]
    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// Whether every field the backend requires has been set.
    #[must_use]
    pub fn credentials_complete(&self) -> bool {
        self.credentials_set
    }

    /// Names of the required fields that are still unset.
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let required = match self.backend {
            #[cfg(feature = "postgres")]
            Backend::Postgres => vec![
                ("host", self.host.is_some()),
                ("port", self.port.is_some()),
                ("name", self.name.is_some()),
                ("username", self.username.is_some()),
                ("password", self.password.is_some()),
            ],
            #[cfg(feature = "sqlite")]
            Backend::Sqlite => vec![("name", self.name.is_some())],
        };
        required
            .into_iter()
            .filter(|(_, set)| !set)
            .map(|(field, _)| field)
            .collect()
    }

    /// The connection URI assembled from host, port, name and options.
    ///
    /// Credentials are applied to the driver configuration separately and never appear here.
    #[must_use]
    pub fn connection_uri(&self) -> String {
        let trail = self.options.as_ref().map_or("", ConnectOptions::build);
        let name = self.name.as_deref().unwrap_or_default();
        match self.backend {
            #[cfg(feature = "postgres")]
            Backend::Postgres => format!(
                "postgresql://{}:{}/{name}{trail}",
                self.host.as_deref().unwrap_or_default(),
                self.port.unwrap_or_default(),
            ),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite => format!("file:{name}{trail}"),
        }
    }

    fn check_credentials(&mut self) {
        self.credentials_set = self.missing_credentials().is_empty();
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        u64::deserialize(de).map(Duration::from_millis)
    }
}

mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &Option<Duration>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => super::millis::serialize(d, ser),
            None => ser.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(de)?.map(Duration::from_millis))
    }
}
