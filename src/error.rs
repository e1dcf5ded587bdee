use thiserror::Error;

/// Underlying cause reported by a driver, the pool, or a value conversion.
#[derive(Debug, Error)]
pub enum DriverError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("timed out waiting for a pooled connection")]
    PoolTimedOut,

    #[error("value conversion error: {0}")]
    Conversion(String),

    #[error("no column named `{0}` in the result")]
    UnknownColumn(String),

    #[error("no current row, call `next()` first")]
    NoCurrentRow,
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database is already connected")]
    AlreadyConnected,

    #[error("database is not connected")]
    NotConnected,

    #[error("database credentials are incomplete, missing: {}", .missing.join(", "))]
    IncompleteCredentials { missing: Vec<&'static str> },

    #[error("failed to acquire a pooled connection")]
    ConnectionAcquisition {
        #[source]
        source: DriverError,
    },

    #[error("error while executing statement `{sql}`")]
    StatementExecution {
        sql: String,
        #[source]
        source: DriverError,
    },

    #[error(
        "error while reading result cursor{}",
        .column.as_deref().map(|c| format!(" column '{c}'")).unwrap_or_default()
    )]
    CursorRead {
        column: Option<String>,
        #[source]
        source: DriverError,
    },

    #[error("error while releasing statement resources")]
    ResourceRelease {
        #[source]
        source: DriverError,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("failed to start worker pool")]
    WorkerPool(#[source] std::io::Error),

    #[error("asynchronous statement task failed")]
    Dispatch(#[from] tokio::task::JoinError),
}

impl DatabaseError {
    pub(crate) fn execution(sql: &str, source: impl Into<DriverError>) -> Self {
        DatabaseError::StatementExecution {
            sql: sql.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn column(column: &str, source: impl Into<DriverError>) -> Self {
        DatabaseError::CursorRead {
            column: Some(column.to_string()),
            source: source.into(),
        }
    }

    pub(crate) fn cursor(source: impl Into<DriverError>) -> Self {
        DatabaseError::CursorRead {
            column: None,
            source: source.into(),
        }
    }

    pub(crate) fn release(source: impl Into<DriverError>) -> Self {
        DatabaseError::ResourceRelease {
            source: source.into(),
        }
    }
}

impl From<bb8::RunError<DriverError>> for DatabaseError {
    fn from(err: bb8::RunError<DriverError>) -> Self {
        let source = match err {
            bb8::RunError::User(source) => source,
            _ => DriverError::PoolTimedOut,
        };
        DatabaseError::ConnectionAcquisition { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_credentials_lists_missing_fields() {
        let err = DatabaseError::IncompleteCredentials {
            missing: vec!["host", "password"],
        };
        assert_eq!(
            err.to_string(),
            "database credentials are incomplete, missing: host, password"
        );
    }

    #[test]
    fn cursor_read_names_column_when_known() {
        let err = DatabaseError::column("age", DriverError::Conversion("bad".into()));
        assert_eq!(err.to_string(), "error while reading result cursor column 'age'");
        let err = DatabaseError::cursor(DriverError::Conversion("bad".into()));
        assert_eq!(err.to_string(), "error while reading result cursor");
    }

    #[test]
    fn pool_timeout_maps_to_acquisition_failure() {
        let err = DatabaseError::from(bb8::RunError::<DriverError>::TimedOut);
        assert!(matches!(
            err,
            DatabaseError::ConnectionAcquisition {
                source: DriverError::PoolTimedOut
            }
        ));
    }
}
