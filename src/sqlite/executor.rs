use std::sync::Arc;

use rusqlite::{Connection, Statement};
use tracing::warn;

use crate::error::DatabaseError;
use crate::results::ResultCursor;
use crate::types::Value;

/// Execute a mutation and return the number of changed rows.
///
/// # Errors
/// Returns [`DatabaseError::StatementExecution`] for prepare, bind and step failures (a
/// replacement count that differs from the placeholder count included) and
/// [`DatabaseError::ResourceRelease`] if only the finalize step fails.
pub(crate) fn execute_update(
    conn: &mut Connection,
    sql: &str,
    params: &[Value],
    bind: bool,
) -> Result<u64, DatabaseError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| DatabaseError::execution(sql, e))?;
    let outcome = bind_params(&mut stmt, params, bind)
        .and_then(|()| stmt.raw_execute())
        .map(|changed| u64::try_from(changed).unwrap_or(u64::MAX))
        .map_err(|e| DatabaseError::execution(sql, e));
    release(stmt, outcome)
}

/// Execute a query and hand its rows to `consumer`.
///
/// The cursor borrows the prepared statement, so it can't outlive this call; the statement
/// is finalized after the consumer returns, whatever it returned. The first row is stepped
/// before the consumer runs, so a failing statement is a [`DatabaseError::StatementExecution`]
/// whether or not the consumer reads.
pub(crate) fn execute_query<R, F>(
    conn: &mut Connection,
    sql: &str,
    params: &[Value],
    bind: bool,
    consumer: F,
) -> Result<R, DatabaseError>
where
    F: FnOnce(&mut ResultCursor<'_>) -> Result<R, DatabaseError>,
{
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| DatabaseError::execution(sql, e))?;
    let outcome = run_query(&mut stmt, sql, params, bind, consumer);
    release(stmt, outcome)
}

fn run_query<R, F>(
    stmt: &mut Statement<'_>,
    sql: &str,
    params: &[Value],
    bind: bool,
    consumer: F,
) -> Result<R, DatabaseError>
where
    F: FnOnce(&mut ResultCursor<'_>) -> Result<R, DatabaseError>,
{
    bind_params(stmt, params, bind).map_err(|e| DatabaseError::execution(sql, e))?;
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let mut cursor = ResultCursor::from_sqlite(columns, stmt.raw_query());
    cursor.prime(sql)?;
    consumer(&mut cursor)
}

fn bind_params(stmt: &mut Statement<'_>, params: &[Value], bind: bool) -> rusqlite::Result<()> {
    if !bind {
        return Ok(());
    }
    let expected = stmt.parameter_count();
    if expected != params.len() {
        return Err(rusqlite::Error::InvalidParameterCount(params.len(), expected));
    }
    for (idx, value) in params.iter().enumerate() {
        stmt.raw_bind_parameter(idx + 1, value)?;
    }
    Ok(())
}

/// Finalize `stmt`; a finalize error never replaces an earlier one.
fn release<T>(
    stmt: Statement<'_>,
    outcome: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match (outcome, stmt.finalize()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(DatabaseError::release(err)),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(release_err)) => {
            warn!(error = %release_err, "statement finalize failed after an earlier error");
            Err(err)
        }
    }
}
