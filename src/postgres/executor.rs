use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_postgres::Client;

use super::params::as_refs;
use crate::error::DatabaseError;
use crate::results::ResultCursor;
use crate::translation::to_postgres_placeholders;
use crate::types::Value;
use crate::worker;

// Statements are written with `?`; Postgres wants `$n`. Unbound text is sent verbatim.
fn statement_text(sql: &str, bind: bool) -> std::borrow::Cow<'_, str> {
    if bind {
        to_postgres_placeholders(sql)
    } else {
        std::borrow::Cow::Borrowed(sql)
    }
}

/// Execute a mutation and return the number of affected rows.
///
/// Blocks the calling thread on `handle`; refused inside a current-thread runtime.
///
/// # Errors
/// Returns [`DatabaseError::StatementExecution`] if preparation or execution fails.
pub(crate) fn execute_update(
    client: &Client,
    handle: &Handle,
    sql: &str,
    params: &[Value],
    bind: bool,
) -> Result<u64, DatabaseError> {
    let text = statement_text(sql, bind);
    let params = if bind { params } else { &[] };
    worker::block_on(handle, async {
        let prepared = client.prepare(&text).await?;
        client.execute(&prepared, &as_refs(params)).await
    })?
    .map_err(|e| DatabaseError::execution(sql, e))
}

/// Execute a query and hand its row stream to `consumer`.
///
/// # Errors
/// Returns [`DatabaseError::StatementExecution`] if preparation or execution fails, and
/// whatever the consumer returns otherwise.
pub(crate) fn execute_query<R, F>(
    client: &Client,
    handle: &Handle,
    sql: &str,
    params: &[Value],
    bind: bool,
    consumer: F,
) -> Result<R, DatabaseError>
where
    F: FnOnce(&mut ResultCursor<'_>) -> Result<R, DatabaseError>,
{
    let text = statement_text(sql, bind);
    let params = if bind { params } else { &[] };
    let (columns, stream) = worker::block_on(handle, async {
        let prepared = client.prepare(&text).await?;
        let columns: Arc<[String]> = prepared
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let stream = client.query_raw(&prepared, params.iter()).await?;
        Ok::<_, tokio_postgres::Error>((columns, stream))
    })?
    .map_err(|e| DatabaseError::execution(sql, e))?;
    let mut cursor = ResultCursor::from_postgres(columns, stream, handle.clone());
    cursor.prime(sql)?;
    consumer(&mut cursor)
}
