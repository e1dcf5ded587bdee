use super::Statement;
use crate::error::DatabaseError;
use crate::executor::{self, AsyncResult};
use crate::pool::Database;
use crate::results::ResultCursor;

impl Statement {
    /// Execute as a mutation on the calling thread and return the affected-row count.
    ///
    /// # Errors
    /// [`DatabaseError::NotConnected`] without a live pool,
    /// [`DatabaseError::ConnectionAcquisition`] if no connection can be borrowed,
    /// [`DatabaseError::StatementExecution`] if the driver rejects the statement.
    pub fn execute_update(self, db: &Database) -> Result<u64, DatabaseError> {
        let ctx = db.context()?;
        executor::update(&ctx, &self)
    }

    /// Execute as a mutation on the worker pool.
    ///
    /// Failures resolve according to the configured
    /// [`AsyncFailurePolicy`](crate::AsyncFailurePolicy); under `LogAndDefault` a failed
    /// statement resolves to `Ok(0)`.
    pub fn execute_update_async(self, db: &Database) -> AsyncResult<u64> {
        match db.context() {
            Ok(ctx) => executor::dispatch(ctx, move |ctx| executor::update(ctx, &self)),
            Err(err) => AsyncResult::ready(Err(err)),
        }
    }

    /// Execute as a query and pass the rows to `consumer`, returning what it returns.
    ///
    /// The cursor, the prepared statement and the connection are released when `consumer`
    /// returns, whether it succeeded or not.
    ///
    /// # Errors
    /// The errors of [`execute_update`](Self::execute_update), plus whatever `consumer`
    /// returns.
    pub fn execute_query<R, F>(self, db: &Database, consumer: F) -> Result<R, DatabaseError>
    where
        F: FnOnce(&mut ResultCursor<'_>) -> Result<R, DatabaseError>,
    {
        let ctx = db.context()?;
        executor::query(&ctx, &self, consumer)
    }

    /// Execute as a query on the worker pool; the consumer runs there too.
    ///
    /// Under `LogAndDefault` a failure resolves to `R::default()`.
    pub fn execute_query_async<R, F>(self, db: &Database, consumer: F) -> AsyncResult<R>
    where
        F: FnOnce(&mut ResultCursor<'_>) -> Result<R, DatabaseError> + Send + 'static,
        R: Default + Send + 'static,
    {
        match db.context() {
            Ok(ctx) => executor::dispatch(ctx, move |ctx| executor::query(ctx, &self, consumer)),
            Err(err) => AsyncResult::ready(Err(err)),
        }
    }
}
