use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tracing::error;

use super::ExecutionContext;
use crate::config::AsyncFailurePolicy;
use crate::error::DatabaseError;
use crate::worker;

/// Completion handle of an asynchronous execution.
///
/// Await it from async code, or call [`wait`](AsyncResult::wait) from blocking code. It
/// resolves according to the [`AsyncFailurePolicy`] the database was connected with.
///
/// ```rust,no_run
/// # use sql_wrapper::prelude::*;
/// # async fn demo(db: &Database) -> Result<(), DatabaseError> {
/// let changed = Statement::raw("DELETE FROM sessions").execute_update_async(db).await?;
/// # Ok(()) }
/// ```
#[must_use = "an AsyncResult does nothing unless awaited or waited on"]
pub struct AsyncResult<T> {
    state: State<T>,
}

enum State<T> {
    Running {
        task: JoinHandle<Result<T, DatabaseError>>,
        handle: Handle,
        fallback: Option<fn() -> T>,
    },
    Done(Option<Result<T, DatabaseError>>),
}

impl<T> AsyncResult<T> {
    /// Already resolved, for failures detected before anything was scheduled.
    pub(crate) fn ready(result: Result<T, DatabaseError>) -> Self {
        Self {
            state: State::Done(Some(result)),
        }
    }

    /// Block the calling thread until the execution finishes.
    ///
    /// Inside a current-thread runtime this refuses to block; `.await` the result there.
    ///
    /// # Errors
    /// The execution's error, or [`DatabaseError::Dispatch`] if the worker task panicked or
    /// was cancelled (subject to the failure policy either way).
    pub fn wait(self) -> Result<T, DatabaseError> {
        match self.state {
            State::Running {
                task,
                handle,
                fallback,
            } => settle(worker::block_on(&handle, task)?, fallback),
            State::Done(slot) => slot.unwrap_or_else(|| Err(already_taken())),
        }
    }

    /// Whether the result is available without blocking.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.state {
            State::Running { task, .. } => task.is_finished(),
            State::Done(_) => true,
        }
    }
}

impl<T> Future for AsyncResult<T> {
    type Output = Result<T, DatabaseError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            State::Running { task, fallback, .. } => match Pin::new(task).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(joined) => {
                    let outcome = settle(joined, *fallback);
                    this.state = State::Done(None);
                    Poll::Ready(outcome)
                }
            },
            State::Done(slot) => Poll::Ready(slot.take().unwrap_or_else(|| Err(already_taken()))),
        }
    }
}

// `T` is only ever moved out by value, never pinned in place.
impl<T> Unpin for AsyncResult<T> {}

impl<T> fmt::Debug for AsyncResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncResult")
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn already_taken() -> DatabaseError {
    DatabaseError::Validation("asynchronous result was already taken".to_string())
}

fn settle<T>(
    joined: Result<Result<T, DatabaseError>, JoinError>,
    fallback: Option<fn() -> T>,
) -> Result<T, DatabaseError> {
    let outcome = joined.map_err(DatabaseError::Dispatch).and_then(|result| result);
    match (outcome, fallback) {
        (Err(err), Some(default)) => {
            error!(error = %err, "asynchronous statement failed, resolving to the default value");
            Ok(default())
        }
        (outcome, _) => outcome,
    }
}

/// Run `job` on a blocking thread of the worker pool.
pub(crate) fn dispatch<T, F>(ctx: ExecutionContext, job: F) -> AsyncResult<T>
where
    T: Default + Send + 'static,
    F: FnOnce(&ExecutionContext) -> Result<T, DatabaseError> + Send + 'static,
{
    let fallback = match ctx.policy {
        AsyncFailurePolicy::Propagate => None,
        AsyncFailurePolicy::LogAndDefault => Some(T::default as fn() -> T),
    };
    let handle = ctx.handle.clone();
    let task = handle.spawn_blocking(move || job(&ctx));
    AsyncResult {
        state: State::Running {
            task,
            handle,
            fallback,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap()
    }

    fn spawned<T: Send + 'static>(
        rt: &tokio::runtime::Runtime,
        result: Result<T, DatabaseError>,
        fallback: Option<fn() -> T>,
    ) -> AsyncResult<T> {
        AsyncResult {
            state: State::Running {
                task: rt.spawn_blocking(move || result),
                handle: rt.handle().clone(),
                fallback,
            },
        }
    }

    #[test]
    fn propagate_surfaces_the_error() {
        let rt = runtime();
        let res = spawned::<u64>(&rt, Err(DatabaseError::NotConnected), None).wait();
        assert!(matches!(res, Err(DatabaseError::NotConnected)));
    }

    #[test]
    fn fallback_replaces_errors_with_default() {
        let rt = runtime();
        let res = spawned::<u64>(&rt, Err(DatabaseError::NotConnected), Some(u64::default));
        assert_eq!(res.wait().unwrap(), 0);
    }

    #[test]
    fn panics_become_dispatch_errors() {
        let rt = runtime();
        let task = rt.spawn_blocking(|| -> Result<u64, DatabaseError> { panic!("consumer blew up") });
        let res = AsyncResult {
            state: State::Running {
                task,
                handle: rt.handle().clone(),
                fallback: None,
            },
        };
        assert!(matches!(res.wait(), Err(DatabaseError::Dispatch(_))));
    }

    #[test]
    fn awaiting_a_ready_result() {
        let rt = runtime();
        let value = rt.block_on(AsyncResult::ready(Ok::<_, DatabaseError>(3_u8))).unwrap();
        assert_eq!(value, 3);
        let via_future = rt.block_on(spawned(&rt, Ok::<_, DatabaseError>("x"), None)).unwrap();
        assert_eq!(via_future, "x");
    }
}
