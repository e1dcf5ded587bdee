use std::future::Future;

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use tracing::debug;

use crate::error::DatabaseError;

/// Runtime that runs asynchronous executions and drives the async drivers.
///
/// Either owned (created on first use and kept until the owning [`Database`](crate::Database)
/// is dropped) or borrowed from the caller through a [`Handle`].
#[derive(Default)]
pub(crate) struct WorkerPool {
    owned: Option<Runtime>,
}

impl WorkerPool {
    /// Pick the handle a new connection uses: the supplied one, else the owned runtime,
    /// creating it if this is the first time.
    pub(crate) fn activate(&mut self, supplied: Option<Handle>) -> Result<Handle, DatabaseError> {
        if let Some(handle) = supplied {
            check_supplied(&handle)?;
            return Ok(handle);
        }
        if let Some(runtime) = &self.owned {
            return Ok(runtime.handle().clone());
        }
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("sql-wrapper-worker")
            .build()
            .map_err(DatabaseError::WorkerPool)?;
        debug!("started default worker pool");
        let handle = runtime.handle().clone();
        self.owned = Some(runtime);
        Ok(handle)
    }

    pub(crate) fn is_started(&self) -> bool {
        self.owned.is_some()
    }
}

/// Drive `future` to completion on `handle` from blocking code.
///
/// On a thread that belongs to a multi-threaded runtime the worker is handed off with
/// `block_in_place` first. A current-thread runtime has no spare worker, so blocking there
/// is refused instead of deadlocking or panicking.
///
/// # Errors
/// [`DatabaseError::Validation`] when called from inside a current-thread runtime.
pub(crate) fn block_on<F: Future>(handle: &Handle, future: F) -> Result<F::Output, DatabaseError> {
    let Ok(current) = Handle::try_current() else {
        return Ok(handle.block_on(future));
    };
    match current.runtime_flavor() {
        RuntimeFlavor::CurrentThread => Err(DatabaseError::Validation(
            "blocking call made inside a current-thread async runtime; use the async form"
                .to_string(),
        )),
        _ => Ok(tokio::task::block_in_place(|| handle.block_on(future))),
    }
}

/// Worker handles have to come from a multi-threaded runtime: executions block on them.
pub(crate) fn check_supplied(handle: &Handle) -> Result<(), DatabaseError> {
    match handle.runtime_flavor() {
        RuntimeFlavor::CurrentThread => Err(DatabaseError::Validation(
            "worker pool handle must belong to a multi-threaded runtime".to_string(),
        )),
        _ => Ok(()),
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // `Runtime`'s own drop panics when it happens inside an async context
        if let Some(runtime) = self.owned.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("started", &self.is_started())
            .finish()
    }
}
