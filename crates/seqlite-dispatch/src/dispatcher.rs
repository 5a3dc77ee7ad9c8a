// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Public entry points: open, close, and batch execution (sync and async).
//!
//! Every failure leaving this module is a [`DatabaseError`]. Local checks
//! (argument shape, registry) run at call time, before anything is queued.

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use seqlite_config::DispatchConfig;
use seqlite_core::{
    BatchCommand, BatchEngine, BatchQueryResult, DatabaseError, EngineError, ExecuteOptions,
};
use tracing::{debug, info};

use crate::executor;
use crate::normalize::normalize;
use crate::registry::ConnectionRegistry;
use crate::sequencer::{ConnectionQueue, Ticket};

/// Runtime dispatch settings. Read afresh on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub simple_null_handling: bool,
    pub worker_name_prefix: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for DispatchSettings {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            simple_null_handling: config.simple_null_handling,
            worker_name_prefix: config.worker_name_prefix.clone(),
        }
    }
}

/// Routes operations to per-connection queues.
///
/// Operations on one connection run strictly in submission order, whether
/// they were submitted through the blocking or the async entry points.
/// Different connections run independently of each other.
#[derive(Default)]
pub struct Dispatcher {
    registry: ConnectionRegistry,
    settings: ArcSwap<DispatchSettings>,
}

impl Dispatcher {
    pub fn new(settings: DispatchSettings) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            settings: ArcSwap::from_pointee(settings),
        }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(DispatchSettings::from(config))
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Arc<DispatchSettings> {
        self.settings.load_full()
    }

    /// Turn null sentinel translation on or off for subsequent calls.
    pub fn set_simple_null_handling(&self, enabled: bool) {
        self.settings.rcu(|current| DispatchSettings {
            simple_null_handling: enabled,
            ..DispatchSettings::clone(current)
        });
        debug!(enabled, "simple null handling updated");
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.registry.is_open(name)
    }

    /// Number of operations admitted on `name` since it was opened, or
    /// `None` if it is not open.
    pub fn admitted(&self, name: &str) -> Option<u64> {
        self.registry.assert_open(name).ok().map(|queue| queue.admitted())
    }

    /// Names of all open connections, sorted.
    pub fn open_connections(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Register `engine` under `name` and start its worker.
    pub fn open(&self, name: &str, engine: impl BatchEngine) -> Result<(), DatabaseError> {
        executor::validate_connection_name(name).map_err(normalize)?;
        // Thread names cannot carry NUL bytes.
        let thread_name = format!("{}-{name}", self.settings.load().worker_name_prefix)
            .replace('\0', "_");
        let engine: Box<dyn BatchEngine> = Box::new(engine);

        self.registry
            .register(name, move || ConnectionQueue::spawn(name, engine, thread_name))
            .map_err(normalize)?;
        info!(connection = name, "connection opened");
        Ok(())
    }

    /// Close `name`, blocking until every operation queued before the close
    /// has run and the engine has been released.
    ///
    /// New submissions fail with `connection-not-open` as soon as this is
    /// called. Must not be called from within an async runtime.
    pub fn close(&self, name: &str) -> Result<(), DatabaseError> {
        let queue = self.registry.remove(name).map_err(normalize)?;
        let done = queue.request_close().map_err(normalize)?;
        let result = done.blocking_recv();
        queue.join();
        finish_close(name, result)
    }

    /// Async form of [`close`](Self::close).
    pub fn close_async(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), DatabaseError>> + Send + 'static {
        let name = name.to_string();
        let admitted = self
            .registry
            .remove(&name)
            .map_err(normalize)
            .and_then(|queue| queue.request_close().map_err(normalize));
        async move { finish_close(&name, admitted?.await) }
    }

    /// Execute a batch and block until its result is available.
    ///
    /// Runs after every operation already queued on `name`. Must not be
    /// called from within an async runtime.
    pub fn execute_batch(
        &self,
        name: &str,
        commands: Vec<BatchCommand>,
        options: ExecuteOptions,
    ) -> Result<BatchQueryResult, DatabaseError> {
        self.admit_batch(name, commands, options)?.wait()
    }

    /// Execute a batch without blocking.
    ///
    /// The batch takes its place in the connection's queue when this method
    /// is called, not when the returned future is first polled. Dropping the
    /// future does not withdraw the batch.
    pub fn execute_batch_async(
        &self,
        name: &str,
        commands: Vec<BatchCommand>,
        options: ExecuteOptions,
    ) -> impl Future<Output = Result<BatchQueryResult, DatabaseError>> + Send + 'static {
        let admitted = self.admit_batch(name, commands, options);
        async move { admitted?.settle().await }
    }

    /// Run arbitrary work against the engine of `name`, in queue order,
    /// blocking until it completes.
    pub fn run<T, F>(&self, name: &str, work: F) -> Result<T, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn BatchEngine) -> Result<T, EngineError> + Send + 'static,
    {
        self.admit(name, work)?.wait()
    }

    /// Async form of [`run`](Self::run).
    pub fn run_async<T, F>(
        &self,
        name: &str,
        work: F,
    ) -> impl Future<Output = Result<T, DatabaseError>> + Send + 'static
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn BatchEngine) -> Result<T, EngineError> + Send + 'static,
    {
        let admitted = self.admit(name, work);
        async move { admitted?.settle().await }
    }

    fn admit_batch(
        &self,
        name: &str,
        commands: Vec<BatchCommand>,
        options: ExecuteOptions,
    ) -> Result<Ticket<BatchQueryResult>, DatabaseError> {
        executor::validate_connection_name(name).map_err(normalize)?;
        let queue = self.registry.assert_open(name).map_err(normalize)?;
        let simple_null_handling = self.settings.load().simple_null_handling;
        let commands = executor::prepare(commands, simple_null_handling).map_err(normalize)?;

        let connection = name.to_string();
        queue
            .submit(move |engine| executor::run_batch(&connection, engine, &commands, options))
            .map_err(normalize)
    }

    fn admit<T, F>(&self, name: &str, work: F) -> Result<Ticket<T>, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn BatchEngine) -> Result<T, EngineError> + Send + 'static,
    {
        executor::validate_connection_name(name).map_err(normalize)?;
        let queue = self.registry.assert_open(name).map_err(normalize)?;
        queue
            .submit(move |engine| work(engine).map_err(normalize))
            .map_err(normalize)
    }
}

fn finish_close<E>(
    name: &str,
    outcome: Result<Result<(), EngineError>, E>,
) -> Result<(), DatabaseError> {
    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(normalize(err)),
        // The worker went away without answering; the connection is gone either way.
        Err(_) => {
            debug!(connection = name, "worker exited before acknowledging close");
            Ok(())
        }
    }
}
