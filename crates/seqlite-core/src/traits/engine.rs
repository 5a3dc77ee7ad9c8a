// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The narrow interface an embedded SQL engine exposes to the dispatcher.

use crate::error::EngineError;
use crate::types::{BatchQueryResult, NativeBatchCommand};

/// An open connection to an embedded SQL engine.
///
/// Each open connection is owned by exactly one dispatch worker thread, so
/// implementations only need to be `Send`. Calls on one engine never overlap.
pub trait BatchEngine: Send + 'static {
    /// Executes every command of the batch, in order, as one unit of work.
    ///
    /// How atomic the batch is (one transaction, best effort, ...) is up to
    /// the engine. `ignore_null` is forwarded untouched from the caller's
    /// [`ExecuteOptions`](crate::ExecuteOptions).
    fn execute_batch(
        &mut self,
        commands: &[NativeBatchCommand],
        ignore_null: Option<bool>,
    ) -> Result<BatchQueryResult, EngineError>;

    /// Releases the connection. Runs once, after every queued operation.
    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

impl<E: BatchEngine + ?Sized> BatchEngine for Box<E> {
    fn execute_batch(
        &mut self,
        commands: &[NativeBatchCommand],
        ignore_null: Option<bool>,
    ) -> Result<BatchQueryResult, EngineError> {
        (**self).execute_batch(commands, ignore_null)
    }

    fn close(&mut self) -> Result<(), EngineError> {
        (**self).close()
    }
}
