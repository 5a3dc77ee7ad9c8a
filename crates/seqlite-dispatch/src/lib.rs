// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered, per-connection dispatch of batched SQL.
//!
//! A [`Dispatcher`] keeps one FIFO queue per open connection. Batches
//! submitted through [`Dispatcher::execute_batch`] (blocking) and
//! [`Dispatcher::execute_batch_async`] (future) share that queue, so a
//! connection's engine sees them in submission order and one at a time.
//! Every failure is reported as a [`seqlite_core::DatabaseError`].

pub mod codec;
pub mod dispatcher;
pub mod executor;
pub mod normalize;
pub mod registry;
pub mod sequencer;

pub use dispatcher::{DispatchSettings, Dispatcher};
pub use executor::ArgumentError;
pub use normalize::{normalize, normalize_panic};
pub use registry::{ConnectionRegistry, RegistryError};
pub use sequencer::{ConnectionQueue, QueueClosed, Ticket};
