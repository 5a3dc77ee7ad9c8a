// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for seqlite integration tests.
//!
//! Provides a scriptable engine and a harness around a [`Dispatcher`] so
//! ordering and error handling can be tested without a real database.
//!
//! # Components
//!
//! - [`RecordingEngine`] - Engine that records every invocation and replays scripted responses
//! - [`TestHarness`] - Dispatcher pre-populated with recording engines
//!
//! [`Dispatcher`]: seqlite_dispatch::Dispatcher

pub mod harness;
pub mod recording_engine;

pub use harness::TestHarness;
pub use recording_engine::{Gate, Invocation, InvocationLog, RecordingEngine, Response};
