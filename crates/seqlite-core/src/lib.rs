// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for seqlite.
//!
//! Defines the value and command types passed through the dispatcher, the
//! [`BatchEngine`] trait engines implement, and the [`DatabaseError`]
//! taxonomy every public entry point reports failures with.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DatabaseError, EngineError, ErrorKind};
pub use traits::BatchEngine;
pub use types::{
    BatchCommand, BatchQueryResult, ExecuteOptions, NativeBatchCommand, NativeParam,
    NativeValue, Param, Row, StatementOutcome, Value,
};
