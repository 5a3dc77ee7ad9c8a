// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite batch engine for seqlite.
//!
//! [`SqliteEngine`] owns one `rusqlite` connection and implements
//! [`seqlite_core::BatchEngine`]: each batch runs inside a single
//! transaction, and a failing statement rolls the whole batch back.
//! The engine is not `Sync` and is meant to be owned by a dispatcher worker.

pub mod convert;
pub mod engine;

pub use engine::SqliteEngine;
