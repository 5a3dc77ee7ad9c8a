// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the dispatch layer and the engines it drives.

pub mod engine;

pub use engine::BatchEngine;
