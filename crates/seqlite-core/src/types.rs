// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value, command, and result types that flow through the dispatch layer.
//!
//! Application-facing types ([`Value`], [`Param`], [`BatchCommand`]) use
//! [`Value::Null`] for a missing value. Engine-facing types ([`NativeValue`],
//! [`NativeParam`], [`NativeBatchCommand`]) carry
//! [`NativeValue::NullSentinel`] instead once the null codec has run.

use serde::{Deserialize, Serialize};

/// An application-level scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A single bound parameter: either one scalar or a flat array of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Param {
    Scalar(Value),
    Array(Vec<Value>),
}

impl From<Value> for Param {
    fn from(v: Value) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<Value>> for Param {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

/// One statement in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCommand {
    pub query: String,
    #[serde(default)]
    pub params: Option<Vec<Param>>,
}

impl BatchCommand {
    /// A command with no bound parameters.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: None,
        }
    }

    pub fn with_params(query: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            query: query.into(),
            params: Some(params),
        }
    }
}

/// Engine-level scalar.
///
/// `Null` only reaches an engine when simple null handling is disabled; with
/// it enabled every application null arrives as `NullSentinel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NativeValue {
    Null,
    NullSentinel,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl NativeValue {
    /// True for both null representations.
    pub fn is_absent(&self) -> bool {
        matches!(self, NativeValue::Null | NativeValue::NullSentinel)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NativeParam {
    Scalar(NativeValue),
    Array(Vec<NativeValue>),
}

/// A command as handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeBatchCommand {
    pub query: String,
    pub params: Option<Vec<NativeParam>>,
}

/// Per-call options forwarded to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteOptions {
    /// Ask the engine to leave NULL columns out of returned rows.
    pub ignore_null: Option<bool>,
}

/// One result row. Columns keep the order the engine produced them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Metadata for one executed statement within a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementOutcome {
    pub rows_affected: u64,
    pub insert_id: Option<i64>,
}

/// Result of a whole batch, as produced by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchQueryResult {
    pub rows_affected: u64,
    pub insert_id: Option<i64>,
    pub rows: Option<Vec<Row>>,
    #[serde(default)]
    pub statements: Vec<StatementOutcome>,
}
