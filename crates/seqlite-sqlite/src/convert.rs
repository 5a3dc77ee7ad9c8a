// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversions between seqlite values and `rusqlite` values.

use rusqlite::types::{Value as SqlValue, ValueRef};
use seqlite_core::{EngineError, NativeParam, NativeValue, Value};

/// Both null representations bind as SQL NULL.
pub fn to_sql(value: &NativeValue) -> SqlValue {
    match value {
        NativeValue::Null | NativeValue::NullSentinel => SqlValue::Null,
        NativeValue::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        NativeValue::Integer(i) => SqlValue::Integer(*i),
        NativeValue::Real(r) => SqlValue::Real(*r),
        NativeValue::Text(s) => SqlValue::Text(s.clone()),
        NativeValue::Blob(b) => SqlValue::Blob(b.clone()),
    }
}

pub fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

/// Parameter sets a command executes with, in order.
///
/// No parameters or all scalars: one execution. All arrays: one execution per
/// array.
pub fn bindings(params: Option<&[NativeParam]>) -> Result<Vec<Vec<SqlValue>>, EngineError> {
    let params = match params {
        None | Some([]) => return Ok(vec![Vec::new()]),
        Some(params) => params,
    };

    let mut scalars = Vec::new();
    let mut arrays = Vec::new();
    for param in params {
        match param {
            NativeParam::Scalar(value) => scalars.push(to_sql(value)),
            NativeParam::Array(values) => arrays.push(values.iter().map(to_sql).collect()),
        }
    }

    match (scalars.is_empty(), arrays.is_empty()) {
        (false, true) => Ok(vec![scalars]),
        (true, false) => Ok(arrays),
        _ => Err(EngineError::new(
            "parameter list mixes scalar and array parameters",
        )),
    }
}

/// Map a `rusqlite` failure, keeping SQLite's extended result code.
pub fn map_sqlite_err(e: rusqlite::Error) -> EngineError {
    match e {
        rusqlite::Error::SqliteFailure(code, Some(message)) => {
            EngineError::with_code(code.extended_code, message)
        }
        rusqlite::Error::SqliteFailure(code, None) => {
            EngineError::with_code(code.extended_code, code.to_string())
        }
        other => EngineError::new(other.to_string()),
    }
}
