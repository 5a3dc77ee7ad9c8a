// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Null sentinel codec.
//!
//! With simple null handling on, every [`Value::Null`] in a command's
//! parameters becomes [`NativeValue::NullSentinel`], including inside array
//! parameters. With it off, values are carried over variant for variant.

use seqlite_core::{BatchCommand, NativeBatchCommand, NativeParam, NativeValue, Param, Value};

/// Translate one scalar, replacing null with the native sentinel.
pub fn encode_value(value: Value) -> NativeValue {
    match value {
        Value::Null => NativeValue::NullSentinel,
        other => pass_through(other),
    }
}

/// Carry a scalar over unchanged.
pub fn pass_through(value: Value) -> NativeValue {
    match value {
        Value::Null => NativeValue::Null,
        Value::Boolean(b) => NativeValue::Boolean(b),
        Value::Integer(i) => NativeValue::Integer(i),
        Value::Real(r) => NativeValue::Real(r),
        Value::Text(s) => NativeValue::Text(s),
        Value::Blob(b) => NativeValue::Blob(b),
    }
}

pub fn encode_param(param: Param, simple_null_handling: bool) -> NativeParam {
    let convert: fn(Value) -> NativeValue = if simple_null_handling {
        encode_value
    } else {
        pass_through
    };
    match param {
        Param::Scalar(value) => NativeParam::Scalar(convert(value)),
        Param::Array(values) => NativeParam::Array(values.into_iter().map(convert).collect()),
    }
}

/// Translate a whole batch. Command order and parameter order are kept.
pub fn encode_commands(
    commands: Vec<BatchCommand>,
    simple_null_handling: bool,
) -> Vec<NativeBatchCommand> {
    commands
        .into_iter()
        .map(|command| NativeBatchCommand {
            query: command.query,
            params: command.params.map(|params| {
                params
                    .into_iter()
                    .map(|p| encode_param(p, simple_null_handling))
                    .collect()
            }),
        })
        .collect()
}
