// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON batch files and JSON rendering of batch results.
//!
//! A batch file is a JSON array of commands:
//!
//! ```json
//! [
//!   { "query": "CREATE TABLE t (a, b)" },
//!   { "query": "INSERT INTO t VALUES (?, ?)", "params": [1, null] },
//!   { "query": "INSERT INTO t VALUES (?, ?)", "params": [[2, "x"], [3, {"blob": "00ff"}]] }
//! ]
//! ```
//!
//! A JSON array parameter becomes an array parameter; blobs are written as
//! `{"blob": "<hex>"}`.

use serde_json::{Map, Value as Json, json};
use thiserror::Error;

use seqlite_core::{BatchCommand, BatchQueryResult, Param, Row, Value};

#[derive(Debug, Error)]
pub enum BatchFileError {
    #[error("batch file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("batch file must be a JSON array of commands")]
    NotAnArray,

    #[error("command {index}: {detail}")]
    Command { index: usize, detail: String },
}

/// Parse the contents of a batch file.
pub fn parse_batch(text: &str) -> Result<Vec<BatchCommand>, BatchFileError> {
    let Json::Array(entries) = serde_json::from_str::<Json>(text)? else {
        return Err(BatchFileError::NotAnArray);
    };
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            parse_command(entry).map_err(|detail| BatchFileError::Command { index, detail })
        })
        .collect()
}

fn parse_command(entry: Json) -> Result<BatchCommand, String> {
    let Json::Object(mut fields) = entry else {
        return Err("expected an object with a \"query\" field".to_string());
    };
    let query = match fields.remove("query") {
        Some(Json::String(query)) => query,
        _ => return Err("\"query\" must be a string".to_string()),
    };
    let params = match fields.remove("params") {
        None | Some(Json::Null) => None,
        Some(Json::Array(params)) => Some(
            params
                .into_iter()
                .map(parse_param)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(_) => return Err("\"params\" must be an array".to_string()),
    };
    if let Some(key) = fields.keys().next() {
        return Err(format!("unknown field \"{key}\""));
    }
    Ok(BatchCommand { query, params })
}

fn parse_param(param: Json) -> Result<Param, String> {
    match param {
        Json::Array(values) => values
            .into_iter()
            .map(parse_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Param::Array),
        other => parse_value(other).map(Param::Scalar),
    }
}

fn parse_value(value: Json) -> Result<Value, String> {
    match value {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Boolean(b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Integer(i)),
            None => n
                .as_f64()
                .map(Value::Real)
                .ok_or_else(|| format!("number {n} is out of range")),
        },
        Json::String(s) => Ok(Value::Text(s)),
        Json::Object(fields) => match fields.get("blob") {
            Some(Json::String(encoded)) if fields.len() == 1 => hex::decode(encoded)
                .map(Value::Blob)
                .map_err(|e| format!("invalid blob hex: {e}")),
            _ => Err("objects are only allowed as {\"blob\": \"<hex>\"}".to_string()),
        },
        Json::Array(_) => Err("array parameters cannot be nested".to_string()),
    }
}

/// Render a batch result as JSON. Rows become objects keyed by column name.
pub fn result_to_json(result: &BatchQueryResult) -> Json {
    let statements: Vec<Json> = result
        .statements
        .iter()
        .map(|s| json!({ "rows_affected": s.rows_affected, "insert_id": s.insert_id }))
        .collect();
    let rows = result
        .rows
        .as_ref()
        .map(|rows| Json::Array(rows.iter().map(row_to_json).collect()));

    json!({
        "rows_affected": result.rows_affected,
        "insert_id": result.insert_id,
        "rows": rows,
        "statements": statements,
    })
}

fn row_to_json(row: &Row) -> Json {
    let mut object = Map::new();
    for (name, value) in &row.columns {
        object.insert(name.clone(), value_to_json(value));
    }
    Json::Object(object)
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Integer(i) => json!(i),
        Value::Real(r) => json!(r),
        Value::Text(s) => Json::String(s.clone()),
        Value::Blob(b) => json!({ "blob": hex::encode(b) }),
    }
}
