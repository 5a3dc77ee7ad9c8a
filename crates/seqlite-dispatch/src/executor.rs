// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch execution: argument checks, null encoding, and the one engine call.

use seqlite_core::{
    BatchCommand, BatchEngine, BatchQueryResult, DatabaseError, ExecuteOptions,
    NativeBatchCommand, Param,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::codec;
use crate::normalize::normalize;

/// A command or parameter list with an unusable shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("connection name must not be empty")]
    EmptyConnectionName,

    #[error("command {index} has an empty query")]
    EmptyQuery { index: usize },

    #[error("command {index} mixes scalar and array parameters")]
    MixedParams { index: usize },
}

pub fn validate_connection_name(name: &str) -> Result<(), ArgumentError> {
    if name.trim().is_empty() {
        return Err(ArgumentError::EmptyConnectionName);
    }
    Ok(())
}

/// Reject commands the engine could not bind.
///
/// A parameter list is either all scalars (one execution) or all arrays (one
/// execution per array); mixing the two has no meaning.
pub fn validate_commands(commands: &[BatchCommand]) -> Result<(), ArgumentError> {
    for (index, command) in commands.iter().enumerate() {
        if command.query.trim().is_empty() {
            return Err(ArgumentError::EmptyQuery { index });
        }
        if let Some(params) = &command.params {
            let arrays = params
                .iter()
                .filter(|p| matches!(p, Param::Array(_)))
                .count();
            if arrays != 0 && arrays != params.len() {
                return Err(ArgumentError::MixedParams { index });
            }
        }
    }
    Ok(())
}

/// Validate and encode a batch. Runs before the batch is queued.
pub fn prepare(
    commands: Vec<BatchCommand>,
    simple_null_handling: bool,
) -> Result<Vec<NativeBatchCommand>, ArgumentError> {
    validate_commands(&commands)?;
    Ok(codec::encode_commands(commands, simple_null_handling))
}

/// Hand the whole batch to the engine in a single call.
///
/// Runs on the connection's worker; the engine's result is returned as is.
pub fn run_batch(
    connection: &str,
    engine: &mut dyn BatchEngine,
    commands: &[NativeBatchCommand],
    options: ExecuteOptions,
) -> Result<BatchQueryResult, DatabaseError> {
    match engine.execute_batch(commands, options.ignore_null) {
        Ok(result) => {
            debug!(
                connection,
                commands = commands.len(),
                rows_affected = result.rows_affected,
                "batch executed"
            );
            Ok(result)
        }
        Err(err) => {
            warn!(connection, error = %err, "batch failed");
            Err(normalize(err))
        }
    }
}
