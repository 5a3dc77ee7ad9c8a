// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `seqlite exec` command implementation.
//!
//! Opens the database through the dispatcher, runs one batch file through
//! either the blocking or the async entry point, then closes the connection.

use std::path::{Path, PathBuf};

use seqlite_config::SeqliteConfig;
use seqlite_core::{BatchCommand, BatchQueryResult, DatabaseError, ExecuteOptions};
use seqlite_dispatch::{Dispatcher, normalize};
use seqlite_sqlite::SqliteEngine;
use thiserror::Error;
use tracing::info;

use crate::batch_file::{self, BatchFileError};

/// Connection name the CLI registers its database under.
const CONNECTION: &str = "main";

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    BatchFile(#[from] BatchFileError),

    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Options for a single `exec` run.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    pub database: PathBuf,
    pub batch: PathBuf,
    pub use_async: bool,
    pub ignore_null: bool,
    pub simple_nulls: bool,
}

/// Run the `seqlite exec` command and return the batch result.
pub fn run_exec(
    config: &SeqliteConfig,
    request: &ExecRequest,
) -> Result<BatchQueryResult, ExecError> {
    let commands = read_batch(&request.batch)?;

    let dispatcher = Dispatcher::from_config(&config.dispatch);
    if request.simple_nulls {
        dispatcher.set_simple_null_handling(true);
    }

    let engine = SqliteEngine::open(&request.database, &config.storage).map_err(normalize)?;
    dispatcher.open(CONNECTION, engine)?;
    info!(
        database = %request.database.display(),
        commands = commands.len(),
        "executing batch"
    );

    let options = ExecuteOptions {
        ignore_null: request.ignore_null.then_some(true),
    };
    if request.use_async {
        run_async(&dispatcher, commands, options)
    } else {
        let result = dispatcher.execute_batch(CONNECTION, commands, options);
        let closed = dispatcher.close(CONNECTION);
        let result = result?;
        closed?;
        Ok(result)
    }
}

fn run_async(
    dispatcher: &Dispatcher,
    commands: Vec<BatchCommand>,
    options: ExecuteOptions,
) -> Result<BatchQueryResult, ExecError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(ExecError::Runtime)?;
    let pending = dispatcher.execute_batch_async(CONNECTION, commands, options);
    let closing = dispatcher.close_async(CONNECTION);
    let (result, closed) = runtime.block_on(async move { (pending.await, closing.await) });
    let result = result?;
    closed?;
    Ok(result)
}

fn read_batch(path: &Path) -> Result<Vec<BatchCommand>, ExecError> {
    let text = std::fs::read_to_string(path).map_err(|source| ExecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(batch_file::parse_batch(&text)?)
}
