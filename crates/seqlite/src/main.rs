// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! seqlite - run ordered SQL batches against SQLite.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod batch_file;
mod exec;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::exec::ExecRequest;

/// seqlite - run ordered SQL batches against SQLite.
#[derive(Parser, Debug)]
#[command(name = "seqlite", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a JSON batch file against a database and print the result.
    Exec(ExecArgs),
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args, Debug)]
struct ExecArgs {
    /// SQLite database file (created if missing).
    database: PathBuf,
    /// JSON file holding an array of commands.
    batch: PathBuf,
    /// Submit through the async entry point.
    #[arg(long = "async")]
    use_async: bool,
    /// Leave NULL columns out of returned rows.
    #[arg(long)]
    ignore_null: bool,
    /// Translate nulls to the engine sentinel, overriding the config.
    #[arg(long)]
    simple_nulls: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = match seqlite_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            seqlite_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Exec(args) => {
            init_tracing(&config.logging.level);
            let request = ExecRequest {
                database: args.database,
                batch: args.batch,
                use_async: args.use_async,
                ignore_null: args.ignore_null,
                simple_nulls: args.simple_nulls,
            };
            match exec::run_exec(&config, &request) {
                Ok(result) => println!("{:#}", batch_file::result_to_json(&result)),
                Err(e) => {
                    eprintln!("seqlite: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Config => match toml::to_string_pretty(&config) {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("seqlite: failed to render config: {e}");
                std::process::exit(1);
            }
        },
    }
}

/// Initialize the tracing subscriber. Logs go to stderr so stdout stays JSON.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("seqlite={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .init();
}
