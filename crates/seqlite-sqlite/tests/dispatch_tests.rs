// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: dispatcher driving a real SQLite engine.

use futures::executor::block_on;
use seqlite_config::{DispatchConfig, StorageConfig};
use seqlite_core::{BatchCommand, ErrorKind, ExecuteOptions, Value};
use seqlite_dispatch::Dispatcher;
use seqlite_sqlite::SqliteEngine;
use tempfile::tempdir;

fn dispatcher(simple_null_handling: bool) -> Dispatcher {
    Dispatcher::from_config(&DispatchConfig {
        simple_null_handling,
        ..DispatchConfig::default()
    })
}

#[test]
fn null_insert_through_dispatcher() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db1.db");
    let d = dispatcher(true);
    d.open("db1", SqliteEngine::open(&path, &StorageConfig::default()).unwrap())
        .unwrap();

    d.execute_batch(
        "db1",
        vec![BatchCommand::new("CREATE TABLE t (a TEXT)")],
        ExecuteOptions::default(),
    )
    .unwrap();

    let result = block_on(d.execute_batch_async(
        "db1",
        vec![BatchCommand::with_params(
            "INSERT INTO t VALUES (?)",
            vec![Value::Null.into()],
        )],
        ExecuteOptions::default(),
    ))
    .unwrap();

    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.insert_id, Some(1));
    d.close("db1").unwrap();
}

#[test]
fn async_writes_are_visible_to_later_sync_reads() {
    let d = dispatcher(false);
    d.open(
        "mem",
        SqliteEngine::open_in_memory(&StorageConfig::default()).unwrap(),
    )
    .unwrap();

    let setup = d.execute_batch_async(
        "mem",
        vec![BatchCommand::new("CREATE TABLE t (n INTEGER)")],
        ExecuteOptions::default(),
    );
    let inserts: Vec<_> = (1..=3)
        .map(|n| {
            d.execute_batch_async(
                "mem",
                vec![BatchCommand::with_params(
                    "INSERT INTO t VALUES (?)",
                    vec![Value::Integer(n).into()],
                )],
                ExecuteOptions::default(),
            )
        })
        .collect();

    // Queued behind the writes even though none of them has been awaited.
    let read = d
        .execute_batch(
            "mem",
            vec![BatchCommand::new("SELECT sum(n) AS total FROM t")],
            ExecuteOptions::default(),
        )
        .unwrap();
    assert_eq!(
        read.rows.unwrap()[0].get("total"),
        Some(&Value::Integer(6))
    );

    block_on(setup).unwrap();
    for insert in inserts {
        block_on(insert).unwrap();
    }
}

#[test]
fn sql_error_is_engine_failure_and_queue_continues() {
    let d = dispatcher(false);
    d.open(
        "mem",
        SqliteEngine::open_in_memory(&StorageConfig::default()).unwrap(),
    )
    .unwrap();

    let err = d
        .execute_batch(
            "mem",
            vec![BatchCommand::new("SELECT * FROM missing")],
            ExecuteOptions::default(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineFailure);
    assert!(err.message().contains("no such table"));

    let ok = d
        .execute_batch(
            "mem",
            vec![BatchCommand::new("SELECT 1 AS one")],
            ExecuteOptions::default(),
        )
        .unwrap();
    assert_eq!(ok.rows.unwrap()[0].get("one"), Some(&Value::Integer(1)));
}

#[test]
fn data_survives_close_and_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("persist.db");
    let d = dispatcher(false);

    d.open("db", SqliteEngine::open(&path, &StorageConfig::default()).unwrap())
        .unwrap();
    d.execute_batch(
        "db",
        vec![
            BatchCommand::new("CREATE TABLE t (a INTEGER)"),
            BatchCommand::with_params(
                "INSERT INTO t VALUES (?)",
                vec![vec![Value::Integer(1)].into(), vec![Value::Integer(2)].into()],
            ),
        ],
        ExecuteOptions::default(),
    )
    .unwrap();
    d.close("db").unwrap();

    let err = d
        .execute_batch(
            "db",
            vec![BatchCommand::new("SELECT 1")],
            ExecuteOptions::default(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionNotOpen);

    d.open("db", SqliteEngine::open(&path, &StorageConfig::default()).unwrap())
        .unwrap();
    let result = d
        .execute_batch(
            "db",
            vec![BatchCommand::new("SELECT count(*) AS n FROM t")],
            ExecuteOptions::default(),
        )
        .unwrap();
    assert_eq!(result.rows.unwrap()[0].get("n"), Some(&Value::Integer(2)));
    d.close("db").unwrap();
}
