// SPDX-FileCopyrightText: 2026 Seqlite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the BatchEngine trait.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Statement, params_from_iter};
use tracing::debug;

use seqlite_config::StorageConfig;
use seqlite_core::{
    BatchEngine, BatchQueryResult, EngineError, NativeBatchCommand, Row, StatementOutcome,
};

use crate::convert::{self, map_sqlite_err};

/// A batch engine backed by a single SQLite connection.
///
/// The connection is released by [`BatchEngine::close`]; calls after that
/// fail with an engine error.
pub struct SqliteEngine {
    conn: Option<Connection>,
    path: Option<PathBuf>,
    wal_mode: bool,
}

impl SqliteEngine {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, config: &StorageConfig) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(map_sqlite_err)?;
        configure_connection(&conn, config, true).map_err(map_sqlite_err)?;
        debug!(path = %path.display(), "SQLite engine opened");
        Ok(Self {
            conn: Some(conn),
            path: Some(path.to_path_buf()),
            wal_mode: config.wal_mode,
        })
    }

    /// Open a private in-memory database. WAL does not apply.
    pub fn open_in_memory(config: &StorageConfig) -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_err)?;
        configure_connection(&conn, config, false).map_err(map_sqlite_err)?;
        Ok(Self {
            conn: Some(conn),
            path: None,
            wal_mode: false,
        })
    }

    /// Database file path, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&mut self) -> Result<&mut Connection, EngineError> {
        self.conn
            .as_mut()
            .ok_or_else(|| EngineError::new("SQLite connection is closed"))
    }
}

fn configure_connection(
    conn: &Connection,
    config: &StorageConfig,
    file_backed: bool,
) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    if config.wal_mode && file_backed {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    }
    Ok(())
}

impl BatchEngine for SqliteEngine {
    fn execute_batch(
        &mut self,
        commands: &[NativeBatchCommand],
        ignore_null: Option<bool>,
    ) -> Result<BatchQueryResult, EngineError> {
        let skip_nulls = ignore_null.unwrap_or(false);
        let conn = self.conn()?;
        let tx = conn.transaction().map_err(map_sqlite_err)?;

        let mut result = BatchQueryResult::default();
        let mut rows: Option<Vec<Row>> = None;

        for command in commands {
            let sets = convert::bindings(command.params.as_deref())?;
            let inserts = is_insert(&command.query);
            let mut stmt = tx.prepare(&command.query).map_err(map_sqlite_err)?;
            for set in &sets {
                let before = ChangeCounters::sample(&tx);
                run_statement(&mut stmt, set, skip_nulls, &mut rows).map_err(map_sqlite_err)?;
                let outcome = before.outcome(&tx, inserts);
                result.rows_affected += outcome.rows_affected;
                if outcome.insert_id.is_some() {
                    result.insert_id = outcome.insert_id;
                }
                result.statements.push(outcome);
            }
        }

        // Dropping an uncommitted transaction rolls the whole batch back.
        tx.commit().map_err(map_sqlite_err)?;
        result.rows = rows;
        debug!(
            commands = commands.len(),
            rows_affected = result.rows_affected,
            "SQLite batch committed"
        );
        Ok(result)
    }

    fn close(&mut self) -> Result<(), EngineError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if self.wal_mode {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(map_sqlite_err)?;
            debug!("WAL checkpoint complete");
        }
        conn.close().map_err(|(_, e)| map_sqlite_err(e))
    }
}

/// Connection change counters sampled before a statement runs.
///
/// `sqlite3_changes` keeps its old value across DDL and other non-DML
/// statements, so a statement only counts as a write when the connection's
/// total change counter moved.
struct ChangeCounters {
    total_changes: u64,
    last_rowid: i64,
}

impl ChangeCounters {
    fn sample(conn: &Connection) -> Self {
        Self {
            total_changes: conn.total_changes(),
            last_rowid: conn.last_insert_rowid(),
        }
    }

    /// Outcome of the statement that ran since `self` was sampled.
    fn outcome(&self, conn: &Connection, inserts: bool) -> StatementOutcome {
        if conn.total_changes() == self.total_changes {
            return StatementOutcome::default();
        }
        // `changes()` leaves out rows written by triggers; the total counts them.
        let rowid = conn.last_insert_rowid();
        StatementOutcome {
            rows_affected: conn.changes(),
            insert_id: (inserts || rowid != self.last_rowid).then_some(rowid),
        }
    }
}

/// Whether `query` starts with `INSERT` or `REPLACE`.
///
/// A rowid equal to the previous one (`INSERT OR REPLACE` of the same key)
/// leaves `last_insert_rowid` unchanged, so inserts are recognized by keyword.
fn is_insert(query: &str) -> bool {
    let keyword = query
        .trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
}

/// Execute one prepared statement with one parameter set, collecting any rows.
fn run_statement(
    stmt: &mut Statement<'_>,
    params: &[rusqlite::types::Value],
    skip_nulls: bool,
    rows: &mut Option<Vec<Row>>,
) -> rusqlite::Result<()> {
    if stmt.column_count() == 0 {
        stmt.execute(params_from_iter(params))?;
        return Ok(());
    }

    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let collected = rows.get_or_insert_with(Vec::new);
    let mut cursor = stmt.query(params_from_iter(params))?;
    while let Some(row) = cursor.next()? {
        let mut columns = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let value = convert::from_sql(row.get_ref(index)?);
            if skip_nulls && value.is_null() {
                continue;
            }
            columns.push((name.clone(), value));
        }
        collected.push(Row { columns });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use seqlite_core::{NativeParam, NativeValue, Value};
    use tempfile::tempdir;

    use super::*;

    fn memory() -> SqliteEngine {
        SqliteEngine::open_in_memory(&StorageConfig::default()).unwrap()
    }

    fn cmd(query: &str) -> NativeBatchCommand {
        NativeBatchCommand {
            query: query.to_string(),
            params: None,
        }
    }

    fn cmd_with(query: &str, params: Vec<NativeParam>) -> NativeBatchCommand {
        NativeBatchCommand {
            query: query.to_string(),
            params: Some(params),
        }
    }

    fn count(engine: &mut SqliteEngine, table: &str) -> i64 {
        let result = engine
            .execute_batch(&[cmd(&format!("SELECT count(*) AS n FROM {table}"))], None)
            .unwrap();
        match result.rows.unwrap()[0].get("n") {
            Some(Value::Integer(n)) => *n,
            other => panic!("unexpected count value: {other:?}"),
        }
    }

    #[test]
    fn insert_reports_rows_affected_and_insert_id() {
        let mut engine = memory();
        engine
            .execute_batch(&[cmd("CREATE TABLE t (id INTEGER PRIMARY KEY, a TEXT, b TEXT)")], None)
            .unwrap();

        let result = engine
            .execute_batch(
                &[cmd_with(
                    "INSERT INTO t (a, b) VALUES (?, ?)",
                    vec![
                        NativeParam::Scalar(NativeValue::Text("x".into())),
                        NativeParam::Scalar(NativeValue::NullSentinel),
                    ],
                )],
                None,
            )
            .unwrap();

        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.insert_id, Some(1));
        assert_eq!(result.rows, None);
        assert_eq!(result.statements.len(), 1);
    }

    #[test]
    fn schema_statements_after_a_write_report_no_changes() {
        let mut engine = memory();
        let result = engine
            .execute_batch(
                &[
                    cmd("CREATE TABLE t (a INTEGER)"),
                    cmd("INSERT INTO t VALUES (1), (2), (3)"),
                    cmd("CREATE TABLE u (b INTEGER)"),
                    cmd("CREATE INDEX ti ON t(a)"),
                ],
                None,
            )
            .unwrap();

        let per_statement: Vec<u64> = result.statements.iter().map(|s| s.rows_affected).collect();
        assert_eq!(per_statement, vec![0, 3, 0, 0]);
        assert_eq!(result.rows_affected, 3);
        assert_eq!(result.statements[2].insert_id, None);
        assert_eq!(result.statements[3].insert_id, None);
    }

    #[test]
    fn replacing_the_same_key_still_reports_insert_id() {
        let mut engine = memory();
        engine
            .execute_batch(
                &[
                    cmd("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT)"),
                    cmd("INSERT INTO t VALUES (1, 'a')"),
                ],
                None,
            )
            .unwrap();

        let result = engine
            .execute_batch(&[cmd("INSERT OR REPLACE INTO t VALUES (1, 'b')")], None)
            .unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.insert_id, Some(1));

        let result = engine
            .execute_batch(
                &[
                    cmd("DELETE FROM t WHERE id = 1"),
                    cmd("INSERT INTO t VALUES (1, 'c')"),
                ],
                None,
            )
            .unwrap();
        assert_eq!(result.statements[0].insert_id, None);
        assert_eq!(result.statements[1].insert_id, Some(1));
        assert_eq!(result.insert_id, Some(1));
    }

    #[test]
    fn updates_and_empty_writes_carry_no_insert_id() {
        let mut engine = memory();
        let result = engine
            .execute_batch(
                &[
                    cmd("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT)"),
                    cmd("INSERT INTO t (v) VALUES ('a'), ('b')"),
                    cmd("UPDATE t SET v = 'z'"),
                    cmd("INSERT INTO t (v) SELECT v FROM t WHERE 0"),
                ],
                None,
            )
            .unwrap();

        assert_eq!(
            result.statements[2],
            StatementOutcome {
                rows_affected: 2,
                insert_id: None,
            }
        );
        assert_eq!(result.statements[3], StatementOutcome::default());
        assert_eq!(result.rows_affected, 4);
        assert_eq!(result.insert_id, Some(2));
    }

    #[test]
    fn insert_keyword_detection() {
        assert!(is_insert("INSERT INTO t VALUES (1)"));
        assert!(is_insert("  insert or replace into t values (1)"));
        assert!(is_insert("REPLACE INTO t VALUES (1)"));
        assert!(!is_insert("UPDATE t SET a = 1"));
        assert!(!is_insert("INSERTED"));
        assert!(!is_insert(""));
    }

    #[test]
    fn sentinel_is_stored_as_null() {
        let mut engine = memory();
        engine
            .execute_batch(
                &[
                    cmd("CREATE TABLE t (a INTEGER)"),
                    cmd_with(
                        "INSERT INTO t VALUES (?)",
                        vec![NativeParam::Scalar(NativeValue::NullSentinel)],
                    ),
                ],
                None,
            )
            .unwrap();
        let result = engine
            .execute_batch(&[cmd("SELECT a IS NULL AS missing FROM t")], None)
            .unwrap();
        assert_eq!(
            result.rows.unwrap()[0].get("missing"),
            Some(&Value::Integer(1))
        );
    }

    #[test]
    fn array_params_execute_once_per_array() {
        let mut engine = memory();
        let result = engine
            .execute_batch(
                &[
                    cmd("CREATE TABLE t (a INTEGER, b TEXT)"),
                    cmd_with(
                        "INSERT INTO t VALUES (?, ?)",
                        vec![
                            NativeParam::Array(vec![
                                NativeValue::Integer(1),
                                NativeValue::Text("one".into()),
                            ]),
                            NativeParam::Array(vec![
                                NativeValue::Integer(2),
                                NativeValue::Text("two".into()),
                            ]),
                            NativeParam::Array(vec![NativeValue::Integer(3), NativeValue::Null]),
                        ],
                    ),
                ],
                None,
            )
            .unwrap();

        assert_eq!(result.rows_affected, 3);
        assert_eq!(result.insert_id, Some(3));
        assert_eq!(result.statements.len(), 4);
        assert_eq!(count(&mut engine, "t"), 3);
    }

    #[test]
    fn failing_statement_rolls_back_whole_batch() {
        let mut engine = memory();
        engine
            .execute_batch(&[cmd("CREATE TABLE t (a INTEGER)")], None)
            .unwrap();

        let err = engine
            .execute_batch(
                &[
                    cmd("INSERT INTO t VALUES (1)"),
                    cmd("INSERT INTO missing VALUES (2)"),
                ],
                None,
            )
            .unwrap_err();

        assert!(err.message.contains("no such table: missing"));
        assert!(err.code.is_some());
        assert_eq!(count(&mut engine, "t"), 0);
    }

    #[test]
    fn ignore_null_omits_null_columns() {
        let mut engine = memory();
        engine
            .execute_batch(
                &[
                    cmd("CREATE TABLE t (a INTEGER, b TEXT)"),
                    cmd("INSERT INTO t VALUES (1, NULL)"),
                ],
                None,
            )
            .unwrap();

        let kept = engine
            .execute_batch(&[cmd("SELECT a, b FROM t")], Some(false))
            .unwrap();
        assert_eq!(kept.rows.unwrap()[0].columns.len(), 2);

        let shaped = engine
            .execute_batch(&[cmd("SELECT a, b FROM t")], Some(true))
            .unwrap();
        let rows = shaped.rows.unwrap();
        let row = &rows[0];
        assert_eq!(row.columns, vec![("a".to_string(), Value::Integer(1))]);
        assert_eq!(row.get("b"), None);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let mut engine = memory();
        engine
            .execute_batch(
                &[
                    cmd("CREATE TABLE parent (id INTEGER PRIMARY KEY)"),
                    cmd("CREATE TABLE child (parent_id INTEGER REFERENCES parent(id))"),
                ],
                None,
            )
            .unwrap();
        let err = engine
            .execute_batch(&[cmd("INSERT INTO child VALUES (42)")], None)
            .unwrap_err();
        assert!(err.message.contains("FOREIGN KEY"));
    }

    #[test]
    fn file_database_uses_wal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wal.db");
        let mut engine = SqliteEngine::open(&path, &StorageConfig::default()).unwrap();
        assert_eq!(engine.path(), Some(path.as_path()));

        let result = engine
            .execute_batch(&[cmd("PRAGMA journal_mode")], None)
            .unwrap();
        assert_eq!(
            result.rows.unwrap()[0].columns[0].1,
            Value::Text("wal".into())
        );
        engine.close().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn closed_engine_rejects_batches() {
        let mut engine = memory();
        engine.close().unwrap();
        engine.close().unwrap();
        let err = engine.execute_batch(&[cmd("SELECT 1")], None).unwrap_err();
        assert!(err.message.contains("closed"));
    }
}
