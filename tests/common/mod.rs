//! Fixture databases for the integration tests, authored with real SQLite
//! through rusqlite so every byte on disk is the genuine article.
//!
//! All fixtures use 512-byte pages, the smallest the format allows, so
//! that even a few hundred rows produce multi-level table and index
//! B-trees.

use std::path::PathBuf;

use rusqlite::Connection;
use tempfile::TempDir;

pub const FIXTURE_PAGE_SIZE: u32 = 512;

/// Creates a database file in `dir`, letting `setup` populate it, and
/// returns its path once the connection is closed and the file complete.
pub fn create_database(
    dir: &TempDir,
    name: &str,
    setup: impl FnOnce(&Connection),
) -> PathBuf {
    let path = dir.path().join(name);
    let conn = Connection::open(&path).expect("open fixture database");
    conn.execute_batch(&format!("PRAGMA page_size = {};", FIXTURE_PAGE_SIZE))
        .expect("set fixture page size");
    setup(&conn);
    path
}

/// `CREATE TABLE test(id INTEGER PRIMARY KEY, name TEXT)` with 500 rows
/// `(k, "name<k>")` and an index on `name`. Deep enough at 512-byte pages
/// that both trees have interior levels.
pub fn numbered_names_fixture(dir: &TempDir) -> PathBuf {
    create_database(dir, "names.db", |conn| {
        conn.execute_batch("CREATE TABLE test(id INTEGER PRIMARY KEY, name TEXT);")
            .expect("create test table");
        conn.execute_batch("BEGIN;").expect("begin");
        {
            let mut insert = conn
                .prepare("INSERT INTO test(id, name) VALUES (?1, ?2)")
                .expect("prepare insert");
            for k in 1..=500i64 {
                insert
                    .execute(rusqlite::params![k, format!("name{}", k)])
                    .expect("insert row");
            }
        }
        conn.execute_batch("COMMIT; CREATE INDEX idx_name ON test(name);")
            .expect("commit and index");
    })
}

/// A table whose index holds `copies` entries with the identical key
/// `"same"`, bracketed by distinct neighbours, so equal keys straddle
/// many leaf pages and land in interior cells.
pub fn duplicate_names_fixture(dir: &TempDir, copies: i64) -> PathBuf {
    create_database(dir, "dup.db", |conn| {
        conn.execute_batch("CREATE TABLE dup(id INTEGER PRIMARY KEY, name TEXT);")
            .expect("create dup table");
        conn.execute_batch("BEGIN;").expect("begin");
        {
            let mut insert = conn
                .prepare("INSERT INTO dup(id, name) VALUES (?1, ?2)")
                .expect("prepare insert");
            for k in 1..=copies {
                insert
                    .execute(rusqlite::params![k, "same"])
                    .expect("insert duplicate");
            }
            insert
                .execute(rusqlite::params![copies + 1, "aaa before"])
                .expect("insert lower neighbour");
            insert
                .execute(rusqlite::params![copies + 2, "zzz after"])
                .expect("insert upper neighbour");
        }
        conn.execute_batch("COMMIT; CREATE INDEX idx_dup ON dup(name);")
            .expect("commit and index");
    })
}
