//! # Ferrolite - Read-Only SQLite File Reader
//!
//! Ferrolite reads SQLite 3 database files directly, without linking the
//! SQLite library. It opens a database file, walks the B-tree structures
//! that hold table rows and index entries, and decodes records into typed
//! values. This implementation prioritizes:
//!
//! - **Zero-copy data access**: values borrow straight from the memory map
//! - **Laziness**: a page is read only when a traversal descends into it
//! - **Read-only safety**: the file is never written, locked, or journaled
//!
//! ## Quick Start
//!
//! ```ignore
//! use ferrolite::Database;
//!
//! let db = Database::open("./app.db")?;
//! let schema = db.schema()?;
//! let table = schema.table("users").expect("no such table");
//!
//! for row in db.scan(table) {
//!     let row = row?;
//!     println!("{:?}", row.values);
//! }
//! ```
//!
//! ## Architecture
//!
//! Ferrolite uses a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │       Public API (Database)          │
//! ├─────────────────────────────────────┤
//! │  Schema Catalog │ Filter Combinator  │
//! ├─────────────────┼───────────────────┤
//! │        B-Tree Traversal Engine       │
//! ├─────────────────────────────────────┤
//! │   Record / Serial-Type / Varint      │
//! ├─────────────────────────────────────┤
//! │   Page Parser │ Header │ Pager       │
//! ├─────────────────────────────────────┤
//! │     Memory-Mapped File (read-only)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Query Primitives
//!
//! Three B-tree operations cover the read path:
//!
//! - [`Database::seek`]: point lookup of one row by rowid
//! - [`Database::index_seek`]: lookup of all index entries matching a key
//! - [`Database::scan`]: in-order traversal of every row in a table
//!
//! All three return lazy iterators of `Result<Row>`; dropping an iterator
//! aborts the traversal with no further page reads. [`query::filter`]
//! composes a predicate over any of them.
//!
//! ## Scope
//!
//! Ferrolite is a reader for the common case: rowid tables and their
//! indexes, UTF-8 text encoding, payloads that fit on one page. It does not
//! follow overflow chains, read WAL or journal files, or understand
//! `WITHOUT ROWID` tables. Writing is out of scope by design.
//!
//! ## Module Overview
//!
//! - [`storage`]: file header, pager, page/cell parsing
//! - [`encoding`]: the 1-9 byte varint codec
//! - [`records`]: serial types and record framing
//! - [`types`]: the runtime [`types::Value`] representation and ordering
//! - [`btree`]: seek and scan iterators over table and index trees
//! - [`schema`]: the `sqlite_schema` catalog and `CREATE TABLE` parsing
//! - [`query`]: the row iterator protocol and filter combinator

pub mod btree;
pub mod database;
pub mod encoding;
pub mod query;
pub mod records;
pub mod schema;
pub mod storage;
pub mod types;

pub use database::Database;
pub use query::{filter, Row};
pub use records::{compare_records, parse_record, Record};
pub use schema::{Catalog, IndexInfo, TableInfo};
pub use types::Value;
