//! # Schema Catalog
//!
//! A database file describes its own contents in the `sqlite_schema`
//! table, a regular table B-tree always rooted at page 1. Each row names
//! an object (`type`, `name`, `tbl_name`, `rootpage`, `sql`); the catalog
//! scans it with the ordinary scan primitive and builds descriptors for
//! every table and index.
//!
//! The traversal engine trusts these descriptors: it needs only a valid
//! root page and, for tables, the index of the rowid-alias column (the
//! column declared `INTEGER PRIMARY KEY`, whose stored value is always
//! NULL). Both come from here; the alias index is extracted from the
//! stored `CREATE TABLE` text by [`ddl`].
//!
//! Schema rows describing views, triggers, and the internal
//! `sqlite_autoindex_*` entries (which carry no SQL) are skipped, as are
//! virtual-table shells with a zero root page.

pub mod ddl;

use eyre::{bail, ensure, Result};
use hashbrown::HashMap;

use crate::query::Row;

/// One column of a table: its name and declared type (possibly empty,
/// since the format allows untyped columns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
}

/// Descriptor for one table B-tree.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub root_page: u32,
    pub sql: String,
    pub columns: Vec<ColumnInfo>,
    /// Index of the column aliasing the rowid, if the table declares one.
    pub rowid_alias: Option<usize>,
}

/// Descriptor for one index B-tree.
#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub name: String,
    pub table_name: String,
    pub root_page: u32,
    pub sql: String,
}

/// The `CREATE TABLE` text of the schema table itself.
pub const SCHEMA_TABLE_SQL: &str =
    "CREATE TABLE sqlite_schema(type text, name text, tbl_name text, rootpage integer, sql text)";

/// The bootstrap descriptor for `sqlite_schema`: always rooted at page 1,
/// never carrying a rowid alias.
pub fn schema_table() -> TableInfo {
    // The bootstrap DDL is a constant; parsing it cannot fail.
    let (columns, rowid_alias) =
        ddl::parse_create_table(SCHEMA_TABLE_SQL).unwrap_or((Vec::new(), None));
    TableInfo {
        name: "sqlite_schema".to_string(),
        root_page: 1,
        sql: SCHEMA_TABLE_SQL.to_string(),
        columns,
        rowid_alias,
    }
}

/// Directory of every table and index in a database, keyed by name.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, TableInfo>,
    indexes: HashMap<String, IndexInfo>,
}

impl Catalog {
    /// Builds a catalog from a scan of the `sqlite_schema` table.
    pub fn from_schema_rows<'a, I>(rows: I) -> Result<Self>
    where
        I: Iterator<Item = Result<Row<'a>>>,
    {
        let mut catalog = Catalog::default();
        catalog
            .tables
            .insert("sqlite_schema".to_string(), schema_table());

        for row in rows {
            let row = row?;
            catalog.add_schema_row(&row)?;
        }
        Ok(catalog)
    }

    fn add_schema_row(&mut self, row: &Row<'_>) -> Result<()> {
        ensure!(
            row.values.len() >= 5,
            "malformed schema record: expected at least 5 columns, got {}",
            row.values.len()
        );

        let Some(kind) = row.values[0].as_text() else {
            bail!("malformed schema record: column 0 (type) is not text");
        };

        match kind {
            "table" => {
                let (Some(name), Some(root_page), Some(sql)) = (
                    row.values[1].as_text(),
                    row.values[3].as_int(),
                    row.values[4].as_text(),
                ) else {
                    bail!(
                        "malformed schema record for table {:?}: unexpected column types",
                        row.values[1].as_text().unwrap_or("?")
                    );
                };
                // Virtual-table shells carry no B-tree.
                let Ok(root_page) = u32::try_from(root_page) else {
                    return Ok(());
                };
                if root_page == 0 {
                    return Ok(());
                }

                let (columns, rowid_alias) = ddl::parse_create_table(sql)?;
                self.tables.insert(
                    name.to_string(),
                    TableInfo {
                        name: name.to_string(),
                        root_page,
                        sql: sql.to_string(),
                        columns,
                        rowid_alias,
                    },
                );
            }
            "index" => {
                // Internal sqlite_autoindex_* entries store NULL sql.
                if row.values[4].is_null() {
                    return Ok(());
                }
                let (Some(name), Some(table_name), Some(root_page), Some(sql)) = (
                    row.values[1].as_text(),
                    row.values[2].as_text(),
                    row.values[3].as_int(),
                    row.values[4].as_text(),
                ) else {
                    bail!(
                        "malformed schema record for index {:?}: unexpected column types",
                        row.values[1].as_text().unwrap_or("?")
                    );
                };
                let Ok(root_page) = u32::try_from(root_page) else {
                    return Ok(());
                };
                if root_page == 0 {
                    return Ok(());
                }

                self.indexes.insert(
                    name.to_string(),
                    IndexInfo {
                        name: name.to_string(),
                        table_name: table_name.to_string(),
                        root_page,
                        sql: sql.to_string(),
                    },
                );
            }
            // Views and triggers hold no B-tree of their own.
            _ => {}
        }
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.get(name)
    }

    pub fn index(&self, name: &str) -> Option<&IndexInfo> {
        self.indexes.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableInfo> {
        self.tables.values()
    }

    pub fn indexes(&self) -> impl Iterator<Item = &IndexInfo> {
        self.indexes.values()
    }
}
