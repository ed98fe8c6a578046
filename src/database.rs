//! # Database Handle
//!
//! [`Database`] is the public facade: it owns the memory-mapped file,
//! validates the header at open time, and hands out the schema catalog
//! and the three traversal iterators. All query methods borrow the handle
//! immutably, so any number of scans and seeks may be live at once; the
//! handle cannot be dropped (which unmaps the file) while any of them is.
//!
//! Closing is dropping: there is no explicit close method to misuse
//! mid-iteration.

use std::path::Path;

use eyre::{ensure, Result};

use crate::btree::{IndexSeek, TableScan, TableSeek};
use crate::schema::{schema_table, Catalog, IndexInfo, TableInfo};
use crate::storage::header::TEXT_ENCODING_UTF8;
use crate::storage::{parse_page, BtreePage, DbHeader, Pager};
use crate::types::Value;

/// An open, read-only database file.
#[derive(Debug)]
pub struct Database {
    pager: Pager,
    header: DbHeader,
}

impl Database {
    /// Opens the database file at `path`.
    ///
    /// Validates the file header, including that the file's text encoding
    /// is UTF-8 (the only encoding ferrolite materialises).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let pager = Pager::open(path.as_ref())?;
        let header = *pager.header()?;
        ensure!(
            header.text_encoding() == TEXT_ENCODING_UTF8,
            "unsupported text encoding {}: only UTF-8 databases are supported",
            header.text_encoding()
        );
        Ok(Self { pager, header })
    }

    /// The parsed file header.
    pub fn header(&self) -> &DbHeader {
        &self.header
    }

    /// Reads and parses one B-tree page (mostly useful for inspection;
    /// the traversal iterators read pages themselves).
    pub fn page(&self, number: u32) -> Result<BtreePage<'_>> {
        parse_page(self.pager.page(number)?, number)
    }

    /// Reads the schema catalog by scanning the `sqlite_schema` table.
    pub fn schema(&self) -> Result<Catalog> {
        let bootstrap = schema_table();
        Catalog::from_schema_rows(self.scan(&bootstrap))
    }

    /// In-order scan of every row of `table`, ascending by rowid.
    pub fn scan(&self, table: &TableInfo) -> TableScan<'_> {
        TableScan::new(&self.pager, table.root_page, table.rowid_alias)
    }

    /// Point lookup of the row with the given rowid. Yields one row, or
    /// nothing when the rowid is absent.
    pub fn seek(&self, table: &TableInfo, rowid: i64) -> TableSeek<'_> {
        TableSeek::new(&self.pager, table.root_page, table.rowid_alias, rowid)
    }

    /// Lookup of every entry of `index` whose key-prefix equals `key`, in
    /// entry order. Each yielded row holds the full entry payload; its
    /// rowid is the payload's final element.
    pub fn index_seek<'k>(&self, index: &IndexInfo, key: &'k [Value<'k>]) -> IndexSeek<'_, 'k> {
        IndexSeek::new(&self.pager, index.root_page, key)
    }
}
