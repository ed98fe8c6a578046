//! # B-Tree Traversal Engine
//!
//! Table rows live in table B-trees keyed by rowid; index entries live in
//! index B-trees keyed by the record comparator. This module walks both,
//! exposing three operations that each return a lazy row iterator:
//!
//! - [`TableScan`]: depth-first, left-to-right in-order traversal of a
//!   table tree, yielding rows in ascending rowid order
//! - [`TableSeek`]: root-to-leaf binary-search descent for one rowid
//! - [`IndexSeek`]: lower-bound descent plus in-order walk yielding every
//!   entry whose key-prefix equals the search key
//!
//! ## Laziness
//!
//! A page is read and parsed only when the traversal descends into it. A
//! consumer that stops pulling stops all page reads; dropping an iterator
//! mid-flight costs nothing further.
//!
//! ## Duplicate keys
//!
//! Equal index keys can span several leaf pages, with some of the equal
//! entries stored in *interior* cells between them (interior index cells
//! carry real entries, not just separators). [`IndexSeek`] therefore
//! remembers its position in every interior page on a stack and continues
//! in order across leaf boundaries, emitting leaf and interior payloads
//! alike, until the first entry whose key-prefix no longer matches.
//!
//! ## Rowid materialisation
//!
//! A table column declared `INTEGER PRIMARY KEY` aliases the rowid; its
//! stored value in every record is NULL. Before a row is emitted the
//! engine overwrites that column with the cell's rowid, so consumers see
//! the identifier where the schema declares it. Tables without an alias
//! column are left untouched; the rowid is still available on
//! [`crate::query::Row`].
//!
//! ## Error Discipline
//!
//! The first error on any iterator (I/O, page parsing, record decoding,
//! or an unexpected page kind behind a B-tree edge) is terminal: it is
//! yielded once and every subsequent pull returns `None`.

mod index;
mod scan;
mod seek;

pub use index::IndexSeek;
pub use scan::TableScan;
pub use seek::TableSeek;

use crate::records::Record;
use crate::types::Value;

/// Deeper trees than this are assumed corrupt (a healthy tree of even the
/// smallest page size stays far below it); the bound keeps traversal from
/// looping forever on a page cycle.
const MAX_DEPTH: usize = 64;

/// Overwrites the rowid-alias column, when the table declares one, with
/// the cell's rowid. The stored value of an alias column is always NULL.
fn materialise_rowid(values: &mut Record<'_>, rowid: i64, rowid_alias: Option<usize>) {
    if let Some(index) = rowid_alias {
        if let Some(slot) = values.get_mut(index) {
            *slot = Value::Int(rowid);
        }
    }
}
