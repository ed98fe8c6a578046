//! Point lookup by rowid.
//!
//! A rowid seek is a root-to-leaf descent: interior pages are
//! binary-searched for the child whose key range covers the target, leaf
//! pages for the exact rowid. The whole descent runs on the first pull;
//! the iterator yields at most one row.

use eyre::{bail, Result};

use super::{materialise_rowid, MAX_DEPTH};
use crate::query::Row;
use crate::storage::{parse_page, Cells, Pager};

/// Lazy point lookup in a table B-tree. Yields the matching row, or
/// nothing when the rowid is absent. Created by [`crate::Database::seek`].
#[derive(Debug)]
pub struct TableSeek<'a> {
    pager: &'a Pager,
    rowid_alias: Option<usize>,
    rowid: i64,
    /// Root page, present until the single pull consumes it.
    root: Option<u32>,
}

impl<'a> TableSeek<'a> {
    pub(crate) fn new(pager: &'a Pager, root: u32, rowid_alias: Option<usize>, rowid: i64) -> Self {
        Self {
            pager,
            rowid_alias,
            rowid,
            root: Some(root),
        }
    }

    fn locate(&self, root: u32) -> Result<Option<Row<'a>>> {
        let mut page_number = root;

        for _ in 0..MAX_DEPTH {
            let page = parse_page(self.pager.page(page_number)?, page_number)?;
            match page.cells {
                Cells::LeafTable(mut cells) => {
                    return Ok(match cells.binary_search_by(|c| c.rowid.cmp(&self.rowid)) {
                        Ok(i) => {
                            let rowid = cells[i].rowid;
                            let mut values = std::mem::take(&mut cells[i].record);
                            materialise_rowid(&mut values, rowid, self.rowid_alias);
                            Some(Row { rowid, values })
                        }
                        Err(_) => None,
                    });
                }
                Cells::InteriorTable(cells) => {
                    // Smallest cell whose key covers the target; past the
                    // last key the row can only live under the right-most
                    // child.
                    let i = cells.partition_point(|c| c.key < self.rowid);
                    page_number = match cells.get(i) {
                        Some(cell) => cell.left_child,
                        None => page.right_child.ok_or_else(|| {
                            eyre::eyre!("interior page {} missing right-most child", page_number)
                        })?,
                    };
                }
                Cells::LeafIndex(_) | Cells::InteriorIndex(_) => {
                    bail!(
                        "unexpected page kind 0x{:02x} on page {} during rowid seek",
                        page.kind as u8,
                        page_number
                    );
                }
            }
        }

        bail!("b-tree deeper than {} levels at page {}", MAX_DEPTH, page_number)
    }
}

impl<'a> Iterator for TableSeek<'a> {
    type Item = Result<Row<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let root = self.root.take()?;
        self.locate(root).transpose()
    }
}
