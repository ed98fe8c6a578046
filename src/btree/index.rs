//! Key lookup in an index B-tree.
//!
//! The seek runs in two phases. The positioning phase descends from the
//! root, binary-searching every interior page for the smallest cell whose
//! payload orders at or after the search key and recording the position
//! taken on a stack; the leaf it lands on is binary-searched for the
//! first payload whose key-prefix is not less than the key. From there
//! the pull phase is an ordinary in-order traversal that resumes from the
//! recorded positions, so matches continue seamlessly across leaf
//! boundaries and through the interior cells between them. It stops at
//! the first payload whose key-prefix no longer equals the key.
//!
//! Every emitted payload ends with the rowid of the table row the entry
//! points at; a payload whose final element is not an integer is
//! malformed.

use eyre::{bail, ensure, Result};
use std::cmp::Ordering;

use super::MAX_DEPTH;
use crate::query::Row;
use crate::records::{compare_records, Record};
use crate::storage::{parse_page, Cells, IndexInteriorCell, IndexLeafCell, Pager};
use crate::types::Value;

/// Lazy key lookup in an index B-tree, yielding every entry whose
/// key-prefix equals the search key, in entry order. Created by
/// [`crate::Database::index_seek`].
#[derive(Debug)]
pub struct IndexSeek<'a, 'k> {
    pager: &'a Pager,
    key: &'k [Value<'k>],
    /// Root page, present until the first pull positions the cursor.
    root: Option<u32>,
    stack: Vec<Frame<'a>>,
    done: bool,
}

#[derive(Debug)]
enum Frame<'a> {
    Leaf {
        page_number: u32,
        cells: Vec<IndexLeafCell<'a>>,
        next: usize,
    },
    Interior {
        page_number: u32,
        cells: Vec<IndexInteriorCell<'a>>,
        right_child: u32,
        /// In-order position: even `2i` descends the left child of cell
        /// `i`, odd `2i + 1` emits the payload of cell `i`, `2n` descends
        /// the right-most child, past that the frame is exhausted.
        pos: usize,
    },
}

enum Step<'a> {
    Candidate(Record<'a>, u32),
    Descend(u32),
    Pop,
    Finished,
}

/// Orders a payload against the search key by the payload's key-prefix
/// (a payload shorter than the key orders as the lesser on a tie).
fn prefix_ordering(payload: &[Value], key: &[Value]) -> Ordering {
    let n = payload.len().min(key.len());
    compare_records(&payload[..n], key)
}

impl<'a, 'k> IndexSeek<'a, 'k> {
    pub(crate) fn new(pager: &'a Pager, root: u32, key: &'k [Value<'k>]) -> Self {
        Self {
            pager,
            key,
            root: Some(root),
            stack: Vec::new(),
            done: false,
        }
    }

    /// Root-to-leaf lower-bound descent, recording the position taken in
    /// every interior page.
    fn position(&mut self, root: u32) -> Result<()> {
        let mut page_number = root;

        for _ in 0..MAX_DEPTH {
            let page = parse_page(self.pager.page(page_number)?, page_number)?;
            match page.cells {
                Cells::LeafIndex(cells) => {
                    let next = cells
                        .partition_point(|c| prefix_ordering(&c.payload, self.key) == Ordering::Less);
                    self.stack.push(Frame::Leaf {
                        page_number,
                        cells,
                        next,
                    });
                    return Ok(());
                }
                Cells::InteriorIndex(cells) => {
                    let right_child = page.right_child.ok_or_else(|| {
                        eyre::eyre!("interior page {} missing right-most child", page_number)
                    })?;
                    let i = cells
                        .partition_point(|c| compare_records(self.key, &c.payload) == Ordering::Greater);
                    let (pos, child) = match cells.get(i) {
                        // Resume at this cell's payload once its left
                        // subtree is exhausted.
                        Some(cell) => (2 * i + 1, cell.left_child),
                        None => (2 * cells.len() + 1, right_child),
                    };
                    self.stack.push(Frame::Interior {
                        page_number,
                        cells,
                        right_child,
                        pos,
                    });
                    page_number = child;
                }
                Cells::LeafTable(_) | Cells::InteriorTable(_) => {
                    bail!(
                        "unexpected page kind 0x{:02x} on page {} during index seek",
                        page.kind as u8,
                        page_number
                    );
                }
            }
        }

        bail!("b-tree deeper than {} levels at page {}", MAX_DEPTH, page_number)
    }

    /// Descends to the leftmost position of the subtree rooted at
    /// `page_number` (used for every descent after positioning).
    fn descend(&mut self, page_number: u32) -> Result<()> {
        ensure!(
            self.stack.len() < MAX_DEPTH,
            "b-tree deeper than {} levels at page {}",
            MAX_DEPTH,
            page_number
        );
        let page = parse_page(self.pager.page(page_number)?, page_number)?;
        match page.cells {
            Cells::LeafIndex(cells) => {
                self.stack.push(Frame::Leaf {
                    page_number,
                    cells,
                    next: 0,
                });
            }
            Cells::InteriorIndex(cells) => {
                let right_child = page.right_child.ok_or_else(|| {
                    eyre::eyre!("interior page {} missing right-most child", page_number)
                })?;
                self.stack.push(Frame::Interior {
                    page_number,
                    cells,
                    right_child,
                    pos: 0,
                });
            }
            Cells::LeafTable(_) | Cells::InteriorTable(_) => {
                bail!(
                    "unexpected page kind 0x{:02x} on page {} during index seek",
                    page.kind as u8,
                    page_number
                );
            }
        }
        Ok(())
    }
}

impl<'a, 'k> Iterator for IndexSeek<'a, 'k> {
    type Item = Result<Row<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(root) = self.root.take() {
            if let Err(e) = self.position(root) {
                self.done = true;
                return Some(Err(e));
            }
        }

        loop {
            let step = match self.stack.last_mut() {
                None => Step::Finished,
                Some(Frame::Leaf {
                    page_number,
                    cells,
                    next,
                }) => {
                    if *next < cells.len() {
                        let i = *next;
                        *next += 1;
                        Step::Candidate(std::mem::take(&mut cells[i].payload), *page_number)
                    } else {
                        Step::Pop
                    }
                }
                Some(Frame::Interior {
                    page_number,
                    cells,
                    right_child,
                    pos,
                }) => {
                    let slots = 2 * cells.len();
                    if *pos < slots && *pos % 2 == 0 {
                        let child = cells[*pos / 2].left_child;
                        *pos += 1;
                        Step::Descend(child)
                    } else if *pos < slots {
                        let i = (*pos - 1) / 2;
                        *pos += 1;
                        Step::Candidate(std::mem::take(&mut cells[i].payload), *page_number)
                    } else if *pos == slots {
                        *pos += 1;
                        Step::Descend(*right_child)
                    } else {
                        Step::Pop
                    }
                }
            };

            match step {
                Step::Candidate(payload, page_number) => {
                    if prefix_ordering(&payload, self.key) != Ordering::Equal {
                        // Entries are non-decreasing: the first mismatch
                        // past the lower bound ends the matches.
                        self.done = true;
                        return None;
                    }
                    if payload.len() <= self.key.len() {
                        // The bare key with nothing to point at; only the
                        // longer entries carry a rowid.
                        continue;
                    }
                    let rowid = match payload.last() {
                        Some(Value::Int(rowid)) => *rowid,
                        _ => {
                            self.done = true;
                            return Some(Err(eyre::eyre!(
                                "malformed index record: rowid is not an integer (page {})",
                                page_number
                            )));
                        }
                    };
                    return Some(Ok(Row {
                        rowid,
                        values: payload,
                    }));
                }
                Step::Descend(child) => {
                    if let Err(e) = self.descend(child) {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
                Step::Pop => {
                    self.stack.pop();
                }
                Step::Finished => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}
