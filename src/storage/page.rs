//! # B-Tree Page Parser
//!
//! Every page of a database file (apart from freelist and overflow pages,
//! which ferrolite does not traverse) is a B-tree page of one of four
//! kinds, identified by the flag byte at the start of its page header.
//!
//! ## Page Layout
//!
//! ```text
//! +--------------------------+
//! | Page header (8 or 12 B)  |  12 for interior kinds, 8 for leaf kinds
//! +--------------------------+
//! | Cell pointer array       |  2 bytes per cell, big-endian offsets
//! +--------------------------+
//! | Unallocated space        |
//! +--------------------------+
//! | Cell content area        |  grows upward from the end of the page
//! +--------------------------+
//! ```
//!
//! On page 1 the page header begins at offset 100, after the database
//! header; cell pointers are offsets from the start of the page on every
//! page, including page 1.
//!
//! ## Page Header Layout
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -------------------------------------------
//! 0       1     Page kind (0x02, 0x05, 0x0a, 0x0d)
//! 1       2     Offset of the first freeblock (0 = none)
//! 3       2     Number of cells on the page
//! 5       2     Start of the cell content area
//! 7       1     Fragmented free bytes in the content area
//! 8       4     Right-most child page (interior kinds only)
//! ```
//!
//! ## Cell Shapes
//!
//! | kind            | cell contents                                      |
//! |-----------------|----------------------------------------------------|
//! | leaf table      | varint payload size, varint rowid, record payload  |
//! | interior table  | 4-byte left child, varint rowid key                |
//! | leaf index      | varint payload size, record payload                |
//! | interior index  | 4-byte left child, varint payload size, payload    |
//!
//! Index payloads are records whose final element is the rowid the entry
//! points at. Leaf-table and index payloads are decoded eagerly through
//! the record codec, so a parsed page hands the traversal layer typed
//! cells.
//!
//! ## Limits
//!
//! Payloads that do not fit on their page spill onto overflow pages in the
//! full file format. Ferrolite does not follow overflow chains: a cell
//! whose declared payload size extends past its page is rejected with an
//! error naming the page and cell.

use eyre::{ensure, Result, WrapErr};

use super::header::HEADER_SIZE;
use crate::encoding::decode_varint;
use crate::records::{parse_record, Record};

/// The four B-tree page kinds, identified by the page header flag byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    InteriorIndex = 0x02,
    InteriorTable = 0x05,
    LeafIndex = 0x0a,
    LeafTable = 0x0d,
}

impl PageKind {
    /// Parses a page kind from the flag byte.
    pub const fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0x02 => Some(Self::InteriorIndex),
            0x05 => Some(Self::InteriorTable),
            0x0a => Some(Self::LeafIndex),
            0x0d => Some(Self::LeafTable),
            _ => None,
        }
    }

    /// Whether this is an interior (non-leaf) kind.
    pub const fn is_interior(self) -> bool {
        matches!(self, Self::InteriorIndex | Self::InteriorTable)
    }

    /// Page header size: 12 bytes for interior kinds, 8 for leaf kinds.
    pub const fn header_size(self) -> usize {
        if self.is_interior() {
            12
        } else {
            8
        }
    }
}

/// One row on a leaf table page.
#[derive(Debug, Clone)]
pub struct TableLeafCell<'a> {
    pub rowid: i64,
    /// The raw record payload; `record` is its decoded form.
    pub payload: &'a [u8],
    pub record: Record<'a>,
}

/// One navigation cell on an interior table page: rows with
/// `rowid <= key` live under `left_child`.
#[derive(Debug, Clone, Copy)]
pub struct TableInteriorCell {
    pub left_child: u32,
    pub key: i64,
}

/// One entry on a leaf index page. The payload's final element is the
/// rowid the entry points at.
#[derive(Debug, Clone)]
pub struct IndexLeafCell<'a> {
    pub payload: Record<'a>,
}

/// One cell on an interior index page. The payload is itself a real index
/// entry; entries ordering at or below it live under `left_child`.
#[derive(Debug, Clone)]
pub struct IndexInteriorCell<'a> {
    pub left_child: u32,
    pub payload: Record<'a>,
}

/// The decoded cells of a page, by kind.
#[derive(Debug, Clone)]
pub enum Cells<'a> {
    LeafTable(Vec<TableLeafCell<'a>>),
    InteriorTable(Vec<TableInteriorCell>),
    LeafIndex(Vec<IndexLeafCell<'a>>),
    InteriorIndex(Vec<IndexInteriorCell<'a>>),
}

/// A fully parsed B-tree page.
#[derive(Debug, Clone)]
pub struct BtreePage<'a> {
    pub kind: PageKind,
    pub first_freeblock: u16,
    pub cell_count: u16,
    pub cell_content_start: u16,
    pub fragmented_bytes: u8,
    /// Right-most child page number; `None` on leaf kinds.
    pub right_child: Option<u32>,
    pub cells: Cells<'a>,
}

/// Parses the page bytes of 1-based page `page_number`.
///
/// `data` must be one whole page; on page 1 the B-tree header is read at
/// offset 100, past the database header.
pub fn parse_page(data: &[u8], page_number: u32) -> Result<BtreePage<'_>> {
    let header_offset = if page_number == 1 { HEADER_SIZE } else { 0 };
    ensure!(
        data.len() >= header_offset + 8,
        "page {} too small for a page header: {} bytes",
        page_number,
        data.len()
    );

    let header = &data[header_offset..];
    let kind = PageKind::from_flag(header[0]).ok_or_else(|| {
        eyre::eyre!("unexpected page kind 0x{:02x} on page {}", header[0], page_number)
    })?;

    let first_freeblock = u16::from_be_bytes([header[1], header[2]]);
    let cell_count = u16::from_be_bytes([header[3], header[4]]);
    let cell_content_start = u16::from_be_bytes([header[5], header[6]]);
    let fragmented_bytes = header[7];

    let right_child = if kind.is_interior() {
        ensure!(
            header.len() >= 12,
            "page {} too small for an interior page header",
            page_number
        );
        let child = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
        ensure!(child != 0, "page {}: right-most child pointer is zero", page_number);
        Some(child)
    } else {
        None
    };

    let pointer_array_start = header_offset + kind.header_size();
    let cell_area_floor = pointer_array_start + 2 * cell_count as usize;
    ensure!(
        cell_area_floor <= data.len(),
        "page {}: cell pointer array for {} cells extends past the page",
        page_number,
        cell_count
    );

    let mut pointers = Vec::with_capacity(cell_count as usize);
    for i in 0..cell_count as usize {
        let at = pointer_array_start + 2 * i;
        let pointer = u16::from_be_bytes([data[at], data[at + 1]]) as usize;
        ensure!(
            pointer >= cell_area_floor && pointer < data.len(),
            "cell {} on page {}: pointer {} outside the cell area [{}, {})",
            i,
            page_number,
            pointer,
            cell_area_floor,
            data.len()
        );
        pointers.push(pointer);
    }

    let cells = match kind {
        PageKind::LeafTable => {
            let mut cells = Vec::with_capacity(pointers.len());
            for (i, &pointer) in pointers.iter().enumerate() {
                let cell = &data[pointer..];
                let (payload_size, n) = decode_varint(cell);
                let (rowid, m) = decode_varint(&cell[n..]);
                let payload = payload_slice(cell, n + m, payload_size, page_number, i)?;
                let record = parse_record(payload)
                    .wrap_err_with(|| format!("cell {} on page {}", i, page_number))?;
                cells.push(TableLeafCell { rowid, payload, record });
            }
            Cells::LeafTable(cells)
        }
        PageKind::InteriorTable => {
            let mut cells = Vec::with_capacity(pointers.len());
            for (i, &pointer) in pointers.iter().enumerate() {
                let cell = &data[pointer..];
                let left_child = child_pointer(cell, page_number, i)?;
                let (key, _) = decode_varint(&cell[4..]);
                cells.push(TableInteriorCell { left_child, key });
            }
            Cells::InteriorTable(cells)
        }
        PageKind::LeafIndex => {
            let mut cells = Vec::with_capacity(pointers.len());
            for (i, &pointer) in pointers.iter().enumerate() {
                let cell = &data[pointer..];
                let (payload_size, n) = decode_varint(cell);
                let payload = payload_slice(cell, n, payload_size, page_number, i)?;
                let payload = parse_record(payload)
                    .wrap_err_with(|| format!("cell {} on page {}", i, page_number))?;
                cells.push(IndexLeafCell { payload });
            }
            Cells::LeafIndex(cells)
        }
        PageKind::InteriorIndex => {
            let mut cells = Vec::with_capacity(pointers.len());
            for (i, &pointer) in pointers.iter().enumerate() {
                let cell = &data[pointer..];
                let left_child = child_pointer(cell, page_number, i)?;
                let (payload_size, n) = decode_varint(&cell[4..]);
                let payload = payload_slice(cell, 4 + n, payload_size, page_number, i)?;
                let payload = parse_record(payload)
                    .wrap_err_with(|| format!("cell {} on page {}", i, page_number))?;
                cells.push(IndexInteriorCell { left_child, payload });
            }
            Cells::InteriorIndex(cells)
        }
    };

    Ok(BtreePage {
        kind,
        first_freeblock,
        cell_count,
        cell_content_start,
        fragmented_bytes,
        right_child,
        cells,
    })
}

/// Reads and validates the 4-byte left-child pointer of an interior cell.
fn child_pointer(cell: &[u8], page_number: u32, index: usize) -> Result<u32> {
    ensure!(
        cell.len() >= 4,
        "cell {} on page {}: truncated interior cell",
        index,
        page_number
    );
    let child = u32::from_be_bytes([cell[0], cell[1], cell[2], cell[3]]);
    ensure!(
        child != 0,
        "cell {} on page {}: left child pointer is zero",
        index,
        page_number
    );
    Ok(child)
}

/// Slices `payload_size` payload bytes starting at `cell[start..]`,
/// rejecting payloads that would spill past the page.
fn payload_slice<'a>(
    cell: &'a [u8],
    start: usize,
    payload_size: i64,
    page_number: u32,
    index: usize,
) -> Result<&'a [u8]> {
    ensure!(
        payload_size >= 0,
        "cell {} on page {}: negative payload size {}",
        index,
        page_number,
        payload_size
    );
    let end = start.checked_add(payload_size as usize);
    match end {
        Some(end) if end <= cell.len() => Ok(&cell[start..end]),
        _ => eyre::bail!(
            "cell {} on page {}: payload of {} bytes extends past the page \
             (overflow pages are not supported)",
            index,
            page_number,
            payload_size
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode_varint;
    use crate::types::Value;

    const PAGE_SIZE: usize = 512;

    fn push_varint(out: &mut Vec<u8>, value: i64) {
        let mut buf = [0u8; 9];
        let n = encode_varint(value, &mut buf);
        out.extend_from_slice(&buf[..n]);
    }

    /// A record payload holding a single text column.
    fn text_record(text: &str) -> Vec<u8> {
        let serial = 13 + 2 * text.len() as i64;
        let mut header = Vec::new();
        push_varint(&mut header, serial);
        let mut payload = vec![(header.len() + 1) as u8];
        payload.extend_from_slice(&header);
        payload.extend_from_slice(text.as_bytes());
        payload
    }

    /// A record payload holding a text column and an integer column.
    fn text_int_record(text: &str, value: i64) -> Vec<u8> {
        let mut header = Vec::new();
        push_varint(&mut header, 13 + 2 * text.len() as i64);
        push_varint(&mut header, 1);
        let mut payload = vec![(header.len() + 1) as u8];
        payload.extend_from_slice(&header);
        payload.extend_from_slice(text.as_bytes());
        payload.push(value as u8);
        payload
    }

    /// Assembles a page from a header prefix and cells placed at the end of
    /// the page, returning the finished page bytes.
    fn build_page(kind: u8, right_child: Option<u32>, cells: &[Vec<u8>]) -> Vec<u8> {
        let mut page = vec![0u8; PAGE_SIZE];
        page[0] = kind;
        page[3..5].copy_from_slice(&(cells.len() as u16).to_be_bytes());

        let header_size = if right_child.is_some() { 12 } else { 8 };
        if let Some(child) = right_child {
            page[8..12].copy_from_slice(&child.to_be_bytes());
        }

        let mut content_end = PAGE_SIZE;
        for (i, cell) in cells.iter().enumerate() {
            content_end -= cell.len();
            page[content_end..content_end + cell.len()].copy_from_slice(cell);
            let at = header_size + 2 * i;
            page[at..at + 2].copy_from_slice(&(content_end as u16).to_be_bytes());
        }
        page[5..7].copy_from_slice(&(content_end as u16).to_be_bytes());
        page
    }

    fn leaf_table_cell(rowid: i64, payload: &[u8]) -> Vec<u8> {
        let mut cell = Vec::new();
        push_varint(&mut cell, payload.len() as i64);
        push_varint(&mut cell, rowid);
        cell.extend_from_slice(payload);
        cell
    }

    #[test]
    fn parses_leaf_table_page() {
        let cells = [
            leaf_table_cell(1, &text_record("alpha")),
            leaf_table_cell(2, &text_record("beta")),
        ];
        let page = build_page(0x0d, None, &cells);
        let parsed = parse_page(&page, 2).unwrap();

        assert_eq!(parsed.kind, PageKind::LeafTable);
        assert_eq!(parsed.cell_count, 2);
        assert_eq!(parsed.right_child, None);
        let Cells::LeafTable(cells) = parsed.cells else {
            panic!("expected leaf table cells");
        };
        assert_eq!(cells[0].rowid, 1);
        assert_eq!(cells[0].record, vec![Value::Text("alpha".into())]);
        assert_eq!(cells[1].rowid, 2);
        assert_eq!(cells[1].record, vec![Value::Text("beta".into())]);
    }

    #[test]
    fn leaf_table_record_roundtrips_through_stored_payload() {
        let cells = [leaf_table_cell(7, &text_record("gamma"))];
        let page = build_page(0x0d, None, &cells);
        let parsed = parse_page(&page, 2).unwrap();
        let Cells::LeafTable(cells) = parsed.cells else {
            panic!("expected leaf table cells");
        };
        assert_eq!(parse_record(cells[0].payload).unwrap(), cells[0].record);
    }

    #[test]
    fn parses_interior_table_page() {
        let mut cell = 3u32.to_be_bytes().to_vec();
        push_varint(&mut cell, 40);
        let page = build_page(0x05, Some(9), &[cell]);
        let parsed = parse_page(&page, 2).unwrap();

        assert_eq!(parsed.kind, PageKind::InteriorTable);
        assert_eq!(parsed.right_child, Some(9));
        let Cells::InteriorTable(cells) = parsed.cells else {
            panic!("expected interior table cells");
        };
        assert_eq!(cells[0].left_child, 3);
        assert_eq!(cells[0].key, 40);
    }

    #[test]
    fn parses_leaf_index_page() {
        let payload = text_int_record("name3", 3);
        let mut cell = Vec::new();
        push_varint(&mut cell, payload.len() as i64);
        cell.extend_from_slice(&payload);

        let page = build_page(0x0a, None, &[cell]);
        let parsed = parse_page(&page, 2).unwrap();
        let Cells::LeafIndex(cells) = parsed.cells else {
            panic!("expected leaf index cells");
        };
        assert_eq!(
            cells[0].payload,
            vec![Value::Text("name3".into()), Value::Int(3)]
        );
    }

    #[test]
    fn parses_interior_index_page() {
        let payload = text_int_record("m", 17);
        let mut cell = 5u32.to_be_bytes().to_vec();
        push_varint(&mut cell, payload.len() as i64);
        cell.extend_from_slice(&payload);

        let page = build_page(0x02, Some(6), &[cell]);
        let parsed = parse_page(&page, 2).unwrap();
        let Cells::InteriorIndex(cells) = parsed.cells else {
            panic!("expected interior index cells");
        };
        assert_eq!(cells[0].left_child, 5);
        assert_eq!(
            cells[0].payload,
            vec![Value::Text("m".into()), Value::Int(17)]
        );
    }

    #[test]
    fn page_one_header_starts_after_database_header() {
        let cells = [leaf_table_cell(1, &text_record("first"))];
        let inner = build_page(0x0d, None, &cells);

        // Rebuild the same page shifted behind a 100-byte database header:
        // btree header and cell pointers move, cell content stays put.
        let mut page = vec![0u8; PAGE_SIZE];
        page[100..108].copy_from_slice(&inner[..8]);
        page[108..110].copy_from_slice(&inner[8..10]);
        let content_start = u16::from_be_bytes([inner[5], inner[6]]) as usize;
        page[content_start..].copy_from_slice(&inner[content_start..]);

        let parsed = parse_page(&page, 1).unwrap();
        assert_eq!(parsed.kind, PageKind::LeafTable);
        assert_eq!(parsed.cell_count, 1);
    }

    #[test]
    fn rejects_unknown_page_kind() {
        let page = build_page(0x0d, None, &[]);
        let mut bad = page.clone();
        bad[0] = 0x07;
        let err = parse_page(&bad, 3).unwrap_err();
        assert!(err.to_string().contains("unexpected page kind 0x07 on page 3"));
    }

    #[test]
    fn rejects_cell_pointer_below_cell_area() {
        let cells = [leaf_table_cell(1, &text_record("x"))];
        let mut page = build_page(0x0d, None, &cells);
        // Point the only cell at the pointer array itself.
        page[8..10].copy_from_slice(&9u16.to_be_bytes());
        let err = parse_page(&page, 2).unwrap_err();
        assert!(err.to_string().contains("outside the cell area"));
    }

    #[test]
    fn rejects_payload_extending_past_page() {
        let mut cell = Vec::new();
        push_varint(&mut cell, 10_000);
        push_varint(&mut cell, 1);
        cell.extend_from_slice(&text_record("tiny"));
        let page = build_page(0x0d, None, &[cell]);
        let err = parse_page(&page, 2).unwrap_err();
        assert!(err.to_string().contains("overflow pages are not supported"));
    }

    #[test]
    fn rejects_zero_right_most_pointer() {
        let mut cell = 3u32.to_be_bytes().to_vec();
        push_varint(&mut cell, 40);
        let mut page = build_page(0x05, Some(9), &[cell]);
        page[8..12].copy_from_slice(&0u32.to_be_bytes());
        let err = parse_page(&page, 2).unwrap_err();
        assert!(err.to_string().contains("right-most child pointer is zero"));
    }

    #[test]
    fn rejects_zero_left_child_pointer() {
        let mut cell = 0u32.to_be_bytes().to_vec();
        push_varint(&mut cell, 40);
        let page = build_page(0x05, Some(9), &[cell]);
        let err = parse_page(&page, 2).unwrap_err();
        assert!(err.to_string().contains("left child pointer is zero"));
    }

    #[test]
    fn rejects_record_errors_with_cell_attribution() {
        // A leaf cell whose payload claims a longer header than it has.
        let bad_payload = [0x10u8, 0x01];
        let cell = leaf_table_cell(1, &bad_payload);
        let page = build_page(0x0d, None, &[cell]);
        let err = parse_page(&page, 4).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("cell 0 on page 4"), "message was: {}", message);
    }
}
