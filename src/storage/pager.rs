//! # Read-Only Memory-Mapped Pager
//!
//! The pager maps the database file into memory once at open time and
//! serves each page as a borrowed slice of the map. Traditional readers
//! copy page bytes into per-read buffers; mapping the file instead means
//! page access is a bounds check and a slice, and every decoded value can
//! borrow from the file with zero copies.
//!
//! ## Safety Considerations
//!
//! A mapped region reflects whatever is in the file. Ferrolite never
//! writes, so the only hazard is an *external* writer mutating the file
//! while it is mapped; the usual deployment (reading a database no live
//! application has open for writing) is sound. The map is private and
//! read-only, so ferrolite itself can never fault the file.
//!
//! Page slices borrow `&self`, so the borrow checker guarantees the map
//! outlives every page, record, and value derived from it. Dropping the
//! pager unmaps the file and releases the descriptor.
//!
//! ## Statelessness
//!
//! The pager holds no cache and does no prefetching; the operating
//! system's page cache already de-duplicates repeated reads of hot pages.
//! Because `page()` takes `&self` and the map never changes, any number of
//! concurrent iterations may read pages at once, from any thread.

use std::fs::File;
use std::path::Path;

use eyre::{ensure, Result, WrapErr};
use memmap2::Mmap;

use super::header::{DbHeader, HEADER_SIZE};

#[derive(Debug)]
pub struct Pager {
    mmap: Mmap,
    page_size: usize,
}

impl Pager {
    /// Opens and maps the database file at `path`, validating its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .wrap_err_with(|| format!("failed to open database file '{}'", path.display()))?;

        // SAFETY: the map is read-only and private; see the module docs for
        // the external-writer caveat.
        let mmap = unsafe { Mmap::map(&file) }
            .wrap_err_with(|| format!("failed to map database file '{}'", path.display()))?;

        ensure!(
            mmap.len() >= HEADER_SIZE,
            "database file '{}' is too small to hold a header: {} bytes",
            path.display(),
            mmap.len()
        );

        let header = DbHeader::parse(&mmap[..HEADER_SIZE])?;
        let page_size = header.page_size() as usize;

        Ok(Self { mmap, page_size })
    }

    /// The fixed page size of this file, from the header.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of whole pages the mapped file holds.
    pub fn page_count(&self) -> u32 {
        (self.mmap.len() / self.page_size) as u32
    }

    /// A re-validated reference to the file header (the first 100 bytes of
    /// the map).
    pub fn header(&self) -> Result<&DbHeader> {
        DbHeader::parse(&self.mmap[..HEADER_SIZE])
    }

    /// Returns the bytes of page `number` (1-based).
    pub fn page(&self, number: u32) -> Result<&[u8]> {
        ensure!(number >= 1, "page numbers are 1-based, got 0");
        let start = (number as usize - 1) * self.page_size;
        let end = start + self.page_size;
        ensure!(
            end <= self.mmap.len(),
            "page {} out of range: file holds {} pages of {} bytes",
            number,
            self.page_count(),
            self.page_size
        );
        Ok(&self.mmap[start..end])
    }
}
