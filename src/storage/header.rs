//! # Database File Header
//!
//! The first 100 bytes of every database file form a fixed-layout header.
//! This module provides a type-safe, zerocopy-based view of it: the struct
//! below is `#[repr(C)]` with big-endian field types, so a validated
//! reference into the raw bytes is the parsed header.
//!
//! ## Header Layout (100 bytes)
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  ---------------------------------------------
//! 0       16    Magic string "SQLite format 3\0"
//! 16      2     Page size (big-endian; raw value 1 means 65536)
//! 18      1     File format write version
//! 19      1     File format read version
//! 20      1     Reserved bytes per page
//! 21      1     Maximum embedded payload fraction
//! 22      1     Minimum embedded payload fraction
//! 23      1     Leaf payload fraction
//! 24      4     File change counter
//! 28      4     Database size in pages
//! 32      4     First freelist trunk page
//! 36      4     Total freelist pages
//! 40      4     Schema cookie
//! 44      4     Schema format number
//! 48      4     Default page cache size
//! 52      4     Largest root B-tree page (vacuum modes)
//! 56      4     Text encoding (1 = UTF-8, 2 = UTF-16le, 3 = UTF-16be)
//! 60      4     User version
//! 64      4     Incremental-vacuum mode
//! 68      4     Application ID
//! 72      20    Reserved for expansion
//! 92      4     Version-valid-for change counter
//! 96      4     SQLITE_VERSION_NUMBER of the last writer
//! ```
//!
//! ## Zerocopy Safety
//!
//! `DbHeader` derives `FromBytes`, `Immutable`, `KnownLayout`, and
//! `Unaligned`, so `ref_from_bytes` can reinterpret any 100-byte slice at
//! any alignment. All multi-byte fields use the `zerocopy` big-endian
//! wrapper types; `get()` performs the byte-order conversion.

use eyre::{ensure, Result};
use zerocopy::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

/// Size of the database file header in bytes.
pub const HEADER_SIZE: usize = 100;

/// The magic string at the start of every database file.
pub const MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Text encoding code for UTF-8, the only encoding ferrolite reads.
pub const TEXT_ENCODING_UTF8: u32 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct DbHeader {
    magic: [u8; 16],
    page_size: U16,
    file_format_write_version: u8,
    file_format_read_version: u8,
    reserved_bytes: u8,
    max_payload_fraction: u8,
    min_payload_fraction: u8,
    leaf_payload_fraction: u8,
    change_counter: U32,
    database_size: U32,
    freelist_trunk: U32,
    freelist_pages: U32,
    schema_cookie: U32,
    schema_format: U32,
    default_cache_size: U32,
    largest_root_page: U32,
    text_encoding: U32,
    user_version: U32,
    incremental_vacuum: U32,
    application_id: U32,
    reserved: [u8; 20],
    version_valid_for: U32,
    sqlite_version_number: U32,
}

const _: () = assert!(std::mem::size_of::<DbHeader>() == HEADER_SIZE);

impl DbHeader {
    /// Parses and validates a header from exactly 100 bytes.
    pub fn parse(bytes: &[u8]) -> Result<&Self> {
        ensure!(
            bytes.len() == HEADER_SIZE,
            "invalid header size: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        );

        let header = Self::ref_from_bytes(bytes)
            .map_err(|e| eyre::eyre!("failed to read database header: {:?}", e))?;

        ensure!(&header.magic == MAGIC, "not a sqlite database (bad magic)");

        let raw_page_size = header.page_size.get();
        ensure!(
            raw_page_size == 1 || (raw_page_size >= 512 && raw_page_size.is_power_of_two()),
            "invalid page size {} (must be a power of two between 512 and 65536)",
            raw_page_size
        );

        Ok(header)
    }

    /// Page size in bytes. The raw 16-bit field stores 1 to mean 65536.
    pub fn page_size(&self) -> u32 {
        match self.page_size.get() {
            1 => 65536,
            n => u32::from(n),
        }
    }

    pub fn change_counter(&self) -> u32 {
        self.change_counter.get()
    }

    /// Size of the database in pages, as recorded by the last writer.
    pub fn database_size(&self) -> u32 {
        self.database_size.get()
    }

    pub fn freelist_trunk(&self) -> u32 {
        self.freelist_trunk.get()
    }

    pub fn freelist_pages(&self) -> u32 {
        self.freelist_pages.get()
    }

    pub fn schema_cookie(&self) -> u32 {
        self.schema_cookie.get()
    }

    pub fn schema_format(&self) -> u32 {
        self.schema_format.get()
    }

    pub fn default_cache_size(&self) -> u32 {
        self.default_cache_size.get()
    }

    pub fn text_encoding(&self) -> u32 {
        self.text_encoding.get()
    }

    pub fn user_version(&self) -> u32 {
        self.user_version.get()
    }
}
