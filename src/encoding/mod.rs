//! # Encoding Primitives
//!
//! Byte-level codecs shared by the record and page parsers. The only codec
//! the SQLite file format needs is the variable-length integer in
//! [`varint`]; record header lengths, serial types, payload sizes, and
//! rowids are all varints.

pub mod varint;

pub use varint::{decode_varint, encode_varint};
