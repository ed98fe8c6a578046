//! # Record Framing and Comparison
//!
//! [`parse_record`] decodes a cell payload into its column values. The
//! payload starts with a varint giving the header length in bytes
//! (inclusive of the length varint itself); the rest of the header is a
//! run of serial-type varints, one per column, and the body holds the
//! column contents in the same order.
//!
//! Errors name the column at which decoding failed; a record whose header
//! claims more bytes than the payload holds is rejected before any column
//! is touched.
//!
//! [`compare_records`] is the entry ordering of index B-trees: records
//! compare element-wise under the value comparator, and on a tied prefix
//! the shorter record is the lesser.

use eyre::{ensure, Result, WrapErr};
use smallvec::SmallVec;
use std::cmp::Ordering;

use crate::encoding::decode_varint;
use crate::records::serial::decode_value;
use crate::types::{compare_values, Value};

/// One decoded row or index entry: an ordered sequence of values.
pub type Record<'a> = Vec<Value<'a>>;

/// Parses a cell payload into a record. Values borrow from `payload`.
pub fn parse_record(payload: &[u8]) -> Result<Record<'_>> {
    let (header_len, len_bytes) = decode_varint(payload);
    ensure!(
        header_len >= len_bytes as i64 && header_len as usize <= payload.len(),
        "record header length {} exceeds payload length {}",
        header_len,
        payload.len()
    );

    let header = &payload[len_bytes..header_len as usize];
    let body = &payload[header_len as usize..];

    let mut serial_types: SmallVec<[i64; 8]> = SmallVec::new();
    let mut offset = 0;
    while offset < header.len() {
        let (serial_type, read) = decode_varint(&header[offset..]);
        serial_types.push(serial_type);
        offset += read;
    }

    let mut record = Vec::with_capacity(serial_types.len());
    let mut body_offset = 0;
    for (column, &serial_type) in serial_types.iter().enumerate() {
        let (value, read) = decode_value(serial_type, &body[body_offset..])
            .wrap_err_with(|| format!("column {}", column))?;
        body_offset += read;
        record.push(value);
    }

    Ok(record)
}

/// Compares two records element-wise; on a tied prefix the shorter record
/// is the lesser.
pub fn compare_records(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match compare_values(x, y) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }
    a.len().cmp(&b.len())
}

/// Clones every value in `record` into an owned, `'static` record.
pub fn record_to_owned(record: &[Value]) -> Record<'static> {
    record.iter().map(Value::to_owned_static).collect()
}
