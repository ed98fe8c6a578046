//! # Record Decoding
//!
//! A record is the stored form of one table row or one index entry: a
//! varint header declaring a serial type per column, followed by the
//! column bodies back to back.
//!
//! ```text
//! +-------------+----------------+----------------------+
//! | header len  | serial types   | column bodies        |
//! | (varint,    | (one varint    | (widths fixed by the |
//! |  inclusive) |  per column)   |  serial types)       |
//! +-------------+----------------+----------------------+
//! ```
//!
//! [`serial`] maps one serial type plus body bytes to a typed value;
//! [`record`] frames a whole payload and defines the record comparator
//! used to search index trees. Decoded values borrow from the payload
//! slice they were parsed out of.

pub mod record;
pub mod serial;

pub use record::{compare_records, parse_record, record_to_owned, Record};
pub use serial::decode_value;
