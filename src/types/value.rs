//! # Runtime Value Representation
//!
//! This module provides `Value<'a>`, the runtime representation for the
//! five storage classes of the SQLite file format. Values use `Cow` for
//! text and blob so that reads borrow directly from the memory-mapped page
//! while owned data remains expressible.
//!
//! ## Value Variants
//!
//! | Variant | Rust Type   | Description            |
//! |---------|-------------|------------------------|
//! | Null    | -           | SQL NULL               |
//! | Int     | i64         | 64-bit signed integer  |
//! | Float   | f64         | 64-bit floating point  |
//! | Text    | Cow<str>    | UTF-8 string           |
//! | Blob    | Cow<[u8]>   | Binary data            |
//!
//! ## Comparison Semantics
//!
//! Index B-trees order entries by a total order over values, decided first
//! by type precedence and then within the type:
//!
//! 1. NULL (all NULLs compare equal to each other, lowest)
//! 2. numerics (integers and floats compared as real numbers)
//! 3. text (byte order of the UTF-8 encoding)
//! 4. blob (byte order)
//!
//! This is deliberately not SQL expression semantics: there is no UNKNOWN,
//! because the comparator's job is locating keys in sorted cell arrays,
//! where every pair of values must order.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Runtime value for one record column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Int(i64),
    Float(f64),
    Text(Cow<'a, str>),
    Blob(Cow<'a, [u8]>),
}

impl<'a> Value<'a> {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer payload, if this value is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the text payload, if this value is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Type-precedence rank; lower ranks order before higher ranks.
    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
            Value::Blob(_) => 3,
        }
    }

    /// Clones this value to a fully-owned static lifetime.
    ///
    /// Borrowed text and blob values point into the database memory map;
    /// call this to keep a value past the handle that produced it.
    pub fn to_owned_static(&self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Text(s) => Value::Text(Cow::Owned(s.to_string())),
            Value::Blob(b) => Value::Blob(Cow::Owned(b.to_vec())),
        }
    }
}

/// Compares two values under the format's type-precedence total order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let (rank_a, rank_b) = (a.type_rank(), b.type_rank());
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,

        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Int(x), Value::Float(y)) => cmp_f64(*x as f64, *y),
        (Value::Float(x), Value::Int(y)) => cmp_f64(*x, *y as f64),
        (Value::Float(x), Value::Float(y)) => cmp_f64(*x, *y),

        (Value::Text(x), Value::Text(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Value::Blob(x), Value::Blob(y)) => x.cmp(y),

        // Mixed-rank pairs are handled by the rank comparison above.
        _ => unreachable!("mismatched value kinds with equal type rank"),
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => {
                f.write_str("x'")?;
                for byte in b.iter() {
                    write!(f, "{:02x}", byte)?;
                }
                f.write_str("'")
            }
        }
    }
}
