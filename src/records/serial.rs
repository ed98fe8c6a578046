//! # Serial Types
//!
//! Every column body in a record is described by a non-negative "serial
//! type" integer that encodes both the storage class and the exact body
//! width:
//!
//! | serial type | kind     | body bytes | value                      |
//! |-------------|----------|------------|----------------------------|
//! | 0           | NULL     | 0          | NULL                       |
//! | 1           | int      | 1          | sign-extended 8-bit BE     |
//! | 2           | int      | 2          | sign-extended 16-bit BE    |
//! | 3           | int      | 3          | sign-extended 24-bit BE    |
//! | 4           | int      | 4          | sign-extended 32-bit BE    |
//! | 5           | int      | 6          | sign-extended 48-bit BE    |
//! | 6           | int      | 8          | 64-bit BE                  |
//! | 7           | float    | 8          | IEEE-754 binary64, BE      |
//! | 8           | int      | 0          | constant 0                 |
//! | 9           | int      | 0          | constant 1                 |
//! | 10, 11      | reserved | -          | error                      |
//! | N >= 12, even | blob   | (N-12)/2   | opaque bytes               |
//! | N >= 13, odd  | text   | (N-13)/2   | UTF-8 string               |
//!
//! Text and blob values borrow from the body slice; their lifetime is the
//! lifetime of the page the record was read from.

use eyre::{bail, ensure, Result};
use std::borrow::Cow;

use crate::types::Value;

/// Decodes one value of the given serial type from the front of `body`.
///
/// Returns the value and the number of body bytes it occupied. Fails when
/// fewer body bytes are available than the serial type requires, or when
/// the serial type is one of the reserved codes 10 and 11.
pub fn decode_value(serial_type: i64, body: &[u8]) -> Result<(Value<'_>, usize)> {
    if serial_type >= 12 {
        let len = if serial_type % 2 == 0 {
            (serial_type - 12) / 2
        } else {
            (serial_type - 13) / 2
        } as usize;
        ensure!(
            body.len() >= len,
            "insufficient data for {} of length {}: {} bytes available",
            if serial_type % 2 == 0 { "BLOB" } else { "TEXT" },
            len,
            body.len()
        );
        let bytes = &body[..len];
        let value = if serial_type % 2 == 0 {
            Value::Blob(Cow::Borrowed(bytes))
        } else {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| eyre::eyre!("invalid UTF-8 in text value: {}", e))?;
            Value::Text(Cow::Borrowed(text))
        };
        return Ok((value, len));
    }

    match serial_type {
        0 => Ok((Value::Null, 0)),
        1 => {
            ensure!(!body.is_empty(), "insufficient data for 8-bit integer");
            Ok((Value::Int(i64::from(body[0] as i8)), 1))
        }
        2 => {
            ensure!(body.len() >= 2, "insufficient data for 16-bit integer");
            let v = i16::from_be_bytes([body[0], body[1]]);
            Ok((Value::Int(i64::from(v)), 2))
        }
        3 => {
            ensure!(body.len() >= 3, "insufficient data for 24-bit integer");
            let fill = if body[0] & 0x80 != 0 { 0xff } else { 0x00 };
            let v = i32::from_be_bytes([fill, body[0], body[1], body[2]]);
            Ok((Value::Int(i64::from(v)), 3))
        }
        4 => {
            ensure!(body.len() >= 4, "insufficient data for 32-bit integer");
            let v = i32::from_be_bytes([body[0], body[1], body[2], body[3]]);
            Ok((Value::Int(i64::from(v)), 4))
        }
        5 => {
            ensure!(body.len() >= 6, "insufficient data for 48-bit integer");
            let fill = if body[0] & 0x80 != 0 { 0xff } else { 0x00 };
            let v = i64::from_be_bytes([
                fill, fill, body[0], body[1], body[2], body[3], body[4], body[5],
            ]);
            Ok((Value::Int(v), 6))
        }
        6 => {
            ensure!(body.len() >= 8, "insufficient data for 64-bit integer");
            let v = i64::from_be_bytes([
                body[0], body[1], body[2], body[3], body[4], body[5], body[6], body[7],
            ]);
            Ok((Value::Int(v), 8))
        }
        7 => {
            ensure!(body.len() >= 8, "insufficient data for 64-bit float");
            let v = f64::from_be_bytes([
                body[0], body[1], body[2], body[3], body[4], body[5], body[6], body[7],
            ]);
            Ok((Value::Float(v), 8))
        }
        8 => Ok((Value::Int(0), 0)),
        9 => Ok((Value::Int(1), 0)),
        _ => bail!("unsupported serial type {}", serial_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_consumes_nothing() {
        let (value, read) = decode_value(0, &[]).unwrap();
        assert_eq!(value, Value::Null);
        assert_eq!(read, 0);
    }

    #[test]
    fn eight_bit_integer_sign_extends() {
        assert_eq!(decode_value(1, &[0x7f]).unwrap(), (Value::Int(127), 1));
        assert_eq!(decode_value(1, &[0x80]).unwrap(), (Value::Int(-128), 1));
        assert_eq!(decode_value(1, &[0xff]).unwrap(), (Value::Int(-1), 1));
    }

    #[test]
    fn sixteen_bit_integer_sign_extends() {
        assert_eq!(decode_value(2, &[0x01, 0x00]).unwrap(), (Value::Int(256), 2));
        assert_eq!(decode_value(2, &[0xff, 0xfe]).unwrap(), (Value::Int(-2), 2));
    }

    #[test]
    fn twentyfour_bit_integer_sign_extends() {
        assert_eq!(
            decode_value(3, &[0x01, 0x00, 0x00]).unwrap(),
            (Value::Int(65536), 3)
        );
        assert_eq!(
            decode_value(3, &[0xff, 0xff, 0xff]).unwrap(),
            (Value::Int(-1), 3)
        );
        assert_eq!(
            decode_value(3, &[0x80, 0x00, 0x00]).unwrap(),
            (Value::Int(-(1 << 23)), 3)
        );
    }

    #[test]
    fn thirtytwo_bit_integer_sign_extends() {
        assert_eq!(
            decode_value(4, &[0x80, 0x00, 0x00, 0x00]).unwrap(),
            (Value::Int(i64::from(i32::MIN)), 4)
        );
        assert_eq!(
            decode_value(4, &[0x00, 0x00, 0x00, 0x2a]).unwrap(),
            (Value::Int(42), 4)
        );
    }

    #[test]
    fn fortyeight_bit_integer_sign_extends() {
        assert_eq!(
            decode_value(5, &[0x00, 0x00, 0x00, 0x00, 0x00, 0x05]).unwrap(),
            (Value::Int(5), 6)
        );
        assert_eq!(
            decode_value(5, &[0xff, 0xff, 0xff, 0xff, 0xff, 0xfb]).unwrap(),
            (Value::Int(-5), 6)
        );
    }

    #[test]
    fn sixtyfour_bit_integer() {
        let bytes = i64::MIN.to_be_bytes();
        assert_eq!(decode_value(6, &bytes).unwrap(), (Value::Int(i64::MIN), 8));
    }

    #[test]
    fn sixtyfour_bit_float() {
        let bytes = 1.5f64.to_be_bytes();
        assert_eq!(decode_value(7, &bytes).unwrap(), (Value::Float(1.5), 8));
    }

    #[test]
    fn constant_zero_and_one() {
        assert_eq!(decode_value(8, &[]).unwrap(), (Value::Int(0), 0));
        assert_eq!(decode_value(9, &[]).unwrap(), (Value::Int(1), 0));
    }

    #[test]
    fn reserved_serial_types_fail() {
        for st in [10, 11] {
            let err = decode_value(st, &[0; 8]).unwrap_err();
            assert!(err.to_string().contains("unsupported serial type"));
        }
    }

    #[test]
    fn negative_serial_type_fails() {
        assert!(decode_value(-1, &[]).is_err());
    }

    #[test]
    fn blob_and_text_lengths_from_serial_type() {
        let body = b"hello world";
        let (value, read) = decode_value(12 + 2 * 5, body).unwrap();
        assert_eq!(value, Value::Blob(Cow::Borrowed(&b"hello"[..])));
        assert_eq!(read, 5);

        let (value, read) = decode_value(13 + 2 * 5, body).unwrap();
        assert_eq!(value, Value::Text(Cow::Borrowed("hello")));
        assert_eq!(read, 5);
    }

    #[test]
    fn empty_blob_and_text() {
        assert_eq!(
            decode_value(12, &[]).unwrap(),
            (Value::Blob(Cow::Borrowed(&[][..])), 0)
        );
        assert_eq!(
            decode_value(13, &[]).unwrap(),
            (Value::Text(Cow::Borrowed("")), 0)
        );
    }

    #[test]
    fn invalid_utf8_text_fails() {
        let err = decode_value(13 + 2 * 2, &[0xff, 0xfe]).unwrap_err();
        assert!(err.to_string().contains("invalid UTF-8"));
    }

    #[test]
    fn every_sized_type_rejects_one_byte_short_input() {
        let cases: &[(i64, usize)] = &[
            (1, 1),
            (2, 2),
            (3, 3),
            (4, 4),
            (5, 6),
            (6, 8),
            (7, 8),
            (12 + 2 * 4, 4),
            (13 + 2 * 4, 4),
        ];
        for &(serial_type, width) in cases {
            let short = vec![0u8; width - 1];
            let err = decode_value(serial_type, &short).unwrap_err();
            assert!(
                err.to_string().contains("insufficient data"),
                "serial type {} accepted short input",
                serial_type
            );
        }
    }
}
