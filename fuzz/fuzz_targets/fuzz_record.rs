//! Fuzz testing for the record decoder.
//!
//! Arbitrary bytes go through varint decoding and record parsing; both
//! must reject malformed input with an error, never a panic or an
//! out-of-bounds read.

#![no_main]

use libfuzzer_sys::fuzz_target;

use ferrolite::encoding::decode_varint;
use ferrolite::parse_record;

fuzz_target!(|data: &[u8]| {
    let (_, consumed) = decode_varint(data);
    assert!(consumed <= data.len().min(9));

    let _ = parse_record(data);
});
