//! Fuzz testing for the page parser.
//!
//! Arbitrary bytes are treated as a page (alternately as page 1, whose
//! header sits past the database header, and as an ordinary page); the
//! parser must bounds-check every cell pointer and payload.

#![no_main]

use libfuzzer_sys::fuzz_target;

use ferrolite::storage::parse_page;

fuzz_target!(|data: &[u8]| {
    let _ = parse_page(data, 1);
    let _ = parse_page(data, 2);
});
