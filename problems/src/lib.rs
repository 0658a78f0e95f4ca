//! Problem codes for interlock generation and mnemonic validation.
//!
//! The enumeration is generated by the build script from
//! `resources/problem-codes.csv`. Codes starting with `G` are found while
//! generating, codes starting with `V` while validating a stream.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));
